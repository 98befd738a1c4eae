//! Publishing to the real process environment.
//!
//! Kept in its own test binary so no other test thread touches the
//! environment while the variable is set.

use envar_core::{LiveEnvironment, ProcessEnvironment};

#[test]
fn test_live_environment_sets_variable() {
    let mut env = LiveEnvironment;
    env.publish("ENVAR_CORE_LIVE_TEST", "C:\\a;C:\\b").unwrap();
    assert_eq!(
        std::env::var("ENVAR_CORE_LIVE_TEST").unwrap(),
        "C:\\a;C:\\b"
    );
}

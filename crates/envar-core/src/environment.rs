//! Publication to the live process environment and change notification.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use crate::error::{NotifyError, PublishError};

/// Longest a change notification may block.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_millis(100);

/// Sink for merged variable values.
pub trait ProcessEnvironment {
    fn publish(&mut self, name: &str, value: &str) -> Result<(), PublishError>;
}

/// Sets variables on the current process.
///
/// Callers must not read or write the environment from other threads while
/// a command publishes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveEnvironment;

impl ProcessEnvironment for LiveEnvironment {
    #[allow(unsafe_code)]
    fn publish(&mut self, name: &str, value: &str) -> Result<(), PublishError> {
        if name.is_empty() || name.contains(['=', '\0']) {
            return Err(PublishError::InvalidName {
                name: name.to_string(),
            });
        }
        if value.contains('\0') {
            return Err(PublishError::InvalidValue {
                name: name.to_string(),
            });
        }
        // SAFETY: the editor runs commands one at a time on the thread that
        // owns it and nothing else in the process reads the environment
        // concurrently with a command.
        unsafe { std::env::set_var(name, value) };
        Ok(())
    }
}

/// Records published variables instead of touching the process.
///
/// Clones share the same record, so a caller can keep one handle while the
/// editor owns another.
#[derive(Debug, Clone, Default)]
pub struct CapturedEnvironment {
    vars: Rc<RefCell<BTreeMap<String, String>>>,
    reject: bool,
}

impl CapturedEnvironment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An environment that refuses every variable.
    #[must_use]
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.vars.borrow().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.vars.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.borrow().is_empty()
    }
}

impl ProcessEnvironment for CapturedEnvironment {
    fn publish(&mut self, name: &str, value: &str) -> Result<(), PublishError> {
        if self.reject {
            return Err(PublishError::Rejected {
                name: name.to_string(),
            });
        }
        self.vars
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }
}

/// Receiver of the "environment changed" broadcast sent at teardown.
pub trait ChangeNotifier {
    /// Deliver the notification, waiting no longer than `timeout`.
    fn environment_changed(&self, timeout: Duration) -> Result<(), NotifyError>;
}

/// Notifier that reports the broadcast through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl ChangeNotifier for LogNotifier {
    fn environment_changed(&self, timeout: Duration) -> Result<(), NotifyError> {
        tracing::info!(timeout_ms = timeout.as_millis(), "environment changed");
        Ok(())
    }
}

/// Notifier that drops the broadcast.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn environment_changed(&self, _timeout: Duration) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_environment_shares_record() {
        let seen = CapturedEnvironment::new();
        let mut handle = seen.clone();
        handle.publish("MYVAR", "X").unwrap();
        assert_eq!(seen.get("MYVAR").as_deref(), Some("X"));
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_rejecting_environment() {
        let mut env = CapturedEnvironment::rejecting();
        assert!(env.publish("MYVAR", "X").is_err());
        assert!(env.is_empty());
    }

    #[test]
    fn test_live_environment_validates_name() {
        let mut env = LiveEnvironment;
        assert!(matches!(
            env.publish("A=B", "x"),
            Err(PublishError::InvalidName { .. })
        ));
        assert!(matches!(
            env.publish("ENVAR_TEST_VALUE", "a\0b"),
            Err(PublishError::InvalidValue { .. })
        ));
    }
}

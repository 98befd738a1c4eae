//! Editing of semicolon-delimited environment list variables.
//!
//! Variables such as `PATH` are stored per root (per-user or per-machine) in a
//! key-value store as a single string of entries separated by `;`. This crate
//! checks for, adds and removes single entries in such a value, deletes whole
//! variables, and publishes the effective value to the running process.
//!
//! # Example
//!
//! ```
//! use envar_core::{EngineConfig, ErrorCode, ListEditor, MemoryStore, ValueKind};
//! use envar_core::{CapturedEnvironment, NoopNotifier};
//!
//! let mut editor = ListEditor::new(MemoryStore::with_keys(), EngineConfig::default())?
//!     .with_environment(CapturedEnvironment::new())
//!     .with_notifier(NoopNotifier);
//!
//! editor.add_value("MYVAR", "C:\\tools", ValueKind::String)?;
//! assert_eq!(ErrorCode::from_result(&editor.check("MYVAR", "c:\\TOOLS")), ErrorCode::Success);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! - `buffer` - growable character buffer reused across commands
//! - `codec` - separator handling and case-insensitive token search
//! - `store` - backend trait, in-memory and JSON file backends, read adapter
//! - `environment` - process environment publication and change notification
//! - `editor` - the list operations
//! - `command` - stack-based command surface with string result codes
//! - `config` - engine settings loaded from TOML
//! - `error` - error types and result codes

mod buffer;
pub mod codec;
mod command;
mod config;
mod editor;
mod environment;
mod error;
pub mod store;

pub use buffer::GrowBuffer;
pub use command::{ArgStack, Command, VecStack};
pub use config::{ConfigError, EngineConfig};
pub use editor::{ListEditor, NULL_SENTINEL};
pub use environment::{
    CapturedEnvironment, ChangeNotifier, LiveEnvironment, LogNotifier, NOTIFY_TIMEOUT,
    NoopNotifier, ProcessEnvironment,
};
pub use error::{
    BufferError, EditError, EditResult, ErrorCode, NotifyError, PublishError, StoreError,
    UnknownName, WriteFailure,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, Root, StoredValue, ValueKind};

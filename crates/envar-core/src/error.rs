//! Error types and result codes.
//!
//! Every fallible step in the engine returns a structured error. The editor
//! collapses those into the small [`ErrorCode`] set that is pushed back to the
//! caller, while the error itself keeps the underlying cause for diagnostics.

use std::collections::TryReserveError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::store::{Root, ValueKind};

/// Result code pushed back after every list operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The operation completed.
    Success,
    /// Part of the wire enumeration. Read failures report
    /// [`ErrorCode::NoVariable`], so no operation produces this code.
    NoRead,
    /// No such variable, unusable type, or a required argument was missing.
    NoVariable,
    /// The entry was not found where it had to be, or was empty.
    NoValue,
    /// Writing, allocating, publishing, or a refused delete.
    NoWrite,
}

impl ErrorCode {
    /// All codes in wire order.
    pub const ALL: [ErrorCode; 5] = [
        ErrorCode::Success,
        ErrorCode::NoRead,
        ErrorCode::NoVariable,
        ErrorCode::NoValue,
        ErrorCode::NoWrite,
    ];

    /// String-encoded integer pushed onto the argument stack.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "0",
            Self::NoRead => "1",
            Self::NoVariable => "2",
            Self::NoValue => "3",
            Self::NoWrite => "4",
        }
    }

    /// Numeric value, used as a process exit status by front ends.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::NoRead => 1,
            Self::NoVariable => 2,
            Self::NoValue => 3,
            Self::NoWrite => 4,
        }
    }

    /// Collapse an operation outcome into its result code.
    #[must_use]
    pub fn from_result<T>(result: &Result<T, EditError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(error) => error.code(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s.trim())
            .ok_or_else(|| UnknownName {
                kind: "result code",
                name: s.to_string(),
            })
    }
}

/// A command, root, or result code name that is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: `{name}`")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

/// Buffer growth failed.
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("failed to allocate room for {requested} characters")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },
}

/// Failure reported by a key-value store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The root key has never been created.
    #[error("{root} environment key does not exist")]
    KeyNotFound { root: Root },

    /// The named value does not exist under the root.
    #[error("value `{name}` not found under {root}")]
    NotFound { root: Root, name: String },

    /// The root key refused the requested access.
    #[error("access denied to {root} environment key")]
    AccessDenied { root: Root },

    /// The value exists but is not a string type.
    #[error("value `{name}` has unsupported type {kind}")]
    WrongType { name: String, kind: ValueKind },

    /// The destination buffer cannot hold the value.
    #[error("destination too small, {required} characters required")]
    MoreData { required: usize },

    /// The destination buffer could not be grown.
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// The backing file could not be accessed.
    #[error("failed to {operation} store file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a store document.
    #[error("store file is not a valid document: {path}")]
    InvalidDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The backing file was written by a newer format.
    #[error("store file version {found} is not supported (maximum: {max_supported})")]
    UnsupportedVersion {
        found: u32,
        max_supported: u32,
        path: PathBuf,
    },
}

/// The live process environment refused a variable.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("invalid environment variable name `{name}`")]
    InvalidName { name: String },

    #[error("value for `{name}` contains a NUL character")]
    InvalidValue { name: String },

    #[error("environment rejected `{name}`")]
    Rejected { name: String },
}

/// A best-effort change notification was not delivered.
#[derive(Debug, Error)]
#[error("change notification not delivered: {reason}")]
pub struct NotifyError {
    pub reason: String,
}

/// Cause of an [`EditError::NoWrite`].
#[derive(Debug, Error)]
pub enum WriteFailure {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("variable is protected from deletion")]
    Protected,
}

/// Failure of a list operation.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("variable `{name}` is not available")]
    NoVariable {
        name: String,
        #[source]
        source: Option<StoreError>,
    },

    #[error("`{entry}` is not a value of `{name}`")]
    NoValue { name: String, entry: String },

    #[error("failed to update `{name}`")]
    NoWrite {
        name: String,
        #[source]
        source: WriteFailure,
    },
}

impl EditError {
    /// Result code for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NoVariable { .. } => ErrorCode::NoVariable,
            Self::NoValue { .. } => ErrorCode::NoValue,
            Self::NoWrite { .. } => ErrorCode::NoWrite,
        }
    }

    pub(crate) fn no_write(name: &str, source: impl Into<WriteFailure>) -> Self {
        Self::NoWrite {
            name: name.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn no_value(name: &str, entry: &str) -> Self {
        Self::NoValue {
            name: name.to_string(),
            entry: entry.to_string(),
        }
    }

    /// Classify a failed read of `name`.
    ///
    /// Allocation failures report [`ErrorCode::NoWrite`]. Every other read
    /// failure, including an unreadable store, reports
    /// [`ErrorCode::NoVariable`].
    pub(crate) fn from_read(name: &str, error: StoreError) -> Self {
        match error {
            StoreError::Buffer(source) => Self::no_write(name, source),
            error => Self::NoVariable {
                name: name.to_string(),
                source: Some(error),
            },
        }
    }
}

/// Outcome of a list operation.
pub type EditResult<T = ()> = std::result::Result<T, EditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_wire_strings() {
        let wire: Vec<&str> = ErrorCode::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(wire, ["0", "1", "2", "3", "4"]);
        for code in ErrorCode::ALL {
            assert_eq!(code.as_str().parse::<i32>().unwrap(), code.as_i32());
            assert_eq!(code.as_str().parse::<ErrorCode>().unwrap(), code);
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        let err = "7".parse::<ErrorCode>().unwrap_err();
        assert_eq!(err.name, "7");
    }

    #[test]
    fn test_read_failures_are_classified() {
        let missing = EditError::from_read(
            "MYVAR",
            StoreError::NotFound {
                root: Root::User,
                name: "MYVAR".into(),
            },
        );
        assert_eq!(missing.code(), ErrorCode::NoVariable);

        let broken = EditError::from_read(
            "MYVAR",
            StoreError::Io {
                operation: "read",
                path: PathBuf::from("store.json"),
                source: std::io::Error::other("disk gone"),
            },
        );
        assert_eq!(broken.code(), ErrorCode::NoVariable);
    }

    #[test]
    fn test_from_result() {
        let ok: EditResult = Ok(());
        assert_eq!(ErrorCode::from_result(&ok), ErrorCode::Success);
        let err: EditResult = Err(EditError::no_value("MYVAR", "C:\\tools"));
        assert_eq!(ErrorCode::from_result(&err), ErrorCode::NoValue);
    }
}

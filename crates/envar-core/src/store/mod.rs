//! Key-value persistence for environment lists.
//!
//! [`KeyValueStore`] is the raw backend seam, shaped after a registry-style
//! API: values live under one of two [`Root`] keys, carry a [`ValueKind`]
//! tag, and queries copy into a caller-supplied [`GrowBuffer`], reporting the
//! required size when it is too small. [`StoreAdapter`] layers the
//! grow-and-retry read and the string-type filter on top.

mod adapter;
mod file;
mod memory;

pub use adapter::StoreAdapter;
pub use file::{CURRENT_STORE_VERSION, FileStore, StoreDocument};
pub use memory::{Hive, MemoryStore};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::buffer::GrowBuffer;
use crate::codec::eq_ignore_case;
use crate::error::{StoreError, UnknownName};

/// Storage scope a variable lives under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Root {
    /// Per-user scope (`HKCU\Environment`).
    #[default]
    User,
    /// Per-machine scope (`HKLM\...\Session Manager\Environment`).
    Machine,
}

impl Root {
    pub const ALL: [Root; 2] = [Root::User, Root::Machine];

    /// Short hive name.
    #[must_use]
    pub const fn hive_name(self) -> &'static str {
        match self {
            Self::User => "HKCU",
            Self::Machine => "HKLM",
        }
    }

    /// Key path of the environment block under the hive.
    #[must_use]
    pub const fn key_path(self) -> &'static str {
        match self {
            Self::User => "Environment",
            Self::Machine => "System\\CurrentControlSet\\Control\\Session Manager\\Environment",
        }
    }

    /// Resolve a root selector (`HKCU`, `HKLM`, `user`, `machine`), ignoring
    /// case.
    #[must_use]
    pub fn from_selector(selector: &str) -> Option<Self> {
        let selector = selector.trim();
        if eq_ignore_case(selector, "HKCU") || eq_ignore_case(selector, "user") {
            Some(Self::User)
        } else if eq_ignore_case(selector, "HKLM") || eq_ignore_case(selector, "machine") {
            Some(Self::Machine)
        } else {
            None
        }
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hive_name())
    }
}

impl FromStr for Root {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_selector(s).ok_or_else(|| UnknownName {
            kind: "root",
            name: s.to_string(),
        })
    }
}

/// Type tag of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Plain string.
    #[default]
    String,
    /// String that may hold unexpanded `%VAR%` references.
    ExpandString,
    MultiString,
    Dword,
    Binary,
}

impl ValueKind {
    /// Whether list operations accept this type.
    #[must_use]
    pub const fn is_string(self) -> bool {
        matches!(self, Self::String | Self::ExpandString)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::String => "REG_SZ",
            Self::ExpandString => "REG_EXPAND_SZ",
            Self::MultiString => "REG_MULTI_SZ",
            Self::Dword => "REG_DWORD",
            Self::Binary => "REG_BINARY",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A typed value as held by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredValue {
    pub kind: ValueKind,
    pub data: String,
}

impl StoredValue {
    pub fn new(kind: ValueKind, data: impl Into<String>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    /// Copy the data into `dest`, or report the required capacity (in
    /// characters, terminator included) without touching `dest`.
    pub fn copy_into(&self, dest: &mut GrowBuffer) -> Result<ValueKind, StoreError> {
        let required = self.data.chars().count() + 1;
        if dest.capacity() < required {
            return Err(StoreError::MoreData { required });
        }
        dest.set(&self.data)?;
        Ok(self.kind)
    }
}

/// Raw persistence backend.
///
/// Every call opens and closes the underlying key; implementations hold no
/// handle between calls.
pub trait KeyValueStore {
    /// Open the root key for writing and close it again.
    fn probe_write(&self, root: Root) -> Result<(), StoreError>;

    /// Create the root key if it does not exist.
    fn create_key(&mut self, root: Root) -> Result<(), StoreError>;

    /// Copy the named value into `dest`.
    ///
    /// Fails with [`StoreError::MoreData`] when `dest` is too small; the
    /// caller grows it and asks again.
    fn query_value(
        &self,
        root: Root,
        name: &str,
        dest: &mut GrowBuffer,
    ) -> Result<ValueKind, StoreError>;

    /// Set the named value, replacing it atomically.
    fn set_value(
        &mut self,
        root: Root,
        name: &str,
        kind: ValueKind,
        data: &str,
    ) -> Result<(), StoreError>;

    /// Delete the named value.
    fn delete_value(&mut self, root: Root, name: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_selectors() {
        assert_eq!(Root::from_selector("hkcu"), Some(Root::User));
        assert_eq!(Root::from_selector("HKLM"), Some(Root::Machine));
        assert_eq!(Root::from_selector("Machine"), Some(Root::Machine));
        assert_eq!(Root::from_selector(""), None);
        assert!("HKCR".parse::<Root>().is_err());
    }

    #[test]
    fn test_only_string_kinds_accepted() {
        assert!(ValueKind::String.is_string());
        assert!(ValueKind::ExpandString.is_string());
        assert!(!ValueKind::Dword.is_string());
        assert!(!ValueKind::MultiString.is_string());
    }

    #[test]
    fn test_copy_into_reports_required_size() {
        let value = StoredValue::new(ValueKind::String, "C:\\tools");
        let mut small = GrowBuffer::allocate(4).unwrap();
        match value.copy_into(&mut small) {
            Err(StoreError::MoreData { required }) => assert_eq!(required, 9),
            other => panic!("expected MoreData, got {other:?}"),
        }
        assert!(small.is_empty());

        let mut large = GrowBuffer::allocate(9).unwrap();
        assert_eq!(value.copy_into(&mut large).unwrap(), ValueKind::String);
        assert_eq!(large.as_str(), "C:\\tools");
    }
}

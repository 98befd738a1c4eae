//! Engine configuration.
//!
//! Loaded from a TOML file; every field is optional.
//!
//! ```toml
//! initial_capacity = 1024
//! default_root = "machine"
//! protected_variables = ["path", "pathext"]
//! notify_on_teardown = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::eq_ignore_case;
use crate::store::Root;

/// Settings for a [`ListEditor`](crate::ListEditor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Starting capacity, in characters, of the editor's working buffers.
    pub initial_capacity: usize,

    /// Root selected until a command picks another.
    pub default_root: Root,

    /// Variables that may never be deleted outright. Matched ignoring case.
    pub protected_variables: Vec<String>,

    /// Send the "environment changed" notification when the editor is dropped.
    pub notify_on_teardown: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_CAPACITY,
            default_root: Root::User,
            protected_variables: vec!["path".to_string()],
            notify_on_teardown: true,
        }
    }
}

/// Configuration file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl EngineConfig {
    /// Default buffer size, matching the installer host's string size.
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: e,
                })?;
                tracing::debug!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Whether `name` is refused by `DeleteVar`.
    pub fn is_protected(&self, name: &str) -> bool {
        self.protected_variables
            .iter()
            .any(|protected| eq_ignore_case(protected, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.initial_capacity, 1024);
        assert_eq!(config.default_root, Root::User);
        assert!(config.is_protected("PATH"));
        assert!(config.is_protected("path"));
        assert!(!config.is_protected("MYVAR"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: EngineConfig = toml::from_str("default_root = \"machine\"").unwrap();
        assert_eq!(config.default_root, Root::Machine);
        assert_eq!(config.initial_capacity, EngineConfig::DEFAULT_CAPACITY);
        assert!(config.notify_on_teardown);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::load(&dir.path().join("envar.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("envar.toml");
        fs::write(&path, "initial_capacity = \"lots\"").unwrap();
        assert!(matches!(
            EngineConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_config_round_trip() {
        let config = EngineConfig {
            protected_variables: vec!["path".into(), "pathext".into()],
            ..EngineConfig::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: EngineConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}

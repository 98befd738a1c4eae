//! JSON file store.
//!
//! The whole store is one document:
//!
//! ```text
//! {
//!   "version": 1,
//!   "roots": {
//!     "user": { "PATH": { "kind": "expand_string", "data": "C:\\tools" } },
//!     "machine": {}
//!   }
//! }
//! ```
//!
//! A root appears in `roots` once its key has been created. Every call
//! reloads the document; every mutation rewrites it through a temp file and a
//! rename, so a failed write leaves the previous document intact.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::memory::{Hive, MemoryStore};
use super::{KeyValueStore, Root, ValueKind};
use crate::buffer::GrowBuffer;
use crate::error::StoreError;

/// Format version written by this build.
pub const CURRENT_STORE_VERSION: u32 = 1;

/// On-disk layout of a [`FileStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDocument {
    pub version: u32,
    #[serde(default)]
    pub roots: BTreeMap<Root, Hive>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: CURRENT_STORE_VERSION,
            roots: BTreeMap::new(),
        }
    }
}

/// Store persisted as a JSON document at a path.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document. A missing file is an empty store.
    pub fn load(&self) -> Result<StoreDocument, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreDocument::default()),
            Err(e) => {
                return Err(StoreError::Io {
                    operation: "read",
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        let document: StoreDocument =
            serde_json::from_str(&content).map_err(|e| StoreError::InvalidDocument {
                path: self.path.clone(),
                source: e,
            })?;
        if document.version > CURRENT_STORE_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: document.version,
                max_supported: CURRENT_STORE_VERSION,
                path: self.path.clone(),
            });
        }
        Ok(document)
    }

    /// Write the document atomically.
    pub fn save(&self, document: &StoreDocument) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(document).map_err(|e| StoreError::InvalidDocument {
                path: self.path.clone(),
                source: e,
            })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                operation: "create directory",
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let temp_path = self.path.with_extension("json.tmp");

        let mut file = File::create(&temp_path).map_err(io_error("create", &temp_path))?;
        file.write_all(json.as_bytes())
            .map_err(io_error("write", &temp_path))?;
        file.sync_all().map_err(io_error("sync", &temp_path))?;
        fs::rename(&temp_path, &self.path).map_err(io_error("replace", &self.path))?;

        tracing::trace!(path = %self.path.display(), "saved store");
        Ok(())
    }

    fn ensure_writable(&self, root: Root) -> Result<(), StoreError> {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.permissions().readonly() => Err(StoreError::AccessDenied { root }),
            _ => Ok(()),
        }
    }

    /// Run `op` against the loaded document and save it afterwards.
    fn mutate<T>(
        &self,
        root: Root,
        op: impl FnOnce(&mut MemoryStore) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.ensure_writable(root)?;
        let document = self.load()?;
        let mut store = MemoryStore::from_hives(document.roots);
        let value = op(&mut store)?;
        self.save(&StoreDocument {
            version: CURRENT_STORE_VERSION,
            roots: store.into_hives(),
        })?;
        Ok(value)
    }
}

fn io_error(operation: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io {
        operation,
        path,
        source,
    }
}

impl KeyValueStore for FileStore {
    fn probe_write(&self, root: Root) -> Result<(), StoreError> {
        self.ensure_writable(root)?;
        if self.load()?.roots.contains_key(&root) {
            Ok(())
        } else {
            Err(StoreError::KeyNotFound { root })
        }
    }

    fn create_key(&mut self, root: Root) -> Result<(), StoreError> {
        if self.load()?.roots.contains_key(&root) {
            return Ok(());
        }
        self.mutate(root, |store| store.create_key(root))
    }

    fn query_value(
        &self,
        root: Root,
        name: &str,
        dest: &mut GrowBuffer,
    ) -> Result<ValueKind, StoreError> {
        MemoryStore::from_hives(self.load()?.roots).query_value(root, name, dest)
    }

    fn set_value(
        &mut self,
        root: Root,
        name: &str,
        kind: ValueKind,
        data: &str,
    ) -> Result<(), StoreError> {
        self.mutate(root, |store| store.set_value(root, name, kind, data))
    }

    fn delete_value(&mut self, root: Root, name: &str) -> Result<(), StoreError> {
        self.mutate(root, |store| store.delete_value(root, name))
    }
}

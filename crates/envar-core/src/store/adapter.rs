//! Read/write access to a backend on behalf of the editor.

use tracing::trace;

use super::{KeyValueStore, Root, ValueKind};
use crate::buffer::GrowBuffer;
use crate::codec::APPEND_MARGIN;
use crate::error::StoreError;

/// Upper bound on query attempts while the value keeps outgrowing the buffer.
const MAX_READ_ATTEMPTS: usize = 8;

/// Wraps a [`KeyValueStore`] with the grow-and-retry read protocol.
#[derive(Debug, Clone, Default)]
pub struct StoreAdapter<S> {
    backend: S,
}

impl<S: KeyValueStore> StoreAdapter<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Read a string value into `dest`.
    ///
    /// When the backend reports that `dest` is too small, `dest` is grown to
    /// the reported size plus [`APPEND_MARGIN`] and the query repeated, at most
    /// `MAX_READ_ATTEMPTS` times in all; after that the last
    /// [`StoreError::MoreData`] is returned. Values
    /// that are not string-typed fail with [`StoreError::WrongType`]. On any
    /// failure `dest` is left empty.
    pub fn read(
        &self,
        root: Root,
        name: &str,
        dest: &mut GrowBuffer,
    ) -> Result<ValueKind, StoreError> {
        dest.clear();
        let mut attempt = 0;
        let outcome = loop {
            attempt += 1;
            match self.backend.query_value(root, name, dest) {
                Err(StoreError::MoreData { required }) if attempt < MAX_READ_ATTEMPTS => {
                    trace!(%root, name, required, attempt, "value outgrew buffer, retrying");
                    if let Err(e) = dest.ensure_capacity(required + APPEND_MARGIN) {
                        break Err(e.into());
                    }
                }
                Ok(kind) if !kind.is_string() => {
                    break Err(StoreError::WrongType {
                        name: name.to_string(),
                        kind,
                    });
                }
                other => break other,
            }
        };
        if outcome.is_err() {
            dest.clear();
        }
        outcome
    }

    /// Write a value, creating nothing: the root key must exist.
    pub fn write(
        &mut self,
        root: Root,
        name: &str,
        kind: ValueKind,
        content: &str,
    ) -> Result<(), StoreError> {
        self.backend.set_value(root, name, kind, content)
    }

    pub fn delete(&mut self, root: Root, name: &str) -> Result<(), StoreError> {
        self.backend.delete_value(root, name)
    }

    pub fn create_key(&mut self, root: Root) -> Result<(), StoreError> {
        self.backend.create_key(root)
    }

    /// Whether the root key can be opened for writing.
    pub fn probe_write(&self, root: Root) -> Result<(), StoreError> {
        self.backend.probe_write(root)
    }
}

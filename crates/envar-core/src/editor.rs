//! List editing operations over a store.

use tracing::{debug, info, warn};

use crate::buffer::GrowBuffer;
use crate::codec::{
    append_token, compact_separators, contains_token, eq_ignore_case, ensure_trailing_separator,
    remove_token,
};
use crate::config::EngineConfig;
use crate::environment::{
    ChangeNotifier, LiveEnvironment, LogNotifier, NOTIFY_TIMEOUT, ProcessEnvironment,
};
use crate::error::{BufferError, EditError, EditResult, StoreError, WriteFailure};
use crate::store::{KeyValueStore, Root, StoreAdapter, ValueKind};

/// Argument value that switches `check` into its probe modes.
pub const NULL_SENTINEL: &str = "NULL";

/// Editor for semicolon-delimited list variables.
///
/// Owns three working buffers that are reused across commands: the variable
/// name, the entry being checked, added or removed, and a scratch buffer
/// holding the stored value. Commands run one at a time; each starts by
/// clearing all three.
pub struct ListEditor<S: KeyValueStore> {
    store: StoreAdapter<S>,
    environment: Box<dyn ProcessEnvironment>,
    notifier: Box<dyn ChangeNotifier>,
    config: EngineConfig,
    root: Root,
    var_name: GrowBuffer,
    entry: GrowBuffer,
    scratch: GrowBuffer,
}

impl<S: KeyValueStore> ListEditor<S> {
    /// Create an editor publishing to the live process environment.
    pub fn new(store: S, config: EngineConfig) -> Result<Self, BufferError> {
        let capacity = config.initial_capacity;
        Ok(Self {
            store: StoreAdapter::new(store),
            environment: Box::new(LiveEnvironment),
            notifier: Box::new(LogNotifier),
            root: config.default_root,
            config,
            var_name: GrowBuffer::allocate(capacity)?,
            entry: GrowBuffer::allocate(capacity)?,
            scratch: GrowBuffer::allocate(capacity)?,
        })
    }

    #[must_use]
    pub fn with_environment(mut self, environment: impl ProcessEnvironment + 'static) -> Self {
        self.environment = Box::new(environment);
        self
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: impl ChangeNotifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    /// Root used by every command except an explicit `update_var` selector.
    pub fn root(&self) -> Root {
        self.root
    }

    pub fn set_root(&mut self, root: Root) {
        debug!(%root, "selected root");
        self.root = root;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        self.store.backend()
    }

    pub fn store_mut(&mut self) -> &mut S {
        self.store.backend_mut()
    }

    /// Test whether `entry` is present in `var_name`.
    ///
    /// `var_name == "NULL"` only probes that the active root can be opened
    /// for writing. `entry == "NULL"` only checks that the variable exists
    /// with a string type.
    pub fn check(&mut self, var_name: &str, entry: &str) -> EditResult {
        debug!(variable = var_name, entry, root = %self.root, "check");
        self.load_arguments(var_name, entry)?;
        if var_name.is_empty() {
            return Err(EditError::NoVariable {
                name: String::new(),
                source: None,
            });
        }
        if eq_ignore_case(var_name, NULL_SENTINEL) {
            return self
                .store
                .probe_write(self.root)
                .map_err(|e| EditError::no_write(var_name, e));
        }

        self.store
            .read(self.root, self.var_name.as_str(), &mut self.scratch)
            .map_err(|e| EditError::from_read(var_name, e))?;

        if entry.is_empty() {
            return Err(EditError::NoVariable {
                name: var_name.to_string(),
                source: None,
            });
        }
        if eq_ignore_case(entry, NULL_SENTINEL) {
            // The read already refused anything but string types.
            return Ok(());
        }

        // Matching runs on the stored form; stray separators are not compacted.
        ensure_trailing_separator(&mut self.scratch)
            .and_then(|()| ensure_trailing_separator(&mut self.entry))
            .map_err(|e| EditError::no_write(var_name, e))?;
        if contains_token(self.scratch.as_str(), self.entry.as_str()) {
            Ok(())
        } else {
            Err(EditError::no_value(var_name, entry))
        }
    }

    /// Append `entry` to `var_name` unless already present.
    ///
    /// An existing expandable-string value keeps its type regardless of
    /// `preferred`. A missing variable is created.
    pub fn add_value(&mut self, var_name: &str, entry: &str, preferred: ValueKind) -> EditResult {
        debug!(variable = var_name, entry, root = %self.root, "add value");
        self.load_arguments(var_name, entry)?;
        if entry.is_empty() {
            return Err(EditError::no_value(var_name, entry));
        }

        self.store
            .create_key(self.root)
            .map_err(|e| EditError::no_write(var_name, e))?;

        let kind = match self
            .store
            .read(self.root, self.var_name.as_str(), &mut self.scratch)
        {
            Ok(ValueKind::ExpandString) => ValueKind::ExpandString,
            Ok(_) => preferred,
            Err(
                e @ (StoreError::NotFound { .. }
                | StoreError::KeyNotFound { .. }
                | StoreError::WrongType { .. }),
            ) => {
                debug!(variable = var_name, error = %e, "no usable value, starting empty");
                preferred
            }
            // The stored value is unknown; writing now would replace it.
            Err(e) => return Err(EditError::no_write(var_name, e)),
        };

        self.normalize_for_matching(var_name)?;
        if self.entry.is_empty() {
            return Err(EditError::no_value(var_name, entry));
        }
        if contains_token(self.scratch.as_str(), self.entry.as_str()) {
            debug!(variable = var_name, entry, "already present");
            return Ok(());
        }

        append_token(&mut self.scratch, self.entry.as_str())
            .map_err(|e| EditError::no_write(var_name, e))?;
        compact_separators(&mut self.scratch).map_err(|e| EditError::no_write(var_name, e))?;
        self.store
            .write(self.root, self.var_name.as_str(), kind, self.scratch.as_str())
            .map_err(|e| EditError::no_write(var_name, e))?;
        info!(variable = var_name, entry, root = %self.root, %kind, "added value");
        Ok(())
    }

    /// Remove every occurrence of `entry` from `var_name`.
    ///
    /// The stored type tag is preserved.
    pub fn delete_value(&mut self, var_name: &str, entry: &str) -> EditResult {
        debug!(variable = var_name, entry, root = %self.root, "delete value");
        self.load_arguments(var_name, entry)?;

        let kind = self
            .store
            .read(self.root, self.var_name.as_str(), &mut self.scratch)
            .map_err(|e| EditError::from_read(var_name, e))?;

        self.normalize_for_matching(var_name)?;
        if self.entry.is_empty() || !contains_token(self.scratch.as_str(), self.entry.as_str()) {
            return Err(EditError::no_value(var_name, entry));
        }

        let removed = remove_token(&mut self.scratch, self.entry.as_str());
        compact_separators(&mut self.scratch).map_err(|e| EditError::no_write(var_name, e))?;
        self.store
            .write(self.root, self.var_name.as_str(), kind, self.scratch.as_str())
            .map_err(|e| EditError::no_write(var_name, e))?;
        info!(variable = var_name, entry, root = %self.root, removed, "deleted value");
        Ok(())
    }

    /// Delete the whole variable. Protected names are always refused.
    pub fn delete_var(&mut self, var_name: &str) -> EditResult {
        debug!(variable = var_name, root = %self.root, "delete variable");
        self.load_arguments(var_name, "")?;
        if self.config.is_protected(var_name) {
            warn!(variable = var_name, "refusing to delete protected variable");
            return Err(EditError::no_write(var_name, WriteFailure::Protected));
        }
        self.store
            .delete(self.root, self.var_name.as_str())
            .map_err(|e| EditError::no_write(var_name, e))?;
        info!(variable = var_name, root = %self.root, "deleted variable");
        Ok(())
    }

    /// Publish the effective value of `var_name` to the process environment.
    ///
    /// With `selector` naming a root (`HKCU`/`HKLM`), that root's value is
    /// published as is. Otherwise the per-machine value and the per-user
    /// value are joined, machine first. The active root is left unchanged.
    pub fn update_var(&mut self, selector: &str, var_name: &str) -> EditResult {
        debug!(selector, variable = var_name, "update variable");
        self.load_arguments(var_name, "")?;

        if let Some(root) = Root::from_selector(selector) {
            self.store
                .read(root, self.var_name.as_str(), &mut self.scratch)
                .map_err(|e| EditError::from_read(var_name, e))?;
        } else {
            let user = self
                .store
                .read(Root::User, self.var_name.as_str(), &mut self.entry);
            let machine = self
                .store
                .read(Root::Machine, self.var_name.as_str(), &mut self.scratch);
            match (user, machine) {
                (Err(StoreError::Buffer(e)), _) | (_, Err(StoreError::Buffer(e))) => {
                    return Err(EditError::no_write(var_name, e));
                }
                (Err(e), Err(_)) => {
                    debug!(variable = var_name, error = %e, "no value under either root");
                    return Err(EditError::from_read(var_name, e));
                }
                _ => {}
            }
            ensure_trailing_separator(&mut self.scratch)
                .and_then(|()| append_token(&mut self.scratch, self.entry.as_str()))
                .and_then(|()| compact_separators(&mut self.scratch))
                .map_err(|e| EditError::no_write(var_name, e))?;
        }

        self.environment
            .publish(self.var_name.as_str(), self.scratch.as_str())
            .map_err(|e| EditError::no_write(var_name, e))?;
        info!(variable = var_name, "published to process environment");
        Ok(())
    }

    /// Entries of `var_name` under the active root, in stored order.
    pub fn entries(&mut self, var_name: &str) -> EditResult<(ValueKind, Vec<String>)> {
        self.load_arguments(var_name, "")?;
        let kind = self
            .store
            .read(self.root, self.var_name.as_str(), &mut self.scratch)
            .map_err(|e| EditError::from_read(var_name, e))?;
        let entries = crate::codec::entries(self.scratch.as_str())
            .map(str::to_string)
            .collect();
        Ok((kind, entries))
    }

    /// Reset the working buffers and copy the arguments in.
    fn load_arguments(&mut self, var_name: &str, entry: &str) -> EditResult {
        self.var_name.clear();
        self.entry.clear();
        self.scratch.clear();
        self.var_name
            .set(var_name)
            .and_then(|()| self.entry.set(entry))
            .map_err(|e| EditError::no_write(var_name, e))
    }

    /// Compact the stored value and the entry, then terminate both with a
    /// separator so that containment lines up on token boundaries.
    fn normalize_for_matching(&mut self, var_name: &str) -> EditResult {
        compact_separators(&mut self.scratch)
            .and_then(|_| compact_separators(&mut self.entry))
            .and_then(|_| ensure_trailing_separator(&mut self.scratch))
            .and_then(|()| ensure_trailing_separator(&mut self.entry))
            .map_err(|e| EditError::no_write(var_name, e))
    }
}

impl<S: KeyValueStore> Drop for ListEditor<S> {
    fn drop(&mut self) {
        self.var_name.release();
        self.entry.release();
        self.scratch.release();
        if self.config.notify_on_teardown {
            if let Err(e) = self.notifier.environment_changed(NOTIFY_TIMEOUT) {
                warn!(error = %e, "environment change notification failed");
            }
        }
    }
}

impl<S: KeyValueStore + std::fmt::Debug> std::fmt::Debug for ListEditor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListEditor")
            .field("store", &self.store)
            .field("config", &self.config)
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

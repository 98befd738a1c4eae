//! Stack-based command surface.
//!
//! Callers push string arguments, invoke a command by name, and pop a single
//! string-encoded [`ErrorCode`]. Root setters only select the root and push
//! nothing.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::editor::ListEditor;
use crate::error::{ErrorCode, UnknownName};
use crate::store::{KeyValueStore, Root, ValueKind};

/// Argument and result channel shared with the caller.
pub trait ArgStack {
    /// Next argument, or `None` when the stack is exhausted.
    fn pop_string(&mut self) -> Option<String>;

    fn push_string(&mut self, value: &str);
}

/// [`ArgStack`] over a `Vec`, top of stack at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VecStack {
    items: Vec<String>,
}

impl VecStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack whose first pop yields the first of `args`.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut items: Vec<String> = args.into_iter().map(Into::into).collect();
        items.reverse();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items from top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().rev().map(String::as_str)
    }
}

impl ArgStack for VecStack {
    fn pop_string(&mut self) -> Option<String> {
        self.items.pop()
    }

    fn push_string(&mut self, value: &str) {
        self.items.push(value.to_string());
    }
}

/// Commands accepted by [`ListEditor::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    SetUserRoot,
    SetMachineRoot,
    Check,
    AddValue,
    AddValueExpandable,
    DeleteValue,
    DeleteVar,
    UpdateVar,
}

impl Command {
    pub const ALL: [Self; 8] = [
        Self::SetUserRoot,
        Self::SetMachineRoot,
        Self::Check,
        Self::AddValue,
        Self::AddValueExpandable,
        Self::DeleteValue,
        Self::DeleteVar,
        Self::UpdateVar,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::SetUserRoot => "SetUserRoot",
            Self::SetMachineRoot => "SetMachineRoot",
            Self::Check => "Check",
            Self::AddValue => "AddValue",
            Self::AddValueExpandable => "AddValueExpandable",
            Self::DeleteValue => "DeleteValue",
            Self::DeleteVar => "DeleteVar",
            Self::UpdateVar => "UpdateVar",
        }
    }

    /// Historical export name, where one differs from [`Command::name`].
    pub const fn alias(self) -> Option<&'static str> {
        match self {
            Self::SetUserRoot => Some("SetHKCU"),
            Self::SetMachineRoot => Some("SetHKLM"),
            Self::AddValueExpandable => Some("AddValueEx"),
            Self::DeleteVar => Some("Delete"),
            Self::UpdateVar => Some("Update"),
            Self::Check | Self::AddValue | Self::DeleteValue => None,
        }
    }

    /// Number of arguments popped.
    pub const fn arity(self) -> usize {
        match self {
            Self::SetUserRoot | Self::SetMachineRoot => 0,
            Self::DeleteVar => 1,
            Self::Check
            | Self::AddValue
            | Self::AddValueExpandable
            | Self::DeleteValue
            | Self::UpdateVar => 2,
        }
    }

    pub const fn pushes_result(self) -> bool {
        !matches!(self, Self::SetUserRoot | Self::SetMachineRoot)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|command| {
                command.name().eq_ignore_ascii_case(s)
                    || command.alias().is_some_and(|a| a.eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| UnknownName {
                kind: "command",
                name: s.to_string(),
            })
    }
}

impl<S: KeyValueStore> ListEditor<S> {
    /// Pop the arguments of `command`, run it, and push its result code.
    ///
    /// Returns the pushed code, or `None` for the root setters.
    pub fn execute(&mut self, command: Command, stack: &mut impl ArgStack) -> Option<ErrorCode> {
        let mut args = [String::new(), String::new()];
        for arg in args.iter_mut().take(command.arity()) {
            *arg = stack.pop_string().unwrap_or_default();
        }
        let [first, second] = &args;
        debug!(%command, "execute");

        let result = match command {
            Command::SetUserRoot => {
                self.set_root(Root::User);
                return None;
            }
            Command::SetMachineRoot => {
                self.set_root(Root::Machine);
                return None;
            }
            Command::Check => self.check(first, second),
            Command::AddValue => self.add_value(first, second, ValueKind::String),
            Command::AddValueExpandable => self.add_value(first, second, ValueKind::ExpandString),
            Command::DeleteValue => self.delete_value(first, second),
            Command::DeleteVar => self.delete_var(first),
            Command::UpdateVar => self.update_var(first, second),
        };

        let code = ErrorCode::from_result(&result);
        if let Err(e) = &result {
            debug!(%command, code = code.as_str(), error = %e, "command failed");
        }
        stack.push_string(code.as_str());
        Some(code)
    }
}

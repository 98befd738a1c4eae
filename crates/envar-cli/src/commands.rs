//! Subcommand execution.

use anyhow::{Context, Result};
use envar_core::{
    Command as StackCommand, EditResult, EngineConfig, ErrorCode, FileStore, ListEditor, Root,
    ValueKind, VecStack,
};
use tracing::{debug, info_span};

use crate::cli::{Command, TargetArgs};
use crate::paths::{config_path, store_path};
use crate::summary::{EntryListing, print_listing};

/// Load the engine config named by `target`, or the defaults.
pub fn load_config(target: &TargetArgs) -> Result<EngineConfig> {
    let Some(path) = config_path(target.config.as_deref()) else {
        tracing::warn!("Could not determine config path, using defaults");
        return Ok(EngineConfig::default());
    };
    EngineConfig::load(&path).with_context(|| format!("load config {}", path.display()))
}

/// Editor over the file store named by `target`.
pub fn open_editor(target: &TargetArgs) -> Result<ListEditor<FileStore>> {
    let config = load_config(target)?;
    let path = store_path(target.store.as_deref())?;
    debug!(store = %path.display(), "opening store");
    let mut editor =
        ListEditor::new(FileStore::new(path), config).context("allocate working buffers")?;
    if let Some(root) = target.root {
        editor.set_root(root.into());
    }
    Ok(editor)
}

/// Outcome of one subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Result code of a list operation.
    Code(ErrorCode),
    /// Entries read by `list`.
    Listing(EntryListing),
    /// A root setter ran; it reports nothing.
    Silent,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Code(code) => code.as_i32(),
            Self::Listing(_) | Self::Silent => 0,
        }
    }
}

/// Run `command` against `editor`.
pub fn run_command(editor: &mut ListEditor<FileStore>, command: &Command) -> Result<Outcome> {
    let span = info_span!("command", root = %editor.root());
    let _guard = span.enter();

    let outcome = match command {
        Command::Check(args) => Outcome::Code(code(&editor.check(&args.variable, &args.entry))),
        Command::Add(args) => {
            let kind = if args.expandable {
                ValueKind::ExpandString
            } else {
                ValueKind::String
            };
            Outcome::Code(code(&editor.add_value(
                &args.target.variable,
                &args.target.entry,
                kind,
            )))
        }
        Command::DeleteValue(args) => {
            Outcome::Code(code(&editor.delete_value(&args.variable, &args.entry)))
        }
        Command::DeleteVar(args) => Outcome::Code(code(&editor.delete_var(&args.variable))),
        Command::Update(args) => {
            let selector = args.from.map_or("", |root| Root::from(root).hive_name());
            Outcome::Code(code(&editor.update_var(selector, &args.variable)))
        }
        Command::List(args) => match editor.entries(&args.variable) {
            Ok((kind, entries)) => Outcome::Listing(EntryListing {
                variable: args.variable.clone(),
                root: editor.root(),
                kind,
                entries,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "list failed");
                Outcome::Code(e.code())
            }
        },
        Command::Run(args) => {
            let stack_command: StackCommand = args
                .command
                .parse()
                .with_context(|| format!("run {}", args.command))?;
            let mut stack = VecStack::from_args(args.args.iter().map(String::as_str));
            let outcome = editor
                .execute(stack_command, &mut stack)
                .map_or(Outcome::Silent, Outcome::Code);
            debug!(left = ?stack.iter().collect::<Vec<_>>(), "stack after command");
            outcome
        }
    };
    Ok(outcome)
}

/// Print `outcome` on stdout.
pub fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Code(code) => println!("{code}"),
        Outcome::Listing(listing) => print_listing(listing),
        Outcome::Silent => {}
    }
}

fn code(result: &EditResult) -> ErrorCode {
    if let Err(e) = result {
        tracing::warn!(code = e.code().as_str(), error = %e, "operation failed");
    }
    ErrorCode::from_result(result)
}

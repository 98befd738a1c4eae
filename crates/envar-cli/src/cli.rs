//! CLI argument definitions for envar.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Args, ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use envar_core::Root;
use tracing::level_filters::LevelFilter;

use crate::logging::{LogConfig, LogFormat};

#[derive(Parser)]
#[command(
    name = "envar",
    version,
    about = "Edit semicolon-delimited environment list variables",
    long_about = "Check, add and remove single entries of list variables such as PATH.\n\n\
                  Values are kept per user and per machine in a JSON store. Every command\n\
                  prints its result code (0 success, 2 no variable or unreadable store,\n\
                  3 no value, 4 write failed) and exits with it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Build logging configuration from CLI flags with consistent precedence.
    pub fn log_config(&self) -> LogConfig {
        let mut config = LogConfig {
            level_filter: self.verbosity.tracing_level_filter(),
            ..LogConfig::default()
        };
        config.use_env_filter = !(self.verbosity.is_present() || self.log_level.is_some());
        if let Some(level) = self.log_level {
            config.level_filter = match level {
                LogLevelArg::Error => LevelFilter::ERROR,
                LogLevelArg::Warn => LevelFilter::WARN,
                LogLevelArg::Info => LevelFilter::INFO,
                LogLevelArg::Debug => LevelFilter::DEBUG,
                LogLevelArg::Trace => LevelFilter::TRACE,
            };
        }
        config.format = match self.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        };
        config.log_file = self.log_file.clone();
        config.with_ansi = match self.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.log_file.is_none() && io::stderr().is_terminal(),
        };
        config
    }
}

/// Where values are read from and written to.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Store file (default: store.json in the platform data directory).
    #[arg(long = "store", value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,

    /// Engine config file (default: envar.toml in the platform config directory).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Root to operate on (default: taken from the config file).
    #[arg(long = "root", value_enum, global = true)]
    pub root: Option<RootArg>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Test whether ENTRY is present in VARIABLE.
    ///
    /// `check NULL` only tests that the root can be written; `check VARIABLE NULL`
    /// only tests that the variable exists with a string type.
    Check(EntryArgs),

    /// Append ENTRY to VARIABLE unless already present.
    Add(AddArgs),

    /// Remove every occurrence of ENTRY from VARIABLE.
    #[command(name = "delete-value")]
    DeleteValue(EntryArgs),

    /// Delete VARIABLE entirely.
    #[command(name = "delete-var")]
    DeleteVar(VariableArgs),

    /// Publish VARIABLE to the process environment.
    ///
    /// Without --from, the per-machine and per-user values are joined.
    Update(UpdateArgs),

    /// Show the entries of VARIABLE.
    List(VariableArgs),

    /// Invoke a command by its stack name (e.g. AddValue, SetHKLM).
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct VariableArgs {
    #[arg(value_name = "VARIABLE")]
    pub variable: String,
}

#[derive(Args, Debug, Clone)]
pub struct EntryArgs {
    #[arg(value_name = "VARIABLE")]
    pub variable: String,

    #[arg(value_name = "ENTRY", default_value = "")]
    pub entry: String,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    #[command(flatten)]
    pub target: EntryArgs,

    /// Store the value as an expandable string.
    #[arg(long = "expandable", short = 'x')]
    pub expandable: bool,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    #[arg(value_name = "VARIABLE")]
    pub variable: String,

    /// Publish only this root's value.
    #[arg(long = "from", value_enum)]
    pub from: Option<RootArg>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Command name.
    #[arg(value_name = "COMMAND")]
    pub command: String,

    /// Arguments, in the order the command pops them.
    #[arg(value_name = "ARGS", allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// CLI root choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RootArg {
    #[value(alias = "hkcu")]
    User,
    #[value(alias = "hklm")]
    Machine,
}

impl From<RootArg> for Root {
    fn from(value: RootArg) -> Self {
        match value {
            RootArg::User => Root::User,
            RootArg::Machine => Root::Machine,
        }
    }
}

/// CLI log level choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

//! Integration tests for argument parsing and subcommand execution.

use clap::Parser;
use envar_cli::cli::{Cli, Command, LogFormatArg, RootArg};
use envar_cli::commands::{Outcome, open_editor, run_command};
use envar_cli::logging::{LogFormat, default_directives};
use envar_core::{ErrorCode, Root, ValueKind};
use tempfile::tempdir;
use tracing::level_filters::LevelFilter;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("envar").chain(args.iter().copied())).unwrap()
}

// =========================================================================
// Argument parsing
// =========================================================================

#[test]
fn test_parse_add_expandable() {
    let cli = parse(&["add", "PATH", "C:\\tools", "--expandable", "--root", "hklm"]);
    assert_eq!(cli.target.root, Some(RootArg::Machine));
    match cli.command {
        Command::Add(args) => {
            assert!(args.expandable);
            assert_eq!(args.target.variable, "PATH");
            assert_eq!(args.target.entry, "C:\\tools");
        }
        _ => panic!("expected add"),
    }
}

#[test]
fn test_parse_check_without_entry() {
    let cli = parse(&["check", "NULL"]);
    match cli.command {
        Command::Check(args) => {
            assert_eq!(args.variable, "NULL");
            assert_eq!(args.entry, "");
        }
        _ => panic!("expected check"),
    }
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = parse(&["list", "PATH", "--store", "/tmp/s.json", "--log-format", "json"]);
    assert_eq!(cli.target.store.as_deref(), Some(std::path::Path::new("/tmp/s.json")));
    assert_eq!(cli.log_format, LogFormatArg::Json);
}

#[test]
fn test_parse_run_passes_arguments_through() {
    let cli = parse(&["run", "AddValueEx", "MYVAR", "-weird"]);
    match cli.command {
        Command::Run(args) => {
            assert_eq!(args.command, "AddValueEx");
            assert_eq!(args.args, ["MYVAR", "-weird"]);
        }
        _ => panic!("expected run"),
    }
}

#[test]
fn test_parse_rejects_unknown_root() {
    assert!(Cli::try_parse_from(["envar", "list", "PATH", "--root", "hkcr"]).is_err());
}

// =========================================================================
// Log configuration
// =========================================================================

#[test]
fn test_log_config_defaults_to_warn_with_env_filter() {
    let config = parse(&["list", "PATH"]).log_config();
    assert_eq!(config.level_filter, LevelFilter::WARN);
    assert!(config.use_env_filter);
    assert_eq!(config.format, LogFormat::Pretty);
}

#[test]
fn test_log_config_verbosity_disables_env_filter() {
    let config = parse(&["-vv", "list", "PATH"]).log_config();
    assert_eq!(config.level_filter, LevelFilter::DEBUG);
    assert!(!config.use_env_filter);
}

#[test]
fn test_log_config_explicit_level_wins() {
    let config = parse(&["-v", "--log-level", "trace", "list", "PATH"]).log_config();
    assert_eq!(config.level_filter, LevelFilter::TRACE);
}

#[test]
fn test_log_file_disables_ansi() {
    let config = parse(&["--log-file", "/tmp/envar.log", "list", "PATH"]).log_config();
    assert!(!config.with_ansi);
    assert!(config.log_file.is_some());
}

#[test]
fn test_default_directives_scope_workspace_crates() {
    assert_eq!(
        default_directives(LevelFilter::DEBUG),
        "warn,envar_cli=debug,envar_core=debug"
    );
    assert_eq!(
        default_directives(LevelFilter::ERROR),
        "error,envar_cli=error,envar_core=error"
    );
}

// =========================================================================
// Execution
// =========================================================================

fn run(store: &std::path::Path, args: &[&str]) -> Outcome {
    let mut full = vec!["--store", store.to_str().unwrap()];
    full.extend_from_slice(args);
    let cli = parse(&full);
    let mut editor = open_editor(&cli.target).unwrap();
    run_command(&mut editor, &cli.command).unwrap()
}

#[test]
fn test_commands_share_store_file() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("store.json");
    let config = dir.path().join("envar.toml");
    std::fs::write(&config, "notify_on_teardown = false\n").unwrap();
    let store = store.as_path();

    let with_config = |args: &[&str]| {
        let mut full = vec!["--config", config.to_str().unwrap()];
        full.extend_from_slice(args);
        run(store, &full)
    };

    assert_eq!(with_config(&["add", "MYVAR", "C:\\a"]), Outcome::Code(ErrorCode::Success));
    assert_eq!(
        with_config(&["add", "MYVAR", "%HOME%", "-x"]),
        Outcome::Code(ErrorCode::Success)
    );
    assert_eq!(with_config(&["check", "myvar", "c:\\A"]), Outcome::Code(ErrorCode::Success));
    assert_eq!(
        with_config(&["delete-value", "MYVAR", "C:\\zzz"]),
        Outcome::Code(ErrorCode::NoValue)
    );

    match with_config(&["list", "MYVAR"]) {
        Outcome::Listing(listing) => {
            assert_eq!(listing.root, Root::User);
            assert_eq!(listing.kind, ValueKind::ExpandString);
            assert_eq!(listing.entries, ["C:\\a", "%HOME%"]);
        }
        other => panic!("expected listing, got {other:?}"),
    }

    assert_eq!(with_config(&["delete-var", "path"]), Outcome::Code(ErrorCode::NoWrite));
    assert_eq!(with_config(&["delete-var", "MYVAR"]), Outcome::Code(ErrorCode::Success));
    assert_eq!(
        with_config(&["list", "MYVAR"]),
        Outcome::Code(ErrorCode::NoVariable)
    );
}

#[test]
fn test_run_drives_stack_commands() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("store.json");
    assert_eq!(run(&store, &["run", "SetHKLM"]), Outcome::Silent);
    assert_eq!(
        run(&store, &["--root", "machine", "run", "AddValue", "MYVAR", "x"]),
        Outcome::Code(ErrorCode::Success)
    );
    assert_eq!(
        run(&store, &["run", "Check", "MYVAR", "x"]),
        Outcome::Code(ErrorCode::NoVariable)
    );
    assert_eq!(
        run(&store, &["--root", "hklm", "run", "check", "MYVAR", "x"]),
        Outcome::Code(ErrorCode::Success)
    );
}

#[test]
fn test_unparsable_config_is_an_error() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("envar.toml");
    std::fs::write(&config, "initial_capacity = [").unwrap();
    let cli = parse(&[
        "--config",
        config.to_str().unwrap(),
        "--store",
        dir.path().join("store.json").to_str().unwrap(),
        "list",
        "PATH",
    ]);
    assert!(open_editor(&cli.target).is_err());
}

#[test]
fn test_unknown_run_command_is_an_error() {
    let dir = tempdir().unwrap();
    let cli = parse(&[
        "--store",
        dir.path().join("store.json").to_str().unwrap(),
        "run",
        "Frobnicate",
    ]);
    let mut editor = open_editor(&cli.target).unwrap();
    assert!(run_command(&mut editor, &cli.command).is_err());
}

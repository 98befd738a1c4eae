//! envar CLI.

use anyhow::Result;
use clap::Parser;
use envar_cli::cli::Cli;
use envar_cli::commands::{Outcome, open_editor, print_outcome, run_command};
use envar_cli::logging::init_logging;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = cli.log_config();
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(outcome) => {
            print_outcome(&outcome);
            outcome.exit_code()
        }
        Err(error) => {
            tracing::error!("{error:#}");
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Run the subcommand; the editor is dropped, and its change notification
/// sent, before the process exits.
fn run(cli: &Cli) -> Result<Outcome> {
    let mut editor = open_editor(&cli.target)?;
    run_command(&mut editor, &cli.command)
}

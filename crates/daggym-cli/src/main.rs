//! daggym CLI - verify Dungeons of Daggorath ROM archives and drive MAME.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod progress;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet);
    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);
    let show_progress = !cli.quiet && !cli.json;

    let result = match &cli.command {
        cli::Commands::Verify(args) => commands::verify::execute(args, &*formatter, show_progress),
        cli::Commands::SetupHash(args) => commands::setup_hash::execute(args, &*formatter),
        cli::Commands::Launch(args) => commands::launch::execute(args, &*formatter),
        cli::Commands::Play(args) => commands::play::execute(args, &*formatter),
        cli::Commands::Ipc(args) => commands::ipc::execute(args, &*formatter),
        cli::Commands::Completion { shell } => {
            commands::completion::execute(*shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(&err);
            ExitCode::from(error::exit_code(&err))
        }
    }
}

//! # Spinhall CLI Library
//!
//! Command-line front end for the Spinhall slot engine. It plays spins
//! through a session controller, runs bulk simulations that write spin logs,
//! and inspects paytables and reel weights.
//!
//! ## Main Entry Point
//!
//! [`run`] parses arguments, dispatches to a subcommand and returns the exit
//! code.
//!
//! ```no_run
//! use std::io;
//! let args = vec!["spinhall", "spin", "--game", "zeus", "--spins", "5"];
//! let code = spinhall_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `spin`: Play spins through a lobby and spin controller
//! - `sim`: Simulate spins against the engine and write a JSONL spin log
//! - `stats`: Aggregate spin logs and check their balance chain
//! - `rng`: Compare observed symbol frequencies with the reel weights
//! - `paytable`: Print symbols, weights and payouts of a game
//! - `cfg`: Display resolved configuration and its sources
//!
//! Setting `SPINHALL_LOG` (for example `SPINHALL_LOG=debug`) turns on
//! structured logging to stderr.

use clap::Parser;
use std::io::Write;
pub mod cli;
mod commands;
mod config;
mod error;
pub mod exit_code;
pub mod io_utils;
pub mod ui;

use cli::{Commands, SpinhallCli};
use commands::{
    SimArgs, SpinArgs, handle_cfg_command, handle_paytable_command, handle_rng_command,
    handle_sim_command, handle_spin_command, handle_stats_command,
};

pub use error::{BatchValidationError, CliError};

pub const LOG_ENV: &str = "SPINHALL_LOG";

/// Main entry point for the CLI application.
///
/// # Returns
///
/// [`exit_code::SUCCESS`] on success, [`exit_code::ERROR`] for bad arguments
/// and failed commands. `--help` and `--version` print to `out` and succeed.
///
/// # Example
///
/// ```
/// use std::io;
/// let args = vec!["spinhall", "paytable", "--game", "classic"];
/// let code = spinhall_cli::run(args, &mut io::sink(), &mut io::sink());
/// assert_eq!(code, 0);
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    const COMMANDS: &[&str] = &["spin", "sim", "stats", "rng", "paytable", "cfg"];
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    if let Ok(filter) = std::env::var(LOG_ENV)
        && !filter.is_empty()
    {
        // a subscriber may already be installed by an earlier run in-process
        let _ = spinhall_session::logging::init_logging_with(&filter);
    }

    let cli = match SpinhallCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(out, "{}", e).is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::SUCCESS
                }
                _ => {
                    if writeln!(err, "{}", e).is_err()
                        || writeln!(err).is_err()
                        || writeln!(err, "Spinhall Slot CLI").is_err()
                        || writeln!(err, "Usage: spinhall <command> [options]\n").is_err()
                        || writeln!(err, "Commands:").is_err()
                    {
                        return exit_code::ERROR;
                    }
                    for c in COMMANDS {
                        if writeln!(err, "  {}", c).is_err() {
                            return exit_code::ERROR;
                        }
                    }
                    let _ = writeln!(err, "\nFor full help, run: spinhall --help");
                    exit_code::ERROR
                }
            };
        }
    };

    let result = match cli.cmd {
        Commands::Spin {
            game,
            bet,
            spins,
            seed,
            balance,
            auto,
        } => handle_spin_command(
            SpinArgs {
                game,
                bet,
                spins,
                seed,
                balance,
                auto,
            },
            out,
            err,
        ),
        Commands::Sim {
            game,
            spins,
            bet,
            seed,
            balance,
            output,
        } => handle_sim_command(
            SimArgs {
                game,
                spins,
                bet,
                seed,
                balance,
                output,
            },
            out,
            err,
        ),
        Commands::Stats { input } => handle_stats_command(input, out, err),
        Commands::Rng { game, draws, seed } => handle_rng_command(game, draws, seed, out, err),
        Commands::Paytable { game } => handle_paytable_command(game, out),
        Commands::Cfg => handle_cfg_command(out, err),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            let _ = writeln!(err, "Error: {}", e);
            exit_code::ERROR
        }
    }
}

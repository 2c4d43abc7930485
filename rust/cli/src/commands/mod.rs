//! Command handlers for the Spinhall CLI.
//!
//! Each subcommand lives in its own module and exposes
//! `handle_COMMAND_command(...) -> Result<(), CliError>`. Output streams are
//! passed in as `&mut dyn Write` so tests can capture them.

mod cfg;
mod paytable;
mod rng;
mod sim;
mod spin;
mod stats;

pub use cfg::handle_cfg_command;
pub use paytable::handle_paytable_command;
pub use rng::handle_rng_command;
pub use sim::{SimArgs, handle_sim_command};
pub use spin::{SpinArgs, handle_spin_command};
pub use stats::handle_stats_command;

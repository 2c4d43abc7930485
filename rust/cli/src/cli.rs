use clap::{Parser, Subcommand};
use spinhall_engine::machine::GameKind;

#[derive(Parser, Debug)]
#[command(name = "spinhall", version, about = "Spinhall slot engine CLI")]
pub struct SpinhallCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play spins through a session controller
    Spin {
        #[arg(long, default_value = "classic")]
        game: GameKind,
        /// Stake per spin; defaults to the configured bet
        #[arg(long)]
        bet: Option<u64>,
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
        spins: u64,
        #[arg(long)]
        seed: Option<u64>,
        /// Opening balance; defaults to the configured starting balance
        #[arg(long)]
        balance: Option<u64>,
        /// Let auto-roll drive the spins until `--spins` or the balance runs out
        #[arg(long)]
        auto: bool,
    },
    /// Simulate spins and write a JSONL spin log
    Sim {
        #[arg(long, default_value = "classic")]
        game: GameKind,
        #[arg(long)]
        spins: u64,
        #[arg(long)]
        bet: Option<u64>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        balance: Option<u64>,
        #[arg(long)]
        output: Option<String>,
    },
    /// Aggregate a spin log (.jsonl or .jsonl.zst, file or directory)
    Stats {
        #[arg(long)]
        input: String,
    },
    /// Compare observed symbol frequencies with the configured weights
    Rng {
        #[arg(long, default_value = "classic")]
        game: GameKind,
        #[arg(long, default_value_t = 100_000)]
        draws: u64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print a game's symbols, weights and payouts
    Paytable {
        #[arg(long, default_value = "classic")]
        game: GameKind,
    },
    /// Show resolved configuration and where each value came from
    Cfg,
}

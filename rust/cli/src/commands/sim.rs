//! `sim`: plays spins directly against the engine on a fresh ledger and
//! writes one [`SpinRecord`] JSON line per spin.
//!
//! The run stops early, with a warning, once the balance no longer covers
//! the bet. Seeded runs are reproducible.

use crate::config;
use crate::error::CliError;
use crate::io_utils::ensure_parent_dir;
use crate::ui;
use spinhall_engine::ledger::{Credits, Ledger};
use spinhall_engine::logger::{SpinLogger, SpinRecord};
use spinhall_engine::machine::{GameKind, SlotMachine};
use spinhall_engine::reels::ReelGenerator;
use std::io::Write;

#[derive(Debug, Clone)]
pub struct SimArgs {
    pub game: GameKind,
    pub spins: u64,
    pub bet: Option<Credits>,
    pub seed: Option<u64>,
    pub balance: Option<Credits>,
    pub output: Option<String>,
}

pub fn handle_sim_command(
    args: SimArgs,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if args.spins == 0 {
        ui::write_error(err, "spins must be >= 1")?;
        return Err(CliError::InvalidInput("spins must be >= 1".to_string()));
    }
    let cfg = config::load()?;
    let bet = args.bet.unwrap_or(cfg.default_bet);
    if bet == 0 {
        ui::write_error(err, "bet must be >= 1")?;
        return Err(CliError::InvalidInput("bet must be >= 1".to_string()));
    }
    let seed = args.seed.or(cfg.seed).unwrap_or_else(rand::random);

    let machine = SlotMachine::for_kind(args.game);
    let mut reels = ReelGenerator::new_with_seed(seed);
    let mut ledger = Ledger::new(args.balance.unwrap_or(cfg.starting_balance));
    let mut logger = match &args.output {
        Some(p) => {
            let path = std::path::Path::new(p);
            if let Err(e) = ensure_parent_dir(path) {
                ui::write_error(err, &e)?;
                return Err(CliError::Io(std::io::Error::other(e)));
            }
            SpinLogger::create(path).map_err(|e| {
                CliError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to open output file {}: {}", p, e),
                ))
            })?
        }
        None => SpinLogger::detached("00000000"),
    };

    let mut played = 0u64;
    let mut wins = 0u64;
    let mut won: Credits = 0;
    for _ in 0..args.spins {
        if ledger.debit(bet, &format!("Bet on {}", args.game)).is_err() {
            ui::display_warning(
                err,
                &format!(
                    "stopped after {} spins: balance {} is below the bet {}",
                    played,
                    ledger.balance(),
                    bet
                ),
            )?;
            break;
        }
        let eval = machine.spin(&mut reels, bet);
        if eval.winnings > 0 {
            ledger.credit(eval.winnings, &format!("Win on {}", args.game))?;
            wins += 1;
            won = won.saturating_add(eval.winnings);
        }
        played += 1;

        let record = SpinRecord {
            spin_id: logger.next_id(),
            game: args.game,
            seed: Some(seed),
            bet,
            reels: eval.reels,
            winnings: eval.winnings,
            balance_after: ledger.balance(),
            ts: None,
        };
        logger.write(&record)?;
    }

    let wagered = played.saturating_mul(bet);
    tracing::info!(game = %args.game, seed, played, wins, won, "simulation finished");

    writeln!(out, "Simulated {} spins of {} (seed {})", played, args.game, seed)?;
    writeln!(out, "Wins: {} ({})", wins, ui::percent(wins, played))?;
    writeln!(out, "Wagered: {}  Won: {}", wagered, won)?;
    writeln!(
        out,
        "RTP: {} (expected {:.2}%)",
        ui::percent(won, wagered),
        machine.expected_return() * 100.0
    )?;
    writeln!(out, "Final balance: {}", ledger.balance())?;
    if let Some(p) = &args.output {
        writeln!(out, "Spin log: {}", p)?;
    }
    Ok(())
}

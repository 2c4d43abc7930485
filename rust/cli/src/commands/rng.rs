//! `rng`: draws symbols from a game's reel distribution and compares the
//! observed frequencies with the configured weights.
//!
//! The same seed always produces the same report.

use crate::error::CliError;
use crate::ui;
use spinhall_engine::machine::{GameKind, SlotMachine};
use spinhall_engine::reels::ReelGenerator;
use std::collections::HashMap;
use std::io::Write;

pub fn handle_rng_command(
    game: GameKind,
    draws: u64,
    seed: Option<u64>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if draws == 0 {
        ui::write_error(err, "draws must be >= 1")?;
        return Err(CliError::InvalidInput("draws must be >= 1".to_string()));
    }
    let machine = SlotMachine::for_kind(game);
    let distribution = machine.distribution();
    let s = seed.unwrap_or_else(rand::random);
    let mut generator = ReelGenerator::new_with_seed(s);

    let mut counts = HashMap::new();
    let mut remaining = draws;
    // draw in reel-sized batches so large runs don't allocate one huge set
    while remaining > 0 {
        let batch = remaining.min(4_096);
        for symbol in generator.generate(distribution, batch as usize) {
            *counts.entry(symbol).or_insert(0u64) += 1;
        }
        remaining -= batch;
    }

    writeln!(out, "Game: {}  seed: {}  draws: {}", game, s, draws)?;
    writeln!(out, "{:<12} {:>9} {:>9} {:>9}", "SYMBOL", "EXPECTED", "OBSERVED", "DELTA")?;
    let mut worst = 0.0f64;
    for entry in distribution.entries() {
        let observed = counts.get(&entry.symbol).copied().unwrap_or(0) as f64 / draws as f64;
        let expected = distribution.probability(entry.symbol);
        let delta = (observed - expected) * 100.0;
        worst = worst.max(delta.abs());
        writeln!(
            out,
            "{:<12} {:>8.2}% {:>8.2}% {:>+8.2}%",
            entry.symbol.name(),
            expected * 100.0,
            observed * 100.0,
            delta
        )?;
    }
    writeln!(out, "Largest deviation: {:.2} percentage points", worst)?;
    Ok(())
}

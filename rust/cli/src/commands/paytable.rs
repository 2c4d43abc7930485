//! `paytable`: symbols, reel weights, multipliers and payouts of one game.

use crate::error::CliError;
use spinhall_engine::machine::{GameKind, SlotMachine};
use std::io::Write;

pub fn handle_paytable_command(game: GameKind, out: &mut dyn Write) -> Result<(), CliError> {
    let machine = SlotMachine::for_kind(game);
    let table = machine.payout_table();
    let counts: Vec<usize> = (table.min_count()..=machine.width()).collect();

    writeln!(out, "Game: {} ({} reels)", game, machine.width())?;
    write!(out, "{:<12} {:>6} {:>5}", "SYMBOL", "WEIGHT", "MULT")?;
    for c in &counts {
        write!(out, " {:>7}", format!("x{}", c))?;
    }
    writeln!(out)?;

    for entry in machine.distribution().entries() {
        let s = entry.symbol;
        write!(
            out,
            "{:<12} {:>5}% {:>5}",
            format!("{} {}", s.glyph(), s.name()),
            entry.weight,
            s.multiplier()
        )?;
        for &c in &counts {
            write!(out, " {:>7}", table.payout(s, c, 1))?;
        }
        writeln!(out)?;
    }
    writeln!(out, "Payouts are per credit staked.")?;
    writeln!(
        out,
        "Expected return: {:.2}%",
        machine.expected_return() * 100.0
    )?;
    Ok(())
}

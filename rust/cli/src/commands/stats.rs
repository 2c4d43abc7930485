//! `stats`: aggregates spin logs written by `sim`.
//!
//! Reads a `.jsonl` / `.jsonl.zst` file or every such file below a directory
//! and reports spins, wins, money in and out, return-to-player and the
//! largest win. Within each file consecutive records must chain: a spin's
//! balance before must equal the previous spin's balance after.

use crate::error::{BatchValidationError, CliError};
use crate::io_utils::{read_text_auto, spin_logs_in};
use crate::ui;
use spinhall_engine::logger::SpinRecord;
use std::io::Write;
use std::path::Path;

#[derive(Default)]
struct StatsState {
    spins: u64,
    wins: u64,
    wagered: u64,
    won: u64,
    largest_win: Option<(String, u64)>,
    final_balance: Option<u64>,
    skipped: u64,
    corrupted: u64,
    chain_breaks: Vec<BatchValidationError<String>>,
}

pub fn handle_stats_command(
    input: String,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let path = Path::new(&input);
    let mut state = StatsState::default();

    if path.is_dir() {
        for file in spin_logs_in(path) {
            let name = file.to_string_lossy().into_owned();
            match read_text_auto(&name) {
                Ok(content) => consume(&content, &name, &mut state),
                Err(_) => state.corrupted += 1,
            }
        }
    } else {
        match read_text_auto(&input) {
            Ok(content) => consume(&content, &input, &mut state),
            Err(e) => {
                ui::write_error(err, &format!("Failed to read {}: {}", input, e))?;
                return Err(CliError::InvalidInput(format!(
                    "Failed to read {}: {}",
                    input, e
                )));
            }
        }
    }

    if state.corrupted > 0 {
        ui::write_error(
            err,
            &format!("Skipped {} corrupted record(s)", state.corrupted),
        )?;
    }
    if state.skipped > 0 {
        ui::write_error(
            err,
            &format!("Discarded {} incomplete final line(s)", state.skipped),
        )?;
    }
    if !path.is_dir() && state.spins == 0 && (state.corrupted > 0 || state.skipped > 0) {
        ui::write_error(err, "Invalid record")?;
        return Err(CliError::InvalidInput("Invalid record".to_string()));
    }

    let ratio = |num: u64, den: u64| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let summary = serde_json::json!({
        "spins": state.spins,
        "wins": state.wins,
        "hit_rate": ratio(state.wins, state.spins),
        "wagered": state.wagered,
        "won": state.won,
        "rtp": ratio(state.won, state.wagered),
        "largest_win": state.largest_win.as_ref().map(|(id, amount)| serde_json::json!({
            "spin_id": id,
            "winnings": amount,
        })),
        "final_balance": state.final_balance,
    });
    let json_output = serde_json::to_string_pretty(&summary)
        .map_err(|e| CliError::InvalidInput(format!("Failed to serialize stats: {}", e)))?;
    writeln!(out, "{}", json_output)?;

    if state.chain_breaks.is_empty() {
        return Ok(());
    }
    for e in &state.chain_breaks {
        ui::write_error(err, &e.to_string())?;
    }
    Err(CliError::InvalidInput(format!(
        "Balance chain inconsistent in {} place(s)",
        state.chain_breaks.len()
    )))
}

fn consume(content: &str, source: &str, state: &mut StatsState) {
    let has_trailing_nl = content.ends_with('\n');
    let lines: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .collect();
    let mut previous: Option<u64> = None;

    for (i, &(line_no, line)) in lines.iter().enumerate() {
        let rec: SpinRecord = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(_) => {
                if i == lines.len() - 1 && !has_trailing_nl {
                    state.skipped += 1;
                } else {
                    state.corrupted += 1;
                }
                continue;
            }
        };

        if let Some(prev) = previous
            && rec.balance_before() != Some(prev)
        {
            state.chain_breaks.push(BatchValidationError {
                item_context: format!("{}:{}", source, line_no + 1),
                message: format!(
                    "balance chain broken at spin {}: previous balance {}, this spin starts from {}",
                    rec.spin_id,
                    prev,
                    rec.balance_before()
                        .map(|b| b.to_string())
                        .unwrap_or_else(|| "an impossible balance".to_string())
                ),
            });
        }
        previous = Some(rec.balance_after);

        state.spins += 1;
        state.wagered = state.wagered.saturating_add(rec.bet);
        state.won = state.won.saturating_add(rec.winnings);
        if rec.winnings > 0 {
            state.wins += 1;
            let bigger = state
                .largest_win
                .as_ref()
                .is_none_or(|(_, best)| rec.winnings > *best);
            if bigger {
                state.largest_win = Some((rec.spin_id.clone(), rec.winnings));
            }
        }
        state.final_balance = Some(rec.balance_after);
    }
}

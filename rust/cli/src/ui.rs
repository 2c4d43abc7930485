//! Terminal output helpers shared by the commands.

use spinhall_engine::ledger::Credits;
use spinhall_engine::symbols::{Symbol, render_glyphs};
use std::io::Write;

pub fn write_error(err: &mut dyn Write, msg: &str) -> std::io::Result<()> {
    writeln!(err, "Error: {}", msg)
}

pub fn display_warning(err: &mut dyn Write, message: &str) -> std::io::Result<()> {
    writeln!(err, "WARNING: {}", message)
}

/// One line per spin: `#3 [💎 💎 ⭐ ❤️ 🎁] win 200 | balance 5100`.
pub fn spin_line(index: u64, reels: &[Symbol], winnings: Credits, balance: Credits) -> String {
    let result = if winnings > 0 {
        format!("win {}", winnings)
    } else {
        "no win".to_string()
    };
    format!(
        "#{} [{}] {} | balance {}",
        index,
        render_glyphs(reels),
        result,
        balance
    )
}

/// Ratio as a percentage with two decimals; `0.00%` when `den` is zero.
pub fn percent(num: u64, den: u64) -> String {
    if den == 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", num as f64 * 100.0 / den as f64)
}

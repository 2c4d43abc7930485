use serde::{Deserialize, Serialize};

use crate::paytable::PayoutTable;
use crate::symbols::Symbol;

/// The most frequent symbol of a reel set and how often it appears.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub symbol: Symbol,
    pub count: usize,
}

/// Finds the dominant symbol of `reels`.
///
/// Ties on count go to the higher multiplier, then to the symbol that appears
/// first. Returns `None` only for an empty reel set.
pub fn summarize(reels: &[Symbol]) -> Option<MatchSummary> {
    // first-appearance order is preserved for the final tiebreak
    let mut counts: Vec<(Symbol, usize)> = Vec::with_capacity(reels.len());
    for &s in reels {
        match counts.iter_mut().find(|(seen, _)| *seen == s) {
            Some(entry) => entry.1 += 1,
            None => counts.push((s, 1)),
        }
    }

    let mut best: Option<MatchSummary> = None;
    for (symbol, count) in counts {
        let better = match best {
            None => true,
            Some(b) => {
                count > b.count || (count == b.count && symbol.multiplier() > b.symbol.multiplier())
            }
        };
        if better {
            best = Some(MatchSummary { symbol, count });
        }
    }
    best
}

/// Reduces a reel set and stake to winnings under `table`.
///
/// Deterministic: identical inputs always produce identical winnings.
///
/// # Examples
///
/// ```
/// use spinhall_engine::payout::evaluate;
/// use spinhall_engine::paytable::PayoutTable;
/// use spinhall_engine::symbols::Symbol::*;
///
/// let table = PayoutTable::classic();
/// assert_eq!(evaluate(&[Diamond; 5], 100, &table), 100_000);
/// assert_eq!(evaluate(&[Gift, Gift, Star, Heart, Lightning], 100, &table), 200);
/// assert_eq!(evaluate(&[Diamond, Lightning, Star, Heart, Gift], 100, &table), 0);
/// ```
pub fn evaluate(reels: &[Symbol], bet: u64, table: &PayoutTable) -> u64 {
    summarize(reels)
        .map(|m| table.payout(m.symbol, m.count, bet))
        .unwrap_or(0)
}

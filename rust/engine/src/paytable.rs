use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::ConfigError;
use crate::symbols::Symbol;

/// Fixed payouts (in units of the bet) for the 3/4/5-of-a-kind brackets.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketPays {
    pub three: u64,
    pub four: u64,
    pub five: u64,
}

impl BracketPays {
    pub const fn new(three: u64, four: u64, five: u64) -> Self {
        Self { three, four, five }
    }

    /// Counts above five pay the five bracket.
    fn for_count(&self, count: usize) -> u64 {
        match count {
            0..=2 => 0,
            3 => self.three,
            4 => self.four,
            _ => self.five,
        }
    }
}

/// How a matched run of identical symbols turns into winnings.
///
/// The two shipped games use incompatible schemes, kept as separate variants:
/// the classic game scales the symbol multiplier by a per-count factor, the
/// Zeus game pays a fixed amount per symbol and bracket and nothing for pairs.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayoutTable {
    /// winnings = bet x multiplier x scale[count]
    CountScaled { scales: BTreeMap<usize, u64> },
    /// winnings = bet x pays[symbol][count]
    Bracketed { pays: BTreeMap<Symbol, BracketPays> },
}

/// Smallest run the bracketed scheme pays for.
pub const BRACKET_MIN_COUNT: usize = 3;

impl PayoutTable {
    /// 2 -> x1, 3 -> x5, 4 -> x20, 5 -> x100
    pub fn classic() -> Self {
        PayoutTable::CountScaled {
            scales: BTreeMap::from([(2, 1), (3, 5), (4, 20), (5, 100)]),
        }
    }

    pub fn zeus() -> Self {
        PayoutTable::Bracketed {
            pays: BTreeMap::from([
                (Symbol::Zeus, BracketPays::new(50, 200, 1000)),
                (Symbol::Thunderbolt, BracketPays::new(25, 100, 500)),
                (Symbol::Eagle, BracketPays::new(15, 60, 250)),
                (Symbol::Helmet, BracketPays::new(10, 40, 150)),
                (Symbol::Laurel, BracketPays::new(5, 20, 75)),
                (Symbol::Amphora, BracketPays::new(2, 8, 30)),
            ]),
        }
    }

    /// Minimum run length that pays anything.
    pub fn min_count(&self) -> usize {
        match self {
            PayoutTable::CountScaled { scales } => scales.keys().next().copied().unwrap_or(usize::MAX),
            PayoutTable::Bracketed { .. } => BRACKET_MIN_COUNT,
        }
    }

    /// Winnings for `count` matching `symbol`s at stake `bet`. Zero below
    /// [`PayoutTable::min_count`].
    pub fn payout(&self, symbol: Symbol, count: usize, bet: u64) -> u64 {
        if count < self.min_count() {
            return 0;
        }
        match self {
            PayoutTable::CountScaled { scales } => {
                // runs longer than the table pay the top entry
                let scale = scales
                    .range(..=count)
                    .next_back()
                    .map(|(_, s)| *s)
                    .unwrap_or(0);
                bet.saturating_mul(symbol.multiplier())
                    .saturating_mul(scale)
            }
            PayoutTable::Bracketed { pays } => pays
                .get(&symbol)
                .map(|p| bet.saturating_mul(p.for_count(count)))
                .unwrap_or(0),
        }
    }

    /// Checks that every symbol a machine can draw has a bracketed payout.
    pub fn validate_for(&self, symbols: impl IntoIterator<Item = Symbol>) -> Result<(), ConfigError> {
        if let PayoutTable::Bracketed { pays } = self {
            for s in symbols {
                if !pays.contains_key(&s) {
                    return Err(ConfigError::MissingPayout(s));
                }
            }
        }
        Ok(())
    }
}

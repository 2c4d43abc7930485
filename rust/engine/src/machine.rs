use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ConfigError;
use crate::payout::{summarize, MatchSummary};
use crate::paytable::PayoutTable;
use crate::reels::{
    ReelDistribution, ReelSet, ReelSource, WeightedSymbol, DEFAULT_REEL_WIDTH, WEIGHT_TOTAL,
};
use crate::symbols::{Symbol, CLASSIC_SYMBOLS, ZEUS_SYMBOLS};

/// Reel weights of both presets, rarest symbol first.
const PRESET_WEIGHTS: [u32; 6] = [5, 10, 15, 15, 20, 35];

/// The slot games shipped with the lobby.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Classic,
    Zeus,
}

impl GameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GameKind::Classic => "classic",
            GameKind::Zeus => "zeus",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" | "slot" => Ok(GameKind::Classic),
            "zeus" => Ok(GameKind::Zeus),
            other => Err(format!("unknown game: {}", other)),
        }
    }
}

/// Outcome of running one reel set through a machine's pay table.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SpinEvaluation {
    pub reels: ReelSet,
    pub best: Option<MatchSummary>,
    pub winnings: u64,
}

impl SpinEvaluation {
    pub fn is_win(&self) -> bool {
        self.winnings > 0
    }
}

/// A configured slot game: reel distribution, pay table and reel width.
///
/// # Examples
///
/// ```
/// use spinhall_engine::machine::SlotMachine;
/// use spinhall_engine::symbols::Symbol;
///
/// let machine = SlotMachine::classic();
/// let eval = machine.evaluate(vec![Symbol::Diamond; 5], 100);
/// assert_eq!(eval.winnings, 100_000);
/// assert!(eval.is_win());
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct SlotMachine {
    kind: GameKind,
    distribution: ReelDistribution,
    table: PayoutTable,
    width: usize,
}

impl SlotMachine {
    pub fn new(
        kind: GameKind,
        distribution: ReelDistribution,
        table: PayoutTable,
        width: usize,
    ) -> Result<Self, ConfigError> {
        let minimum = table.min_count();
        if width < minimum {
            return Err(ConfigError::InvalidWidth { width, minimum });
        }
        table.validate_for(distribution.symbols())?;
        Ok(Self {
            kind,
            distribution,
            table,
            width,
        })
    }

    /// Diamond 5%, Lightning 10%, Star 15%, Heart 15%, Gift 20%, Coin 35%.
    pub fn classic() -> Self {
        Self {
            kind: GameKind::Classic,
            distribution: preset_distribution(PRESET_WEIGHTS, CLASSIC_SYMBOLS),
            table: PayoutTable::classic(),
            width: DEFAULT_REEL_WIDTH,
        }
    }

    /// Same weights as the classic game over the Zeus symbol set.
    pub fn zeus() -> Self {
        Self {
            kind: GameKind::Zeus,
            distribution: preset_distribution(PRESET_WEIGHTS, ZEUS_SYMBOLS),
            table: PayoutTable::zeus(),
            width: DEFAULT_REEL_WIDTH,
        }
    }

    pub fn for_kind(kind: GameKind) -> Self {
        match kind {
            GameKind::Classic => Self::classic(),
            GameKind::Zeus => Self::zeus(),
        }
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }
    pub fn distribution(&self) -> &ReelDistribution {
        &self.distribution
    }
    pub fn payout_table(&self) -> &PayoutTable {
        &self.table
    }
    pub fn width(&self) -> usize {
        self.width
    }

    /// Draws a fresh reel set and evaluates it.
    pub fn spin<S: ReelSource + ?Sized>(&self, source: &mut S, bet: u64) -> SpinEvaluation {
        let reels = source.next_reels(&self.distribution, self.width);
        self.evaluate(reels, bet)
    }

    pub fn evaluate(&self, reels: ReelSet, bet: u64) -> SpinEvaluation {
        let best = summarize(&reels);
        let winnings = best
            .map(|m| self.table.payout(m.symbol, m.count, bet))
            .unwrap_or(0);
        SpinEvaluation {
            reels,
            best,
            winnings,
        }
    }

    /// Exact expected return per unit bet, by enumerating every reel set.
    pub fn expected_return(&self) -> f64 {
        let entries = self.distribution.entries();
        let total = WEIGHT_TOTAL as f64;
        let mut idx = vec![0usize; self.width];
        let mut reels: ReelSet = vec![entries[0].symbol; self.width];
        let mut sum = 0.0;
        loop {
            let mut p = 1.0;
            for (slot, &i) in idx.iter().enumerate() {
                reels[slot] = entries[i].symbol;
                p *= entries[i].weight as f64 / total;
            }
            // bet of 1 is exact for both table kinds
            sum += p * self.evaluate(reels.clone(), 1).winnings as f64;

            // odometer increment over reel positions
            let mut pos = 0;
            loop {
                if pos == self.width {
                    return sum;
                }
                idx[pos] += 1;
                if idx[pos] < entries.len() {
                    break;
                }
                idx[pos] = 0;
                pos += 1;
            }
        }
    }
}

fn preset_distribution(weights: [u32; 6], symbols: [Symbol; 6]) -> ReelDistribution {
    let entries = symbols
        .into_iter()
        .zip(weights)
        .map(|(symbol, weight)| WeightedSymbol::new(symbol, weight))
        .collect();
    ReelDistribution::from_preset(entries)
}

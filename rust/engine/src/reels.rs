use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::symbols::Symbol;

/// Reel weights are expressed in percent.
pub const WEIGHT_TOTAL: u32 = 100;

/// Number of reels in both shipped games.
pub const DEFAULT_REEL_WIDTH: usize = 5;

/// Symbols shown after one spin, left to right.
pub type ReelSet = Vec<Symbol>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct WeightedSymbol {
    pub symbol: Symbol,
    pub weight: u32,
}

impl WeightedSymbol {
    pub const fn new(symbol: Symbol, weight: u32) -> Self {
        Self { symbol, weight }
    }
}

/// Categorical distribution every reel position is drawn from.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ReelDistribution {
    entries: Vec<WeightedSymbol>,
}

impl ReelDistribution {
    /// Builds a distribution, rejecting empty tables, zero weights and
    /// weights that do not add up to [`WEIGHT_TOTAL`].
    pub fn new(entries: Vec<WeightedSymbol>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyDistribution);
        }
        if let Some(e) = entries.iter().find(|e| e.weight == 0) {
            return Err(ConfigError::ZeroWeight(e.symbol));
        }
        let actual: u32 = entries.iter().map(|e| e.weight).sum();
        if actual != WEIGHT_TOTAL {
            return Err(ConfigError::WeightSum {
                expected: WEIGHT_TOTAL,
                actual,
            });
        }
        Ok(Self { entries })
    }

    /// Built-in tables that are known to satisfy the checks in [`ReelDistribution::new`].
    pub(crate) fn from_preset(entries: Vec<WeightedSymbol>) -> Self {
        debug_assert!(entries.iter().map(|e| e.weight).sum::<u32>() == WEIGHT_TOTAL);
        Self { entries }
    }

    pub fn entries(&self) -> &[WeightedSymbol] {
        &self.entries
    }

    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.entries.iter().map(|e| e.symbol)
    }

    pub fn weight_of(&self, symbol: Symbol) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| e.weight)
    }

    /// Probability of `symbol` on a single reel (0.0 for foreign symbols).
    pub fn probability(&self, symbol: Symbol) -> f64 {
        self.weight_of(symbol)
            .map(|w| w as f64 / WEIGHT_TOTAL as f64)
            .unwrap_or(0.0)
    }

    /// Maps a roll in `0..WEIGHT_TOTAL` onto a symbol by cumulative weight.
    pub fn pick(&self, roll: u32) -> Symbol {
        let mut cumulative = 0;
        for e in &self.entries {
            cumulative += e.weight;
            if roll < cumulative {
                return e.symbol;
            }
        }
        // rolls past the table land on the commonest (last) entry
        self.entries[self.entries.len() - 1].symbol
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Symbol {
        self.pick(rng.random_range(0..WEIGHT_TOTAL))
    }
}

/// Random source for reel sets.
///
/// Uses ChaCha20 so a seeded generator replays identical spins.
///
/// ```
/// use spinhall_engine::machine::SlotMachine;
/// use spinhall_engine::reels::ReelGenerator;
///
/// let machine = SlotMachine::classic();
/// let mut a = ReelGenerator::new_with_seed(7);
/// let mut b = ReelGenerator::new_with_seed(7);
/// assert_eq!(
///     a.generate(machine.distribution(), 5),
///     b.generate(machine.distribution(), 5)
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ReelGenerator {
    rng: ChaCha20Rng,
}

impl ReelGenerator {
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self::new_with_seed(rand::random())
    }

    /// Draws `width` independent symbols. Always returns exactly `width` entries.
    pub fn generate(&mut self, distribution: &ReelDistribution, width: usize) -> ReelSet {
        (0..width).map(|_| distribution.draw(&mut self.rng)).collect()
    }
}

/// Anything that can supply the next reel set for a spin.
pub trait ReelSource: Send {
    fn next_reels(&mut self, distribution: &ReelDistribution, width: usize) -> ReelSet;
}

impl ReelSource for ReelGenerator {
    fn next_reels(&mut self, distribution: &ReelDistribution, width: usize) -> ReelSet {
        self.generate(distribution, width)
    }
}

/// Replays a fixed list of reel sets in order, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct ScriptedReels {
    sets: Vec<ReelSet>,
    next: usize,
}

impl ScriptedReels {
    /// `sets` must not be empty.
    pub fn new(sets: Vec<ReelSet>) -> Self {
        assert!(!sets.is_empty(), "scripted reels need at least one set");
        Self { sets, next: 0 }
    }
}

impl ReelSource for ScriptedReels {
    fn next_reels(&mut self, _distribution: &ReelDistribution, _width: usize) -> ReelSet {
        let reels = self.sets[self.next].clone();
        self.next = (self.next + 1) % self.sets.len();
        reels
    }
}

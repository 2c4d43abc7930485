use serde::{Deserialize, Serialize};
use std::fmt;

/// A reel symbol.
///
/// Every slot game draws from its own closed subset of these variants; the
/// multiplier is intrinsic to the symbol and shared by every game that uses it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    /// Classic jackpot symbol (x10)
    Diamond,
    /// Classic (x5)
    Lightning,
    /// Classic (x4)
    Star,
    /// Classic (x3)
    Heart,
    /// Classic (x2)
    Gift,
    /// Classic filler symbol (x1)
    Coin,
    /// Zeus jackpot symbol (x10)
    Zeus,
    /// Zeus (x5)
    Thunderbolt,
    /// Zeus (x4)
    Eagle,
    /// Zeus (x3)
    Helmet,
    /// Zeus (x2)
    Laurel,
    /// Zeus filler symbol (x1)
    Amphora,
}

/// Symbols of the classic five-reel game, rarest first.
pub const CLASSIC_SYMBOLS: [Symbol; 6] = [
    Symbol::Diamond,
    Symbol::Lightning,
    Symbol::Star,
    Symbol::Heart,
    Symbol::Gift,
    Symbol::Coin,
];

/// Symbols of the Zeus game, rarest first.
pub const ZEUS_SYMBOLS: [Symbol; 6] = [
    Symbol::Zeus,
    Symbol::Thunderbolt,
    Symbol::Eagle,
    Symbol::Helmet,
    Symbol::Laurel,
    Symbol::Amphora,
];

impl Symbol {
    /// Payout multiplier applied by count-scaled pay tables. Always >= 1.
    pub fn multiplier(self) -> u64 {
        match self {
            Symbol::Diamond | Symbol::Zeus => 10,
            Symbol::Lightning | Symbol::Thunderbolt => 5,
            Symbol::Star | Symbol::Eagle => 4,
            Symbol::Heart | Symbol::Helmet => 3,
            Symbol::Gift | Symbol::Laurel => 2,
            Symbol::Coin | Symbol::Amphora => 1,
        }
    }

    /// Display glyph. Presentational only.
    pub fn glyph(self) -> &'static str {
        match self {
            Symbol::Diamond => "💎",
            Symbol::Lightning => "⚡",
            Symbol::Star => "⭐",
            Symbol::Heart => "❤️",
            Symbol::Gift => "🎁",
            Symbol::Coin => "🪙",
            Symbol::Zeus => "🧔",
            Symbol::Thunderbolt => "🌩️",
            Symbol::Eagle => "🦅",
            Symbol::Helmet => "⛑️",
            Symbol::Laurel => "🌿",
            Symbol::Amphora => "🏺",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Symbol::Diamond => "DIAMOND",
            Symbol::Lightning => "LIGHTNING",
            Symbol::Star => "STAR",
            Symbol::Heart => "HEART",
            Symbol::Gift => "GIFT",
            Symbol::Coin => "COIN",
            Symbol::Zeus => "ZEUS",
            Symbol::Thunderbolt => "THUNDERBOLT",
            Symbol::Eagle => "EAGLE",
            Symbol::Helmet => "HELMET",
            Symbol::Laurel => "LAUREL",
            Symbol::Amphora => "AMPHORA",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Renders a reel set as space-separated glyphs, e.g. for terminal output.
pub fn render_glyphs(reels: &[Symbol]) -> String {
    reels
        .iter()
        .map(|s| s.glyph())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipliers_are_at_least_one() {
        for s in CLASSIC_SYMBOLS.iter().chain(ZEUS_SYMBOLS.iter()) {
            assert!(s.multiplier() >= 1, "{} has multiplier < 1", s);
        }
    }

    #[test]
    fn symbol_sets_are_ordered_rarest_first() {
        for set in [CLASSIC_SYMBOLS, ZEUS_SYMBOLS] {
            let mults: Vec<u64> = set.iter().map(|s| s.multiplier()).collect();
            let mut sorted = mults.clone();
            sorted.sort_unstable_by(|a, b| b.cmp(a));
            assert_eq!(mults, sorted);
        }
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&Symbol::Thunderbolt).unwrap();
        assert_eq!(json, "\"thunderbolt\"");
        let back: Symbol = serde_json::from_str("\"diamond\"").unwrap();
        assert_eq!(back, Symbol::Diamond);
    }
}

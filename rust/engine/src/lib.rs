//! # spinhall-engine: Slot Engine Core
//!
//! Synchronous game core for the Spinhall slot games: weighted reel
//! generation, payout tables, payout evaluation and the balance ledger.
//! Randomness comes from a seedable ChaCha20 generator so runs can be replayed.
//!
//! ## Core Modules
//!
//! - [`symbols`] - Reel symbols, glyphs and multipliers
//! - [`reels`] - Weighted reel distribution and the reel generator
//! - [`paytable`] - Count-scaled and bracketed pay tables
//! - [`payout`] - Reduces a reel set and bet to winnings
//! - [`machine`] - Configured games (classic, Zeus)
//! - [`ledger`] - Balance and transaction history
//! - [`logger`] - Spin records and JSONL spin logs
//! - [`errors`] - Error types for ledger and configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use spinhall_engine::ledger::Ledger;
//! use spinhall_engine::machine::SlotMachine;
//! use spinhall_engine::reels::ReelGenerator;
//!
//! let machine = SlotMachine::classic();
//! let mut rng = ReelGenerator::new_with_seed(42);
//! let mut ledger = Ledger::new(5_000);
//!
//! ledger.debit(100, "Bet on classic").unwrap();
//! let eval = machine.spin(&mut rng, 100);
//! if eval.is_win() {
//!     ledger.credit(eval.winnings, "Win on classic").unwrap();
//! }
//! assert_eq!(ledger.net_change(), ledger.history_total());
//! ```

pub mod errors;
pub mod ledger;
pub mod logger;
pub mod machine;
pub mod payout;
pub mod paytable;
pub mod reels;
pub mod symbols;

use serde::{Deserialize, Serialize};

use crate::ledger::Credits;
use crate::machine::GameKind;
use crate::symbols::Symbol;

/// Summary of one completed spin.
/// Serialized to JSONL by simulation runs and read back by the stats command.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SpinRecord {
    /// Unique identifier for this spin (format: YYYYMMDD-NNNNNN)
    pub spin_id: String,
    pub game: GameKind,
    /// RNG seed of the run, when it was seeded
    #[serde(default)]
    pub seed: Option<u64>,
    pub bet: Credits,
    pub reels: Vec<Symbol>,
    pub winnings: Credits,
    /// Balance after the stake was taken and winnings paid
    pub balance_after: Credits,
    /// Timestamp when the spin was played (RFC3339 format)
    #[serde(default)]
    pub ts: Option<String>,
}

impl SpinRecord {
    /// Balance before this spin, reconstructed from stake and winnings.
    pub fn balance_before(&self) -> Option<Credits> {
        self.balance_after
            .checked_sub(self.winnings)?
            .checked_add(self.bet)
    }
}

pub fn format_spin_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

use chrono::{SecondsFormat, Utc};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct SpinLogger {
    writer: Option<BufWriter<File>>,
    date: String,
    seq: u32,
}

impl SpinLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            date: Utc::now().format("%Y%m%d").to_string(),
            seq: 0,
        })
    }

    /// Logger that only hands out ids; nothing is written.
    pub fn detached(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
            seq: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.seq += 1;
        format_spin_id(&self.date, self.seq)
    }

    pub fn write(&mut self, record: &SpinRecord) -> std::io::Result<()> {
        // inject timestamp if missing
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_per_logger() {
        let mut logger = SpinLogger::detached("20260101");
        assert_eq!(logger.next_id(), "20260101-000001");
        assert_eq!(logger.next_id(), "20260101-000002");
    }

    #[test]
    fn balance_before_undoes_spin() {
        let rec = SpinRecord {
            spin_id: "x".into(),
            game: GameKind::Classic,
            seed: None,
            bet: 100,
            reels: vec![Symbol::Coin; 5],
            winnings: 10_000,
            balance_after: 14_900,
            ts: None,
        };
        assert_eq!(rec.balance_before(), Some(5_000));
    }

    #[test]
    fn missing_optional_fields_deserialize() {
        let line = r#"{"spin_id":"a","game":"zeus","bet":1,"reels":["zeus"],"winnings":0,"balance_after":9}"#;
        let rec: SpinRecord = serde_json::from_str(line).unwrap();
        assert_eq!(rec.seed, None);
        assert_eq!(rec.ts, None);
        assert_eq!(rec.game, GameKind::Zeus);
    }
}

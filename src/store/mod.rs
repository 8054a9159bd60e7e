//! Flat-file snapshot persistence.
//!
//! One CSV file holds the latest snapshot and is replaced wholesale on
//! every refresh. Writes go through a temp file and rename, so a reader
//! never observes a partially written snapshot.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use csv::{ReaderBuilder, WriterBuilder};
use tracing::{debug, info};

use crate::error::{RateError, Result};
use crate::rates::{parse_rate_value, RateQuote, RateRecord, COLUMNS};

pub const SNAPSHOT_FILENAME: &str = "vietcombank_exchange_rates.csv";

/// Reads and replaces the on-disk rate snapshot at one explicit path.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a snapshot, replacing any previous one. Returns the resolved
    /// absolute path of the snapshot file.
    pub fn write(&self, records: &[RateRecord]) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create snapshot directory")?;
        }

        let tmp_path = self.path.with_extension("csv.tmp");
        {
            let mut writer = WriterBuilder::new()
                .from_path(&tmp_path)
                .context("Failed to open snapshot file for writing")?;

            writer
                .write_record(COLUMNS)
                .context("Failed to write snapshot header")?;

            for record in records {
                writer
                    .write_record([
                        record.code.as_str(),
                        record.name.as_str(),
                        record.buy_cash.as_deref().unwrap_or(""),
                        record.buy_transfer.as_deref().unwrap_or(""),
                        record.sell.as_str(),
                    ])
                    .with_context(|| format!("Failed to write snapshot row for {}", record.code))?;
            }

            writer.flush().context("Failed to flush snapshot file")?;
        }
        fs::rename(&tmp_path, &self.path).context("Failed to finalize snapshot file")?;

        let resolved =
            fs::canonicalize(&self.path).context("Failed to resolve snapshot path")?;
        info!("Wrote {} rates to {}", records.len(), resolved.display());
        Ok(resolved)
    }

    /// Load the current snapshot, coercing the sell column to a number.
    /// Returns `None` when nothing has been written yet.
    pub fn load(&self) -> Result<Option<Vec<RateQuote>>> {
        if !self.path.exists() {
            debug!("No snapshot at {}", self.path.display());
            return Ok(None);
        }

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .context("Failed to open snapshot file")?;

        let headers = reader
            .headers()
            .context("Failed to read snapshot headers")?
            .clone();
        let find = |name: &str| headers.iter().position(|h| h == name);
        let (Some(code_idx), Some(name_idx), Some(sell_idx)) =
            (find("code"), find("name"), find("sell"))
        else {
            return Err(RateError::Store(format!(
                "snapshot {} is missing expected columns",
                self.path.display()
            ))
            .into());
        };

        let mut quotes = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let row_num = idx + 2;
            let record = result
                .map_err(|e| RateError::Store(format!("bad snapshot row {row_num}: {e}")))?;

            let code = record.get(code_idx).unwrap_or("").trim();
            if code.is_empty() {
                continue;
            }
            let name = record.get(name_idx).unwrap_or("").trim();
            let sell = record.get(sell_idx).unwrap_or("");
            let rate = parse_rate_value(sell).map_err(|e| {
                RateError::Store(format!("bad sell value in snapshot row {row_num}: {e}"))
            })?;

            quotes.push(RateQuote {
                code: code.to_string(),
                name: name.to_string(),
                rate,
            });
        }

        debug!("Loaded {} rates from {}", quotes.len(), self.path.display());
        Ok(Some(quotes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(code: &str, name: &str, sell: &str) -> RateRecord {
        RateRecord {
            code: code.to_string(),
            name: name.to_string(),
            buy_cash: Some("24,600.00".to_string()),
            buy_transfer: None,
            sell: sell.to_string(),
        }
    }

    fn store_in(dir: &TempDir) -> SnapshotStore {
        SnapshotStore::new(dir.path().join("data").join(SNAPSHOT_FILENAME))
    }

    #[test]
    fn test_round_trip_preserves_codes_and_numeric_sell_rates() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let records = vec![
            record("USD", "US DOLLAR", "24,950.00"),
            record("JPY", "JAPANESE YEN", "165.41"),
        ];
        let path = store.write(&records).unwrap();
        assert!(path.is_absolute());

        let quotes = store.load().unwrap().unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].code, "USD");
        assert_eq!(quotes[0].name, "US DOLLAR");
        assert_eq!(quotes[0].rate, 24950.0);
        assert_eq!(quotes[1].code, "JPY");
        assert_eq!(quotes[1].rate, 165.41);
    }

    #[test]
    fn test_write_creates_missing_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("a").join("b").join("rates.csv"));
        store.write(&[record("USD", "US DOLLAR", "24,950.00")]).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_write_replaces_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.write(&[record("USD", "US DOLLAR", "24,950.00")]).unwrap();
        store.write(&[record("EUR", "EURO", "27,233.97")]).unwrap();

        let quotes = store.load().unwrap().unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].code, "EUR");
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_load_snapshot_missing_sell_column_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SNAPSHOT_FILENAME);
        std::fs::write(&path, "code,name\nUSD,US DOLLAR\n").unwrap();

        let err = SnapshotStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("missing expected columns"));
    }

    #[test]
    fn test_load_snapshot_with_garbage_sell_value_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SNAPSHOT_FILENAME);
        std::fs::write(
            &path,
            "code,name,buy_cash,buy_transfer,sell\nUSD,US DOLLAR,,,not-a-rate\n",
        )
        .unwrap();

        let err = SnapshotStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("bad sell value"));
    }

    #[test]
    fn test_absent_buy_rates_round_trip_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let records = vec![RateRecord {
            code: "SGD".to_string(),
            name: "SINGAPORE DOLLAR".to_string(),
            buy_cash: None,
            buy_transfer: Some("18,236.50".to_string()),
            sell: "18,842.11".to_string(),
        }];
        store.write(&records).unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let mut lines = raw.lines();
        assert_eq!(lines.next().unwrap(), "code,name,buy_cash,buy_transfer,sell");
        assert!(lines.next().unwrap().starts_with("SGD,SINGAPORE DOLLAR,,"));

        let quotes = store.load().unwrap().unwrap();
        assert_eq!(quotes[0].rate, 18842.11);
    }
}

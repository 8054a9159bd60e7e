//! Accessor tying a fetch strategy and the snapshot store together.
//!
//! Every read reloads from disk; the only state shared between requests is
//! the snapshot file itself.

use tracing::info;

use crate::error::{RateError, Result};
use crate::fetch::RateSource;
use crate::rates::{dedup_by_code, RateQuote, RateRecord};
use crate::store::SnapshotStore;

pub struct RateService {
    store: SnapshotStore,
    source: Box<dyn RateSource>,
}

impl RateService {
    pub fn new(store: SnapshotStore, source: Box<dyn RateSource>) -> Self {
        Self { store, source }
    }

    /// All cached quotes; empty when nothing has been fetched yet.
    pub fn list(&self) -> Result<Vec<RateQuote>> {
        Ok(self.store.load()?.unwrap_or_default())
    }

    /// Sell rate for an exact currency code match.
    pub fn lookup(&self, code: &str) -> Result<Option<f64>> {
        let quotes = self.list()?;
        Ok(quotes.into_iter().find(|q| q.code == code).map(|q| q.rate))
    }

    /// Fetch a fresh snapshot and replace the cached one.
    ///
    /// Nothing is written until the fetched records are validated, so the
    /// previous snapshot survives any failure, including a source that
    /// answers with zero rows.
    pub async fn refresh(&self) -> Result<Vec<RateQuote>> {
        let records = self.source.fetch_rates().await?;
        if records.is_empty() {
            return Err(RateError::Parse("source returned no rate rows".to_string()).into());
        }

        let records = dedup_by_code(records);
        let quotes = records
            .iter()
            .map(RateRecord::to_quote)
            .collect::<Result<Vec<_>>>()?;

        let path = self.store.write(&records)?;
        info!("Refreshed {} rates into {}", quotes.len(), path.display());
        Ok(quotes)
    }

    /// Fetch once if no snapshot exists yet, so first use reads from disk.
    pub async fn ensure_snapshot(&self) -> Result<()> {
        if self.store.load()?.is_none() {
            info!("No cached snapshot found, fetching initial rates");
            self.refresh().await?;
        }
        Ok(())
    }
}

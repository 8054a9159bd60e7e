// Rate acquisition strategies: direct XML API call and rendered-page scrape.
// Both produce the same record shape so callers never see which one ran.

pub mod api;
pub mod scrape;

use async_trait::async_trait;

use crate::error::Result;
use crate::rates::RateRecord;

/// A source that can produce one full set of rate records.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<Vec<RateRecord>>;
}

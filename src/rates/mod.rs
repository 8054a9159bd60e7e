//! Exchange rate data model
//!
//! One snapshot is the full set of rates published by the bank at one
//! point in time. Records keep the sell rate in the bank's locale format
//! ("24,950.00") until a load coerces it to a number.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{RateError, Result};

/// Column order shared by both fetch strategies and the snapshot file.
pub const COLUMNS: [&str; 5] = ["code", "name", "buy_cash", "buy_transfer", "sell"];

/// One fetched rate row. `sell` is always present; records without a sell
/// rate are dropped at parse time and never constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    pub code: String,
    pub name: String,
    pub buy_cash: Option<String>,
    pub buy_transfer: Option<String>,
    pub sell: String,
}

impl RateRecord {
    /// Coerce this record into the serving shape.
    pub fn to_quote(&self) -> Result<RateQuote> {
        Ok(RateQuote {
            code: self.code.clone(),
            name: self.name.clone(),
            rate: parse_rate_value(&self.sell)?,
        })
    }
}

/// What the endpoints and the CLI expose: code, display name, numeric sell rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateQuote {
    pub code: String,
    pub name: String,
    pub rate: f64,
}

/// Parse a locale-formatted rate string ("24,950.00") into a number.
pub fn parse_rate_value(raw: &str) -> Result<f64> {
    let cleaned: String = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return Err(RateError::Parse(format!("empty rate value {raw:?}")).into());
    }
    cleaned
        .parse::<f64>()
        .map_err(|_| RateError::Parse(format!("invalid rate value {raw:?}")).into())
}

/// Normalize a raw cell or attribute value. The bank publishes "-" for
/// rates it does not quote; treat that the same as an empty value.
pub fn clean_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Drop records whose currency code was already seen, keeping the first
/// occurrence. Fields from different duplicates are never merged.
pub fn dedup_by_code(records: Vec<RateRecord>) -> Vec<RateRecord> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(records.len());
    for record in records {
        if seen.insert(record.code.clone()) {
            unique.push(record);
        } else {
            warn!("Dropping duplicate rate row for {}", record.code);
        }
    }
    unique
}

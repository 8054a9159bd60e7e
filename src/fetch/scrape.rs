//! Scrape strategy for the bank's rendered rates page.
//!
//! The rates table is filled in client-side after load, so a plain GET
//! returns an empty shell. Headless Chrome renders the page; the table
//! extraction itself is a pure function over the HTML so it can be tested
//! against fixtures.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use super::RateSource;
use crate::error::{RateError, Result};
use crate::rates::{clean_value, RateRecord};

pub const VCB_RATES_URL: &str =
    "https://www.vietcombank.com.vn/vi-VN/KHCN/Cong-cu-Tien-ich/Ty-gia";

/// Currencies that identify the rates table among other tables on the page.
const TABLE_MARKERS: [&str; 3] = ["USD", "EUR", "JPY"];

/// Scrapes the rendered rates page with headless Chrome.
pub struct ScrapeSource {
    url: String,
}

impl ScrapeSource {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
        }
    }

    /// Render the rates page and return its HTML.
    fn render_page(&self) -> Result<String> {
        info!("Launching headless Chrome browser");

        let options = LaunchOptions {
            headless: true,
            sandbox: false,
            args: vec![
                std::ffi::OsStr::new("--disable-blink-features=AutomationControlled"),
                std::ffi::OsStr::new("--disable-dev-shm-usage"),
                std::ffi::OsStr::new("--user-agent=Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"),
            ],
            ..Default::default()
        };

        let browser = Browser::new(options)
            .context("Failed to launch headless Chrome. Is Chrome/Chromium installed?")?;

        let tab = browser
            .new_tab()
            .context("Failed to create new browser tab")?;

        info!("Scraping exchange rates from {}", self.url);
        tab.navigate_to(&self.url)
            .map_err(|e| RateError::Network(format!("failed to open {}: {e}", self.url)))?;

        tab.wait_for_element_with_custom_timeout("body", Duration::from_secs(10))
            .map_err(|e| RateError::Network(format!("timed out waiting for page body: {e}")))?;

        // The rates table is appended after the first scroll event.
        tab.evaluate("window.scrollTo(0, 500);", false)
            .context("Failed to scroll rates page")?;
        std::thread::sleep(Duration::from_secs(1));

        tab.get_content().context("Failed to read rendered page HTML")
    }
}

#[async_trait]
impl RateSource for ScrapeSource {
    async fn fetch_rates(&self) -> Result<Vec<RateRecord>> {
        let html = self.render_page()?;
        extract_rates(&html)
    }
}

/// Pull rate records out of the rendered page HTML.
///
/// Takes the first table mentioning one of the marker currencies, reads its
/// first row as headers (th cells, falling back to td), maps the localized
/// header text onto the canonical columns, then reads one record per data
/// row. Rows without data cells or without a sell value are skipped.
pub fn extract_rates(html: &str) -> Result<Vec<RateRecord>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let th_sel = selector("th")?;
    let td_sel = selector("td")?;

    let table = document
        .select(&table_sel)
        .find(|table| {
            let text = table.text().collect::<Vec<_>>().join(" ");
            TABLE_MARKERS.iter().any(|marker| text.contains(marker))
        })
        .ok_or_else(|| RateError::Parse("no exchange rate table found on page".to_string()))?;

    let mut rows = table.select(&row_sel);
    let header_row = rows
        .next()
        .ok_or_else(|| RateError::Parse("rates table has no rows".to_string()))?;

    let mut headers: Vec<String> = header_row.select(&th_sel).map(cell_text).collect();
    if headers.is_empty() {
        headers = header_row.select(&td_sel).map(cell_text).collect();
    }
    let mapping = map_columns(&headers)?;
    debug!("Rates table column mapping: {:?}", mapping);

    let mut records = Vec::new();
    for row in rows {
        let cells: Vec<String> = row.select(&td_sel).map(cell_text).collect();
        if cells.is_empty() {
            continue;
        }
        if let Some(record) = mapping.record_from(&cells) {
            records.push(record);
        }
    }

    debug!("Extracted {} rates from scraped table", records.len());
    Ok(records)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| RateError::Parse(format!("bad selector {css:?}: {e}")).into())
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Positions of the canonical columns within the scraped table.
#[derive(Debug)]
struct ColumnMapping {
    code: usize,
    name: usize,
    buy_cash: Option<usize>,
    buy_transfer: Option<usize>,
    sell: usize,
}

/// Map localized header text onto the canonical columns. The page publishes
/// Vietnamese headers; accept English variants as well.
fn map_columns(headers: &[String]) -> Result<ColumnMapping> {
    let mut code_idx = None;
    let mut name_idx = None;
    let mut buy_cash_idx = None;
    let mut buy_transfer_idx = None;
    let mut sell_idx = None;

    for (idx, header) in headers.iter().enumerate() {
        let text = header.to_lowercase();

        if text.contains("mã") || text.contains("code") {
            code_idx = Some(idx);
        }

        if text.contains("tên") || text.contains("name") || text.contains("currency") {
            name_idx = Some(idx);
        }

        // Buy columns: cash vs transfer
        if text.contains("tiền mặt") || text.contains("cash") {
            buy_cash_idx = Some(idx);
        }
        if text.contains("chuyển khoản") || text.contains("transfer") {
            buy_transfer_idx = Some(idx);
        }

        if text.contains("bán") || text.contains("sell") {
            sell_idx = Some(idx);
        }
    }

    Ok(ColumnMapping {
        code: code_idx
            .ok_or_else(|| RateError::Parse("currency code column not found".to_string()))?,
        name: name_idx
            .ok_or_else(|| RateError::Parse("currency name column not found".to_string()))?,
        buy_cash: buy_cash_idx,
        buy_transfer: buy_transfer_idx,
        sell: sell_idx
            .ok_or_else(|| RateError::Parse("sell rate column not found".to_string()))?,
    })
}

impl ColumnMapping {
    fn record_from(&self, cells: &[String]) -> Option<RateRecord> {
        let code = clean_value(cells.get(self.code)?)?;
        let name = clean_value(cells.get(self.name)?).unwrap_or_default();
        // No sell rate means the bank does not sell this currency; drop the row.
        let sell = clean_value(cells.get(self.sell)?)?;
        let buy_cash = self
            .buy_cash
            .and_then(|idx| cells.get(idx))
            .and_then(|cell| clean_value(cell));
        let buy_transfer = self
            .buy_transfer
            .and_then(|idx| cells.get(idx))
            .and_then(|cell| clean_value(cell));

        Some(RateRecord {
            code,
            name,
            buy_cash,
            buy_transfer,
            sell,
        })
    }
}

//! XML API strategy for the bank's published rate feed.

use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, info};

use super::RateSource;
use crate::error::{RateError, Result};
use crate::rates::{clean_value, RateRecord};

pub const VCB_API_URL: &str =
    "https://portal.vietcombank.com.vn/Usercontrols/TVPortal.TyGia/pXML.aspx";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; TygiaBot/1.0)";

/// Fetches rates from the bank's XML endpoint.
pub struct ApiSource {
    url: String,
}

impl ApiSource {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl RateSource for ApiSource {
    async fn fetch_rates(&self) -> Result<Vec<RateRecord>> {
        info!("Fetching exchange rates from {}", self.url);

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| RateError::Network(format!("request to {} failed: {e}", self.url)))?;

        if !response.status().is_success() {
            return Err(
                RateError::Network(format!("rate API returned status {}", response.status()))
                    .into(),
            );
        }

        let body = response
            .text()
            .await
            .map_err(|e| RateError::Network(format!("failed to read rate API body: {e}")))?;

        let records = parse_rates_xml(&body)?;
        debug!("Fetched {} rates from API", records.len());
        Ok(records)
    }
}

/// Parse the pXML feed: one record per `Exrate` element, read from five
/// fixed attributes. Entries without a sell rate are dropped.
pub fn parse_rates_xml(xml: &str) -> Result<Vec<RateRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut records = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if let b"Exrate" = e.local_name().as_ref() {
                    if let Some(record) = record_from_element(&e)? {
                        records.push(record);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(RateError::Parse(format!("XML parse error: {e}")).into());
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(records)
}

fn record_from_element(element: &BytesStart<'_>) -> Result<Option<RateRecord>> {
    let mut code = None;
    let mut name = None;
    let mut buy_cash = None;
    let mut buy_transfer = None;
    let mut sell = None;

    for attr in element.attributes() {
        let attr = attr.map_err(|e| RateError::Parse(format!("bad Exrate attribute: {e}")))?;
        let value = attr
            .unescape_value()
            .map_err(|e| RateError::Parse(format!("bad Exrate attribute value: {e}")))?;
        let value = clean_value(&value);
        match attr.key.local_name().as_ref() {
            b"CurrencyCode" => code = value,
            b"CurrencyEN" => name = value,
            b"Buy" => buy_cash = value,
            b"Transfer" => buy_transfer = value,
            b"Sell" => sell = value,
            _ => {}
        }
    }

    // Some currencies are published without a sell rate; skip those rows.
    let (Some(code), Some(sell)) = (code, sell) else {
        return Ok(None);
    };

    Ok(Some(RateRecord {
        code,
        name: name.unwrap_or_default(),
        buy_cash,
        buy_transfer,
        sell,
    }))
}

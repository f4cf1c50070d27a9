// src/sheet/fetch.rs

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};
use url::Url;

use super::types::{Locator, SheetSpec};
use crate::config::Config;
use crate::error::SheetError;

const EXPORT_BASE: &str = "https://docs.google.com/spreadsheets/d/";

/// Anything that can hand back the raw export text for a sheet.
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_raw(&self, sheet: &SheetSpec) -> Result<String, SheetError>;
}

/// Fetches sheets from the Google Sheets gviz export endpoint.
pub struct HttpSheetSource {
    client: Client,
    export_base: Url,
    spreadsheet_id: String,
    range: String,
    max_retries: u32,
    backoff_ms: u64,
}

impl HttpSheetSource {
    pub fn new(client: Client, config: &Config) -> Self {
        Self {
            client,
            export_base: Url::parse(EXPORT_BASE).expect("export base URL should parse"),
            spreadsheet_id: config.spreadsheet_id.clone(),
            range: config.range.clone(),
            max_retries: config.max_retries,
            backoff_ms: config.retry_backoff_ms,
        }
    }

    /// Build a client honoring the configured request timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("building HTTP client")?;
        Ok(Self::new(client, config))
    }

    /// Point at a different export host, e.g. a mirror or a local server.
    pub fn with_export_base(mut self, base: Url) -> Self {
        self.export_base = base;
        self
    }

    /// Export URL for `locator`, with a millisecond timestamp to defeat caching.
    pub fn export_url(&self, locator: &Locator, timestamp_ms: i64) -> Result<Url> {
        export_url(
            &self.export_base,
            &self.spreadsheet_id,
            &self.range,
            locator,
            timestamp_ms,
        )
    }

    async fn get_text_core(&self, url: &Url) -> Result<String> {
        debug!("Fetching text from {}", url);
        self.client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .text()
            .await
            .with_context(|| format!("Reading text from {}", url))
    }

    async fn get_text_with_retry(&self, sheet: &SheetSpec) -> Result<String> {
        let mut attempts = 0;
        loop {
            // a fresh timestamp per attempt, so a retry is not served from cache
            let url = self.export_url(&sheet.locator, Utc::now().timestamp_millis())?;
            match self.get_text_core(&url).await {
                Ok(t) => return Ok(t),
                Err(e) if attempts < self.max_retries => {
                    attempts += 1;
                    let backoff = self.backoff_ms * 2u64.pow(attempts - 1);
                    warn!(sheet = %sheet.name, attempt = attempts, delay_ms = backoff, error = %e, "Retrying");
                    sleep(Duration::from_millis(backoff)).await;
                }
                Err(e) => {
                    if self.max_retries > 0 {
                        error!(sheet = %sheet.name, error = %e, "Exhausted retries");
                    }
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl SheetSource for HttpSheetSource {
    async fn fetch_raw(&self, sheet: &SheetSpec) -> Result<String, SheetError> {
        self.get_text_with_retry(sheet)
            .await
            .map_err(|e| SheetError::Transport {
                sheet: sheet.name.clone(),
                reason: format!("{:#}", e),
            })
    }
}

/// `{base}{id}/gviz/tq?tqx=out:json&gid=..&range=..&headers=1&timestamp=..`
pub fn export_url(
    base: &Url,
    spreadsheet_id: &str,
    range: &str,
    locator: &Locator,
    timestamp_ms: i64,
) -> Result<Url> {
    let mut url = base
        .join(&format!("{}/gviz/tq", spreadsheet_id))
        .with_context(|| format!("building export URL for spreadsheet {}", spreadsheet_id))?;
    let (key, value) = locator.query_pair();
    url.query_pairs_mut()
        .append_pair("tqx", "out:json")
        .append_pair(key, value)
        .append_pair("range", range)
        .append_pair("headers", "1")
        .append_pair("timestamp", &timestamp_ms.to_string());
    Ok(url)
}

use crate::config::Settings;
use anyhow::{Context, Result};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const SYMBOL_COLUMN: &str = "Symbol";

/// Supplies the ordered symbol universe for one run.
#[async_trait::async_trait]
pub trait SymbolSource: Send + Sync {
    async fn fetch_symbols(&self) -> Result<Vec<String>>;
}

/// Reads the universe from a CSV feed with a `Symbol` column, e.g. an
/// exchange's published index constituent list.
#[derive(Debug, Clone)]
pub struct CsvSymbolSource {
    http: reqwest::Client,
    url: String,
}

impl CsvSymbolSource {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let url = settings.require_symbol_source_url()?.to_string();

        let timeout_secs = std::env::var("SYMBOL_SOURCE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build symbol source http client")?;

        Ok(Self { http, url })
    }
}

#[async_trait::async_trait]
impl SymbolSource for CsvSymbolSource {
    async fn fetch_symbols(&self) -> Result<Vec<String>> {
        tracing::debug!(url = %self.url, "fetching symbol universe");
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("symbol source request failed")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("failed to read symbol source response")?;
        anyhow::ensure!(status.is_success(), "symbol source HTTP {status}");

        parse_symbol_csv(&body)
    }
}

/// Pulls the `Symbol` column out of a headered CSV, preserving row order.
/// Blank cells are skipped; a missing column is an error.
fn parse_symbol_csv(body: &str) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .context("symbol source CSV has no header row")?;
    let symbol_idx = headers
        .iter()
        .position(|h| h.trim() == SYMBOL_COLUMN)
        .with_context(|| format!("symbol source CSV is missing a '{SYMBOL_COLUMN}' column"))?;

    let mut out = Vec::new();
    for record in reader.records() {
        let record = record.context("malformed symbol source CSV record")?;
        if let Some(raw) = record.get(symbol_idx) {
            let symbol = raw.trim();
            if !symbol.is_empty() {
                out.push(symbol.to_string());
            }
        }
    }

    Ok(out)
}

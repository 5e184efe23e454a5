use crate::config::Settings;
use crate::domain::series::PriceSeries;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PATH: &str = "/v1/daily_closes";

// The screener looks back roughly six months of daily candles; that covers
// the 63-session momentum leg with room to spare.
const HISTORY_RANGE: &str = "6mo";
const HISTORY_INTERVAL: &str = "1d";

/// Fetches one symbol's daily close history as of a given date.
///
/// Any fault here is a per-symbol fault: callers log it and move to the
/// next symbol, never abort the run.
#[async_trait::async_trait]
pub trait HistoryProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_history(&self, symbol: &str, as_of_date: NaiveDate) -> Result<PriceSeries>;
}

#[derive(Debug, Clone)]
pub struct HttpJsonHistoryProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    path: String,
    symbol_suffix: String,
}

impl HttpJsonHistoryProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_history_provider_base_url()?.to_string();
        let api_key = settings.history_provider_api_key.clone();

        let timeout_secs = std::env::var("HISTORY_PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let path = std::env::var("HISTORY_PROVIDER_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());

        // Some feeds key instruments by an exchange-suffixed symbol
        // (e.g. "RELIANCE.NS") rather than the bare index symbol.
        let symbol_suffix = std::env::var("HISTORY_SYMBOL_SUFFIX").unwrap_or_default();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build history provider http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
            path,
            symbol_suffix,
        })
    }

    fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }

    fn provider_symbol(&self, symbol: &str) -> String {
        format!("{symbol}{}", self.symbol_suffix)
    }
}

#[async_trait::async_trait]
impl HistoryProvider for HttpJsonHistoryProvider {
    fn provider_name(&self) -> &'static str {
        "external_http_json"
    }

    async fn fetch_history(&self, symbol: &str, as_of_date: NaiveDate) -> Result<PriceSeries> {
        let url = self.url();
        let headers = self.headers()?;
        tracing::debug!(%symbol, %as_of_date, "fetching daily close history");

        let res = self
            .http
            .get(url)
            .headers(headers)
            .query(&[
                ("symbol", self.provider_symbol(symbol).as_str()),
                ("as_of_date", as_of_date.to_string().as_str()),
                ("range", HISTORY_RANGE),
                ("interval", HISTORY_INTERVAL),
            ])
            .send()
            .await
            .with_context(|| format!("history request failed for {symbol}"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .with_context(|| format!("failed to read history response for {symbol}"))?;
        anyhow::ensure!(status.is_success(), "history provider HTTP {status} for {symbol}");

        let mut series = serde_json::from_str::<PriceSeries>(&text)
            .with_context(|| format!("failed to parse history response for {symbol}"))?;

        // Report results under the bare universe symbol, whatever alias the
        // provider keyed the series by.
        series.symbol = symbol.to_string();
        validate_series(&series)?;
        Ok(series)
    }
}

fn validate_series(series: &PriceSeries) -> Result<()> {
    for pair in series.closes.windows(2) {
        anyhow::ensure!(
            pair[0].date < pair[1].date,
            "history for {} is not chronologically ascending ({} then {})",
            series.symbol,
            pair[0].date,
            pair[1].date
        );
    }
    Ok(())
}

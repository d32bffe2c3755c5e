use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::MarketConfig;
use crate::error::AppError;
use crate::session::QuoteSource;

use super::types::{parse_quote, ApiErrorResponse, Quote};

/// Polls a single public ticker endpoint.
pub struct TickerClient {
    http: reqwest::Client,
    url: String,
    price_key: String,
    volume_key: String,
}

impl TickerClient {
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            url: config.ticker_url.clone(),
            price_key: config.price_key.clone(),
            volume_key: config.volume_key.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch_quote(&self) -> Result<Quote> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("ticker request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(AppError::Quote(format!(
                    "ticker API error (code {}): {}",
                    err.code, err.msg
                ))
                .into());
            }
            return Err(anyhow::anyhow!("ticker returned {}: {}", status, body));
        }

        let body: serde_json::Value = resp.json().await.context("ticker body is not JSON")?;
        let quote = parse_quote(&body, &self.price_key, &self.volume_key)?;
        Ok(quote)
    }
}

impl QuoteSource for TickerClient {
    async fn fetch(&self) -> Result<Quote> {
        self.fetch_quote().await
    }
}

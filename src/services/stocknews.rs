use reqwest::Client;
use serde_json::Value;

use crate::error::ProviderError;
use crate::services::stockdata::UpstreamJson;

pub const MARKET_TICKERS: &str = "SPY,QQQ,DIA";
pub const DEFAULT_ITEMS: u32 = 20;
pub const MAX_ITEMS: u32 = 50;

/// `items` query value: default when absent, unparsable or zero, capped at `MAX_ITEMS`.
pub fn clamp_items(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_ITEMS)
        .min(MAX_ITEMS)
}

#[derive(Clone)]
pub struct StockNewsClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl StockNewsClient {
    pub fn new(http: Client, api_key: String, base_url: String) -> Self {
        Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub async fn market_news(&self, items: u32) -> Result<UpstreamJson, ProviderError> {
        self.news(MARKET_TICKERS, items).await
    }

    pub async fn news(&self, tickers: &str, items: u32) -> Result<UpstreamJson, ProviderError> {
        if !self.has_key() {
            return Err(ProviderError::NotConfigured("Stock News"));
        }

        let items = items.to_string();
        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("tickers", tickers),
                ("items", items.as_str()),
                ("token", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = res.status().as_u16();
        let body = res.json::<Value>().await?;

        Ok(UpstreamJson { status, body })
    }
}

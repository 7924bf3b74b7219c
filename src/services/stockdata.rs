use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::ProviderError;
use crate::services::price_lookup::PriceLookup;

/// Raw upstream answer, forwarded as-is by the proxy routes.
#[derive(Debug, Clone)]
pub struct UpstreamJson {
    pub status: u16,
    pub body: Value,
}

impl UpstreamJson {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone)]
pub struct StockDataClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl StockDataClient {
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

    pub async fn quote(&self, symbol: &str) -> Result<UpstreamJson, ProviderError> {
        if !self.has_key() {
            return Err(ProviderError::NotConfigured("StockData"));
        }

        let url = format!("{}/quote", self.base_url);
        let res = self
            .http
            .get(url)
            .query(&[("symbol", symbol), ("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status().as_u16();
        let body = res.json::<Value>().await?;

        Ok(UpstreamJson { status, body })
    }
}

#[async_trait]
impl PriceLookup for StockDataClient {
    fn is_configured(&self) -> bool {
        self.has_key()
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, ProviderError> {
        let res = self.quote(symbol).await?;

        if !res.is_success() {
            return Err(ProviderError::Upstream {
                status: res.status,
                body: res.body.to_string(),
            });
        }

        extract_price(&res.body).ok_or_else(|| ProviderError::MissingPrice(symbol.to_string()))
    }
}

const PRICE_KEYS: [&str; 3] = ["price", "close", "c"];

fn as_price(v: &Value) -> Option<f64> {
    let p = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    (p.is_finite() && p > 0.0).then_some(p)
}

fn price_in(obj: &Value) -> Option<f64> {
    PRICE_KEYS
        .iter()
        .find_map(|k| obj.get(*k).filter(|v| !v.is_null()))
        .and_then(as_price)
}

/// Pulls the current price out of a quote body: `price`, `close` or `c` at the
/// top level, otherwise the same keys on the first entry of `data`.
pub fn extract_price(body: &Value) -> Option<f64> {
    price_in(body).or_else(|| {
        body.get("data")
            .and_then(|d| d.as_array())
            .and_then(|d| d.first())
            .and_then(price_in)
    })
}

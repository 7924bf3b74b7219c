use async_trait::async_trait;

use crate::error::ProviderError;

/// Source of current prices for the alert monitor.
///
/// `StockDataClient` implements this against the live quote API; tests plug
/// in their own doubles.
#[async_trait]
pub trait PriceLookup: Send + Sync {
    /// False when the source has no credentials at all. The monitor skips
    /// whole ticks in that state instead of failing every lookup.
    fn is_configured(&self) -> bool {
        true
    }

    /// Latest price for `symbol`. Must be finite; anything the source can't
    /// vouch for comes back as an error, never a stale value.
    async fn fetch_price(&self, symbol: &str) -> Result<f64, ProviderError>;
}

use thiserror::Error;

/// Failures surfaced synchronously by the alert store.
#[derive(Debug, Error, PartialEq)]
pub enum AlertError {
    #[error("{0}")]
    Validation(String),

    #[error("Alert not found")]
    NotFound(u64),
}

/// Failures talking to an upstream market data provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} API key not configured")]
    NotConfigured(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("no usable price in quote for {0}")]
    MissingPrice(String),
}

impl ProviderError {
    pub fn is_not_configured(&self) -> bool {
        matches!(self, ProviderError::NotConfigured(_))
    }
}

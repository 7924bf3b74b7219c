use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;

use crate::{
    controllers::{error_json, forward_upstream, provider_failure},
    AppState,
};

#[derive(Deserialize)]
pub struct QuoteQuery {
    pub symbol: Option<String>,
}

// GET /api/quote?symbol=AAPL
pub async fn get_quote(State(state): State<AppState>, Query(q): Query<QuoteQuery>) -> Response {
    let symbol = q.symbol.unwrap_or_default().trim().to_uppercase();
    if symbol.is_empty() {
        return error_json(StatusCode::BAD_REQUEST, "Missing symbol");
    }

    match state.stockdata.quote(&symbol).await {
        Ok(up) => forward_upstream(up),
        Err(e) => provider_failure(e, "Failed to fetch quote"),
    }
}

use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;

use crate::{
    controllers::{forward_upstream, provider_failure},
    services::stocknews::clamp_items,
    AppState,
};

#[derive(Deserialize)]
pub struct NewsQuery {
    pub items: Option<String>,
    pub tickers: Option<String>,
    pub symbol: Option<String>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_uppercase()).filter(|v| !v.is_empty())
}

// GET /api/market-news?items=20
pub async fn get_market_news(State(state): State<AppState>, Query(q): Query<NewsQuery>) -> Response {
    let items = clamp_items(q.items.as_deref());

    match state.stocknews.market_news(items).await {
        Ok(up) => forward_upstream(up),
        Err(e) => provider_failure(e, "Failed to fetch market news"),
    }
}

// GET /api/stock-news?tickers=AAPL&items=20
pub async fn get_stock_news(State(state): State<AppState>, Query(q): Query<NewsQuery>) -> Response {
    let items = clamp_items(q.items.as_deref());
    let tickers = non_blank(q.tickers)
        .or_else(|| non_blank(q.symbol))
        .unwrap_or_else(|| "AAPL".to_string());

    match state.stocknews.news(&tickers, items).await {
        Ok(up) => forward_upstream(up),
        Err(e) => provider_failure(e, "Failed to fetch stock news"),
    }
}

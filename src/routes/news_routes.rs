use axum::{Router, routing::get};
use crate::{AppState, controllers::news_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/market-news", get(news_controller::get_market_news))
        .route("/api/stock-news", get(news_controller::get_stock_news))
}

use std::net::SocketAddr;

use market_monitor::{build_state, config, routes};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    if settings.stockdata_api_key.trim().is_empty() {
        tracing::warn!("STOCKDATA_API_KEY not set: quotes return 503 and alert checks are skipped");
    }
    if settings.stocknews_api_key.trim().is_empty() {
        tracing::warn!("STOCKNEWS_API_KEY not set: news endpoints return 503");
    }

    let state = build_state(settings.clone());
    let monitor = state
        .monitor
        .clone()
        .spawn(settings.alert_check_interval());

    let app = routes::app(state);

    let ip = match settings.host.parse::<std::net::IpAddr>() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::error!("invalid HOST {:?}: {}", settings.host, e);
            return;
        }
    };
    let addr = SocketAddr::from((ip, settings.port));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("failed to bind {}: {}", addr, e);
            return;
        }
    };

    tracing::info!("listening on http://{}", addr);
    tracing::info!("  GET  /api/quote?symbol=AAPL");
    tracing::info!("  GET  /api/market-news?items=20");
    tracing::info!("  GET  /api/stock-news?tickers=AAPL&items=20");
    tracing::info!("  GET  /api/alerts  |  POST/DELETE /api/alerts  |  GET /api/alerts/triggered");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("server error: {}", e);
    }

    monitor.stop().await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

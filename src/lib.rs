//! Library entrypoint for the market monitor backend.
//!
//! Integration tests under `tests/` build their own `AppState` from the pieces
//! exported here, usually with a fake price source behind the alert monitor.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub mod controllers;
pub mod routes;

use services::{
    alert_monitor::AlertMonitor, alerts_service::AlertStore, stockdata::StockDataClient,
    stocknews::StockNewsClient,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: config::Settings,
    pub store: AlertStore,
    pub monitor: Arc<AlertMonitor>,
    pub stockdata: StockDataClient,
    pub stocknews: StockNewsClient,
    pub events_tx: tokio::sync::broadcast::Sender<String>,
}

/// Wires the store, provider clients and monitor together from settings.
pub fn build_state(settings: config::Settings) -> AppState {
    let http = match reqwest::Client::builder()
        .timeout(settings.http_timeout())
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("http client build failed, using defaults without timeout: {}", e);
            reqwest::Client::default()
        }
    };

    let stockdata = StockDataClient::new(
        http.clone(),
        settings.stockdata_api_key.clone(),
        settings.stockdata_base_url.clone(),
    );
    let stocknews = StockNewsClient::new(
        http,
        settings.stocknews_api_key.clone(),
        settings.stocknews_base_url.clone(),
    );

    let (events_tx, _events_rx) = tokio::sync::broadcast::channel::<String>(64);
    let store = AlertStore::new();
    let monitor = Arc::new(AlertMonitor::new(
        store.clone(),
        Arc::new(stockdata.clone()),
        events_tx.clone(),
        settings.alert_one_shot,
    ));

    AppState {
        settings,
        store,
        monitor,
        stockdata,
        stocknews,
        events_tx,
    }
}

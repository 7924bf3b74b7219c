use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use market_monitor::error::ProviderError;
use market_monitor::services::alert_monitor::{AlertMonitor, TickOutcome};
use market_monitor::services::alerts_service::AlertStore;
use market_monitor::services::price_lookup::PriceLookup;
use tokio::sync::{broadcast, Notify};

/// Price source backed by a map; symbols not in the map fail their lookup.
struct FakePrices {
    prices: Mutex<HashMap<String, f64>>,
    calls: AtomicUsize,
    configured: bool,
}

impl FakePrices {
    fn new(prices: &[(&str, f64)]) -> Arc<Self> {
        Arc::new(Self {
            prices: Mutex::new(prices.iter().map(|(s, p)| (s.to_string(), *p)).collect()),
            calls: AtomicUsize::new(0),
            configured: true,
        })
    }

    fn unconfigured() -> Arc<Self> {
        Arc::new(Self {
            prices: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            configured: false,
        })
    }

    fn set(&self, symbol: &str, price: f64) {
        self.prices.lock().unwrap().insert(symbol.to_string(), price);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceLookup for FakePrices {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn fetch_price(&self, symbol: &str) -> Result<f64, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prices
            .lock()
            .unwrap()
            .get(symbol)
            .copied()
            .ok_or_else(|| ProviderError::MissingPrice(symbol.to_string()))
    }
}

fn monitor_with(store: &AlertStore, prices: Arc<FakePrices>, one_shot: bool) -> AlertMonitor {
    let (events_tx, _rx) = broadcast::channel::<String>(16);
    AlertMonitor::new(store.clone(), prices, events_tx, one_shot)
}

#[tokio::test]
async fn above_fires_when_price_exceeds_target() {
    let store = AlertStore::new();
    store.add("AAPL", "above", "100").await.unwrap();
    let monitor = monitor_with(&store, FakePrices::new(&[("AAPL", 105.0)]), false);

    let outcome = monitor.run_tick().await;

    assert_eq!(outcome, TickOutcome::Evaluated { checked: 1, fired: 1, failed: 0 });
    let log = store.recent_triggers().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].current_price, 105.0);
    assert_eq!(log[0].symbol, "AAPL");
}

#[tokio::test]
async fn above_stays_quiet_below_target() {
    let store = AlertStore::new();
    store.add("AAPL", "above", "100").await.unwrap();
    let monitor = monitor_with(&store, FakePrices::new(&[("AAPL", 95.0)]), false);

    let outcome = monitor.run_tick().await;

    assert_eq!(outcome, TickOutcome::Evaluated { checked: 1, fired: 0, failed: 0 });
    assert!(store.recent_triggers().await.is_empty());
}

#[tokio::test]
async fn below_uses_strict_comparison() {
    let store = AlertStore::new();
    store.add("TSLA", "below", "250").await.unwrap();
    let prices = FakePrices::new(&[("TSLA", 250.0)]);
    let monitor = monitor_with(&store, prices.clone(), false);

    monitor.run_tick().await;
    assert!(store.recent_triggers().await.is_empty());

    prices.set("TSLA", 248.5);
    monitor.run_tick().await;

    let log = store.recent_triggers().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].current_price, 248.5);
}

#[tokio::test]
async fn failed_lookup_does_not_affect_other_alerts() {
    let store = AlertStore::new();
    store.add("AAPL", "above", "100").await.unwrap();
    store.add("MSFT", "above", "400").await.unwrap();
    let monitor = monitor_with(&store, FakePrices::new(&[("MSFT", 410.0)]), false);

    let outcome = monitor.run_tick().await;

    assert_eq!(outcome, TickOutcome::Evaluated { checked: 2, fired: 1, failed: 1 });
    let log = store.recent_triggers().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].symbol, "MSFT");
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn empty_store_skips_without_lookups() {
    let store = AlertStore::new();
    let prices = FakePrices::new(&[("AAPL", 105.0)]);
    let monitor = monitor_with(&store, prices.clone(), false);

    assert_eq!(monitor.run_tick().await, TickOutcome::NoAlerts);
    assert_eq!(prices.calls(), 0);
}

#[tokio::test]
async fn unconfigured_source_skips_without_lookups() {
    let store = AlertStore::new();
    store.add("AAPL", "above", "100").await.unwrap();
    let prices = FakePrices::unconfigured();
    let monitor = monitor_with(&store, prices.clone(), false);

    assert_eq!(monitor.run_tick().await, TickOutcome::NotConfigured);
    assert_eq!(prices.calls(), 0);
    assert!(store.recent_triggers().await.is_empty());
}

#[tokio::test]
async fn alert_refires_every_tick_by_default() {
    let store = AlertStore::new();
    store.add("AAPL", "above", "100").await.unwrap();
    let monitor = monitor_with(&store, FakePrices::new(&[("AAPL", 105.0)]), false);

    monitor.run_tick().await;
    monitor.run_tick().await;

    assert_eq!(store.recent_triggers().await.len(), 2);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn one_shot_removes_alert_after_firing() {
    let store = AlertStore::new();
    let alert = store.add("AAPL", "above", "100").await.unwrap();
    store.add("MSFT", "above", "400").await.unwrap();
    let monitor = monitor_with(
        &store,
        FakePrices::new(&[("AAPL", 105.0), ("MSFT", 300.0)]),
        true,
    );

    monitor.run_tick().await;

    let left = store.list().await;
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].symbol, "MSFT");

    monitor.run_tick().await;
    let log = store.recent_triggers().await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].alert_id, alert.id);
}

#[tokio::test]
async fn one_lookup_per_symbol_per_tick() {
    let store = AlertStore::new();
    store.add("AAPL", "above", "100").await.unwrap();
    store.add("AAPL", "below", "110").await.unwrap();
    store.add("AAPL", "above", "200").await.unwrap();
    let prices = FakePrices::new(&[("AAPL", 105.0)]);
    let monitor = monitor_with(&store, prices.clone(), false);

    let outcome = monitor.run_tick().await;

    assert_eq!(prices.calls(), 1);
    assert_eq!(outcome, TickOutcome::Evaluated { checked: 3, fired: 2, failed: 0 });
}

#[tokio::test]
async fn triggers_from_one_tick_read_newest_first() {
    let store = AlertStore::new();
    store.add("AAPL", "above", "100").await.unwrap();
    store.add("MSFT", "below", "400").await.unwrap();
    let monitor = monitor_with(
        &store,
        FakePrices::new(&[("AAPL", 105.0), ("MSFT", 390.0)]),
        false,
    );

    monitor.run_tick().await;

    let symbols: Vec<String> = store
        .recent_triggers()
        .await
        .into_iter()
        .map(|t| t.symbol)
        .collect();
    assert_eq!(symbols, vec!["MSFT".to_string(), "AAPL".to_string()]);
}

#[tokio::test]
async fn firing_tick_notifies_subscribers() {
    let store = AlertStore::new();
    store.add("AAPL", "above", "100").await.unwrap();
    let (events_tx, mut rx) = broadcast::channel::<String>(16);
    let monitor = AlertMonitor::new(
        store.clone(),
        FakePrices::new(&[("AAPL", 105.0)]),
        events_tx,
        false,
    );

    monitor.run_tick().await;

    assert_eq!(rx.try_recv().unwrap(), "alertTriggered");
}

/// Blocks every lookup until released, so a tick can be held open.
struct GatedPrices {
    entered: AtomicUsize,
    release: Notify,
}

#[async_trait]
impl PriceLookup for GatedPrices {
    async fn fetch_price(&self, _symbol: &str) -> Result<f64, ProviderError> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        self.release.notified().await;
        Ok(105.0)
    }
}

#[tokio::test]
async fn overlapping_tick_reports_busy() {
    let store = AlertStore::new();
    store.add("AAPL", "above", "100").await.unwrap();
    let gate = Arc::new(GatedPrices {
        entered: AtomicUsize::new(0),
        release: Notify::new(),
    });
    let (events_tx, _rx) = broadcast::channel::<String>(16);
    let monitor = Arc::new(AlertMonitor::new(store.clone(), gate.clone(), events_tx, false));

    let first = {
        let monitor = monitor.clone();
        tokio::spawn(async move { monitor.run_tick().await })
    };

    while gate.entered.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    assert_eq!(monitor.run_tick().await, TickOutcome::Busy);

    gate.release.notify_one();
    let outcome = first.await.unwrap();
    assert_eq!(outcome, TickOutcome::Evaluated { checked: 1, fired: 1, failed: 0 });
    assert_eq!(store.recent_triggers().await.len(), 1);
}

#[tokio::test]
async fn scheduled_loop_survives_failures_and_stops_cleanly() {
    let store = AlertStore::new();
    store.add("AAPL", "above", "100").await.unwrap();
    // every lookup fails
    let prices = FakePrices::new(&[]);
    let monitor = Arc::new(monitor_with(&store, prices.clone(), false));

    let handle = monitor.spawn(Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!handle.is_finished());
    assert!(prices.calls() >= 2, "expected repeated ticks, got {}", prices.calls());

    handle.stop().await;
    let after_stop = prices.calls();
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(prices.calls(), after_stop);
}

#[tokio::test]
async fn scheduled_loop_picks_up_alerts_added_later() {
    let store = AlertStore::new();
    let prices = FakePrices::new(&[("AAPL", 105.0)]);
    let monitor = Arc::new(monitor_with(&store, prices.clone(), false));

    let handle = monitor.spawn(Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(prices.calls(), 0);

    store.add("AAPL", "above", "100").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.stop().await;

    assert!(!store.recent_triggers().await.is_empty());
}

#[tokio::test]
async fn alert_added_mid_tick_waits_for_next_tick() {
    let store = AlertStore::new();
    store.add("AAPL", "above", "100").await.unwrap();
    let gate = Arc::new(GatedPrices {
        entered: AtomicUsize::new(0),
        release: Notify::new(),
    });
    let (events_tx, _rx) = broadcast::channel::<String>(16);
    let monitor = Arc::new(AlertMonitor::new(store.clone(), gate.clone(), events_tx, false));

    let tick = {
        let monitor = monitor.clone();
        tokio::spawn(async move { monitor.run_tick().await })
    };

    while gate.entered.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    let late = store.add("AAPL", "above", "90").await.unwrap();
    gate.release.notify_one();

    let outcome = tick.await.unwrap();
    assert_eq!(outcome, TickOutcome::Evaluated { checked: 1, fired: 1, failed: 0 });

    let log = store.recent_triggers().await;
    assert_eq!(log.len(), 1);
    assert_ne!(log[0].alert_id, late.id);
    assert_eq!(store.len().await, 2);
}

/// Panics on the first lookup, fails every one after that.
struct PanicOnce {
    calls: AtomicUsize,
}

#[async_trait]
impl PriceLookup for PanicOnce {
    async fn fetch_price(&self, symbol: &str) -> Result<f64, ProviderError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("quote decoder blew up");
        }
        Err(ProviderError::MissingPrice(symbol.to_string()))
    }
}

#[tokio::test]
async fn panicking_tick_does_not_stop_the_loop() {
    let store = AlertStore::new();
    store.add("AAPL", "above", "100").await.unwrap();
    let prices = Arc::new(PanicOnce {
        calls: AtomicUsize::new(0),
    });
    let (events_tx, _rx) = broadcast::channel::<String>(16);
    let monitor = Arc::new(AlertMonitor::new(store.clone(), prices.clone(), events_tx, false));

    let handle = monitor.clone().spawn(Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(!handle.is_finished());
    assert!(
        prices.calls.load(Ordering::SeqCst) >= 2,
        "expected ticks after the panic, got {}",
        prices.calls.load(Ordering::SeqCst)
    );

    // the panicked tick released its single-flight guard
    assert_ne!(monitor.run_tick().await, TickOutcome::Busy);

    handle.stop().await;
}

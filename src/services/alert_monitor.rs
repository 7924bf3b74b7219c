use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::Serialize;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::error::ProviderError;
use crate::services::alerts_service::AlertStore;
use crate::services::price_lookup::PriceLookup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TickOutcome {
    NoAlerts,
    NotConfigured,
    /// Another tick was still running.
    Busy,
    Evaluated {
        checked: usize,
        fired: usize,
        failed: usize,
    },
}

/// Periodically checks every active alert against a fresh price and records a
/// trigger whenever the condition holds.
///
/// Alerts are not deduplicated across ticks: one that stays past its target
/// fires again on every tick unless `one_shot` is set, in which case it is
/// removed right after its first trigger.
pub struct AlertMonitor {
    store: AlertStore,
    prices: Arc<dyn PriceLookup>,
    events_tx: broadcast::Sender<String>,
    one_shot: bool,
    in_flight: Mutex<()>,
}

impl AlertMonitor {
    pub fn new(
        store: AlertStore,
        prices: Arc<dyn PriceLookup>,
        events_tx: broadcast::Sender<String>,
        one_shot: bool,
    ) -> Self {
        Self {
            store,
            prices,
            events_tx,
            one_shot,
            in_flight: Mutex::new(()),
        }
    }

    /// One evaluation pass over a snapshot of the active alerts.
    pub async fn run_tick(&self) -> TickOutcome {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("[alert-monitor] previous tick still running, skipping");
            return TickOutcome::Busy;
        };

        let snapshot = self.store.list().await;
        if snapshot.is_empty() {
            return TickOutcome::NoAlerts;
        }
        if !self.prices.is_configured() {
            tracing::debug!("[alert-monitor] price source not configured, skipping tick");
            return TickOutcome::NotConfigured;
        }

        // One lookup per symbol, in first-seen order
        let mut symbols: Vec<&str> = Vec::new();
        for a in &snapshot {
            if !symbols.contains(&a.symbol.as_str()) {
                symbols.push(a.symbol.as_str());
            }
        }

        let results = join_all(symbols.iter().map(|&sym| async move {
            (sym, self.prices.fetch_price(sym).await)
        }))
        .await;

        let mut failed = 0;
        let mut prices: HashMap<&str, f64> = HashMap::new();
        for (sym, res) in results {
            match res {
                Ok(p) if p.is_finite() => {
                    prices.insert(sym, p);
                }
                Ok(p) => {
                    failed += 1;
                    tracing::warn!(symbol = sym, price = p, "[alert-monitor] non-finite price ignored");
                }
                Err(e) => {
                    failed += 1;
                    log_lookup_failure(sym, &e);
                }
            }
        }

        let mut fired = 0;
        for alert in &snapshot {
            let Some(&price) = prices.get(alert.symbol.as_str()) else {
                continue;
            };

            if !alert.condition.is_hit(price, alert.target_price) {
                continue;
            }

            let event = self.store.record_trigger(alert, price).await;
            tracing::info!(
                alert_id = alert.id,
                trigger_id = event.id,
                "Alert: {}",
                event.message
            );
            fired += 1;

            if self.one_shot {
                // may already be gone if a client deleted it mid-tick
                let _ = self.store.remove(alert.id).await;
            }
        }

        if fired > 0 {
            let _ = self.events_tx.send("alertTriggered".to_string());
            if self.one_shot {
                let _ = self.events_tx.send("alertsUpdated".to_string());
            }
        }

        TickOutcome::Evaluated {
            checked: snapshot.len(),
            fired,
            failed,
        }
    }

    /// Runs `run_tick` now and then once per `period` until the returned
    /// handle is stopped or dropped. Ticks never overlap: a slow tick delays
    /// the next one and missed periods are skipped. Each tick runs in its own
    /// task so a panic ends that tick only, not the loop.
    pub fn spawn(self: Arc<Self>, period: Duration) -> MonitorHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::info!(
                period_secs = period.as_secs_f64(),
                one_shot = self.one_shot,
                "[alert-monitor] started"
            );

            loop {
                tokio::select! {
                    biased;

                    _ = stop_rx.changed() => break,
                    _ = interval.tick() => {
                        let monitor = self.clone();
                        match tokio::spawn(async move { monitor.run_tick().await }).await {
                            Ok(outcome) => {
                                tracing::debug!(?outcome, "[alert-monitor] tick finished");
                            }
                            Err(e) => {
                                tracing::error!("[alert-monitor] tick aborted: {}", e);
                            }
                        }
                    }
                }
            }

            tracing::info!("[alert-monitor] stopped");
        });

        MonitorHandle { stop_tx, join }
    }
}

fn log_lookup_failure(symbol: &str, err: &ProviderError) {
    tracing::warn!(symbol, error = %err, "[alert-monitor] alert check failed");
}

/// Owned handle to the spawned monitor loop.
pub struct MonitorHandle {
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl MonitorHandle {
    /// Prevents further ticks and waits for an in-flight one to finish.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.join.await {
            tracing::error!("[alert-monitor] task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::AlertError;
use crate::models::{Alert, Condition, TriggerEvent};

pub const TRIGGER_LOG_CAPACITY: usize = 100;

/// In-memory home of active alerts and the recent trigger log.
///
/// Cloning is cheap and every clone shares the same state, so the request
/// handlers and the monitor task can each hold one.
#[derive(Clone, Default)]
pub struct AlertStore {
    inner: Arc<RwLock<StoreInner>>,
}

#[derive(Default)]
struct StoreInner {
    alerts: Vec<Alert>,
    // newest at the front
    triggers: VecDeque<TriggerEvent>,
    last_id: u64,
}

impl StoreInner {
    /// Millisecond timestamps, bumped past the previous id when two land in
    /// the same millisecond. Alerts and triggers draw from the same sequence.
    fn next_id(&mut self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let id = now.max(self.last_id + 1);
        self.last_id = id;
        id
    }
}

/// Normalises and checks user input for a new alert.
pub fn validate_alert(
    symbol: &str,
    condition: &str,
    target_price: &str,
) -> Result<(String, Condition, f64), AlertError> {
    let sym = symbol.trim().to_uppercase();
    if sym.is_empty() {
        return Err(AlertError::Validation("Symbol is required".to_string()));
    }

    let cond: Condition = condition.parse().map_err(|_| {
        AlertError::Validation("Condition must be one of: above, below".to_string())
    })?;

    let target: f64 = target_price
        .trim()
        .parse()
        .map_err(|_| AlertError::Validation("Target price must be a number".to_string()))?;

    if !target.is_finite() || target <= 0.0 {
        return Err(AlertError::Validation(
            "Target price must be a positive number".to_string(),
        ));
    }

    Ok((sym, cond, target))
}

impl AlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active alerts in insertion order.
    pub async fn list(&self) -> Vec<Alert> {
        self.inner.read().await.alerts.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.alerts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.alerts.is_empty()
    }

    pub async fn add(
        &self,
        symbol: &str,
        condition: &str,
        target_price: &str,
    ) -> Result<Alert, AlertError> {
        let (symbol, condition, target_price) = validate_alert(symbol, condition, target_price)?;

        let mut inner = self.inner.write().await;
        let alert = Alert {
            id: inner.next_id(),
            symbol,
            condition,
            target_price,
            created_at: Utc::now().timestamp(),
        };
        inner.alerts.push(alert.clone());

        Ok(alert)
    }

    pub async fn remove(&self, id: u64) -> Result<Alert, AlertError> {
        let mut inner = self.inner.write().await;
        let idx = inner
            .alerts
            .iter()
            .position(|a| a.id == id)
            .ok_or(AlertError::NotFound(id))?;

        Ok(inner.alerts.remove(idx))
    }

    /// Trigger log, newest first.
    pub async fn recent_triggers(&self) -> Vec<TriggerEvent> {
        self.inner.read().await.triggers.iter().cloned().collect()
    }

    /// Appends a trigger for `alert` observed at `current_price`, evicting the
    /// oldest record once the log is over capacity.
    pub async fn record_trigger(&self, alert: &Alert, current_price: f64) -> TriggerEvent {
        let mut inner = self.inner.write().await;
        let event = TriggerEvent::from_alert(
            inner.next_id(),
            alert,
            current_price,
            Utc::now().timestamp(),
        );

        inner.triggers.push_front(event.clone());
        inner.triggers.truncate(TRIGGER_LOG_CAPACITY);

        event
    }
}

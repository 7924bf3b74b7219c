use serde::{Deserialize, Serialize};

use super::{Alert, Condition};

/// Snapshot of an alert at the moment its condition held.
///
/// Fields are copied out of the alert so the record survives the alert being
/// deleted afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEvent {
    pub id: u64,
    pub alert_id: u64,
    pub symbol: String,
    pub condition: Condition,
    pub target_price: f64,
    pub current_price: f64,
    pub message: String,
    pub triggered_at: i64,
}

impl TriggerEvent {
    pub fn from_alert(id: u64, alert: &Alert, current_price: f64, triggered_at: i64) -> Self {
        Self {
            id,
            alert_id: alert.id,
            symbol: alert.symbol.clone(),
            condition: alert.condition,
            target_price: alert.target_price,
            current_price,
            message: trigger_message(&alert.symbol, alert.condition, alert.target_price, current_price),
            triggered_at,
        }
    }
}

pub fn trigger_message(symbol: &str, condition: Condition, target_price: f64, current_price: f64) -> String {
    format!("{symbol} price target hit! Current: {current_price}, target {condition} {target_price}")
}

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{controllers::error_json, error::AlertError, AppState};

const INVALID_BODY: &str = "Invalid body. Need symbol, condition (above|below), targetPrice";

#[derive(Deserialize)]
pub struct CreateAlertBody {
    pub symbol: Option<String>,
    pub condition: Option<String>,
    // number or numeric string
    #[serde(rename = "targetPrice")]
    pub target_price: Option<Value>,
}

fn target_price_text(v: Option<&Value>) -> String {
    match v {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

// GET /api/alerts
pub async fn get_alerts(State(state): State<AppState>) -> Json<Value> {
    let alerts = state.store.list().await;
    Json(json!({ "alerts": alerts }))
}

// POST /api/alerts
pub async fn post_create_alert(
    State(state): State<AppState>,
    payload: Result<Json<CreateAlertBody>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = payload else {
        return error_json(StatusCode::BAD_REQUEST, INVALID_BODY);
    };

    let symbol = body.symbol.unwrap_or_default();
    let condition = body.condition.unwrap_or_default();
    let target = target_price_text(body.target_price.as_ref());

    match state.store.add(&symbol, &condition, &target).await {
        Ok(alert) => {
            let _ = state.events_tx.send("alertsUpdated".to_string());
            (StatusCode::CREATED, Json(alert)).into_response()
        }
        Err(AlertError::Validation(msg)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": INVALID_BODY, "message": msg })),
        )
            .into_response(),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

// DELETE /api/alerts/:id
pub async fn delete_alert(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    // unparsable ids can't match anything
    let Ok(id) = id.trim().parse::<u64>() else {
        return error_json(StatusCode::NOT_FOUND, AlertError::NotFound(0).to_string());
    };

    match state.store.remove(id).await {
        Ok(_) => {
            let _ = state.events_tx.send("alertsUpdated".to_string());
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_json(StatusCode::NOT_FOUND, e.to_string()),
    }
}

// GET /api/alerts/triggered
pub async fn get_triggered(State(state): State<AppState>) -> Json<Value> {
    let triggered = state.store.recent_triggers().await;
    Json(json!({ "triggered": triggered }))
}

// POST /api/alerts/check
pub async fn post_check_now(State(state): State<AppState>) -> Response {
    let outcome = state.monitor.run_tick().await;
    (StatusCode::OK, Json(outcome)).into_response()
}

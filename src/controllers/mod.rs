use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{error::ProviderError, services::stockdata::UpstreamJson};

pub mod alerts_controller;
pub mod home_controller;
pub mod news_controller;
pub mod realtime_controller;
pub mod stocks_controller;

pub(crate) fn error_json(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(json!({ "error": msg.into() }))).into_response()
}

/// Passes an upstream answer through with its own status code.
pub(crate) fn forward_upstream(up: UpstreamJson) -> Response {
    let status = StatusCode::from_u16(up.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(up.body)).into_response()
}

pub(crate) fn provider_failure(err: ProviderError, what: &str) -> Response {
    if err.is_not_configured() {
        return error_json(StatusCode::SERVICE_UNAVAILABLE, err.to_string());
    }

    tracing::error!("{}: {}", what, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": what, "message": err.to_string() })),
    )
        .into_response()
}

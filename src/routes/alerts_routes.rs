use axum::{Router, routing::{delete, get, post}};
use crate::{AppState, controllers::alerts_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/alerts",
            get(alerts_controller::get_alerts).post(alerts_controller::post_create_alert),
        )
        .route("/api/alerts/triggered", get(alerts_controller::get_triggered))
        .route("/api/alerts/check", post(alerts_controller::post_check_now))
        .route("/api/alerts/:id", delete(alerts_controller::delete_alert))
}

use axum::Router;
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::AppState;

pub mod alerts_routes;
pub mod home_routes;
pub mod news_routes;
pub mod realtime_routes;
pub mod stocks_routes;

pub fn app(state: AppState) -> Router {
    let router = Router::<AppState>::new();

    let router = home_routes::add_routes(router);
    let router = stocks_routes::add_routes(router);
    let router = news_routes::add_routes(router);
    let router = alerts_routes::add_routes(router);
    let router = realtime_routes::add_routes(router);

    let static_files = ServeDir::new(&state.settings.static_dir);

    router
        .fallback_service(static_files)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

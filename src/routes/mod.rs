pub mod bookings;
pub mod reviews;
pub mod stats;
pub mod users;


use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(users::routes(state.clone()))
        .merge(bookings::routes(state.clone()))
        .merge(reviews::routes(state))
        .merge(stats::routes())
}

/// Full application: API routes, liveness endpoints, CORS and request tracing.
pub fn app(state: AppState) -> Router {
    create_router(state.clone())
        .route("/", get(|| async { "Parcel dispatch API" }))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

use axum::{Router, routing::put, middleware};
use crate::state::AppState;
use crate::handlers::review::add_review;
use crate::middleware::auth::require_auth;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/review/{id}", put(add_review))
        .layer(middleware::from_fn_with_state(state, require_auth))
}

use axum::{Router, routing::get};
use crate::state::AppState;
use crate::handlers::stats::get_stats;

pub fn routes() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}

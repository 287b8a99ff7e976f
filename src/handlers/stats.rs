use axum::extract::State;
use axum::Json;

use crate::dtos::stats::StatsResponse;
use crate::error::AppError;
use crate::models::{BookingStatus, Role};
use crate::state::AppState;

/// Exact counts; each one is a scan.
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    Ok(Json(StatsResponse {
        user_total: state.users.count_by_role(Role::User).await?,
        booking_total: state.bookings.count_all().await?,
        delivered_total: state.bookings.count_by_status(BookingStatus::Delivered).await?,
    }))
}

use axum::extract::{Extension, Path, State};
use axum::Json;

use crate::auth::access::require_self;
use crate::dtos::booking::{AdminUpdateRequest, CreateBookingRequest, StatusUpdateRequest};
use crate::error::AppError;
use crate::extract::AppJson;
use crate::middleware::auth::{AuthContext, Caller};
use crate::models::{AdminBookingUpdate, Booking, BookingId, BookingStatus, Role};
use crate::state::AppState;
use crate::store::{InsertOutcome, UpdateOutcome};

pub async fn add_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    AppJson(req): AppJson<CreateBookingRequest>,
) -> Result<Json<InsertOutcome<BookingId>>, AppError> {
    let booking = state.bookings.create_booking(req.into_new_booking(&auth.email)).await?;
    tracing::info!(id = %booking.id, requester = %booking.email, "booking created");
    Ok(Json(InsertOutcome::new(booking.id)))
}

/// Admins see every booking, delivery-men the ones assigned to them,
/// everyone else their own.
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Booking>>, AppError> {
    require_self(&auth, &email)?;
    let bookings = match state.users.find_by_email(&email).await? {
        Some(user) if user.role == Role::Admin => state.bookings.list_all().await?,
        Some(user) if user.role == Role::Deliveryman => state.bookings.list_for_deliveryman(user.id).await?,
        _ => state.bookings.list_for_requester(&email).await?,
    };
    Ok(Json(bookings))
}

pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let id = BookingId::parse_path(&id)?;
    let booking = fetch(&state, id).await?;
    Ok(Json(booking))
}

pub async fn admin_update_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<AdminUpdateRequest>,
) -> Result<Json<UpdateOutcome>, AppError> {
    let id = BookingId::parse_path(&id)?;
    let update = AdminBookingUpdate::from(req);

    if let Some(deliveryman_id) = update.deliveryman_id {
        let assignee = state.users.find_by_id(deliveryman_id).await?;
        if assignee.map(|u| u.role) != Some(Role::Deliveryman) {
            return Err(AppError::validation("deliverymanId does not name a delivery-man"));
        }
    }

    let outcome = state.bookings.update_by_admin(id, &update).await?;
    tracing::info!(%id, status = %update.status, matched = outcome.matched_count, "booking updated by admin");
    Ok(Json(outcome))
}

pub async fn deliveryman_update_booking(
    State(state): State<AppState>,
    Extension(Caller(deliveryman)): Extension<Caller>,
    Path(id): Path<String>,
    AppJson(req): AppJson<StatusUpdateRequest>,
) -> Result<Json<UpdateOutcome>, AppError> {
    let id = BookingId::parse_path(&id)?;
    let booking = fetch(&state, id).await?;
    if booking.deliveryman_id != Some(deliveryman.id) {
        return Err(AppError::forbidden("Booking is not assigned to you"));
    }
    let outcome = transition(&state, &booking, req.status).await?;
    if req.status == BookingStatus::Delivered {
        state.users.increment_parcel_delivered(deliveryman.id).await?;
    }
    tracing::info!(%id, status = %req.status, by = %deliveryman.email, "booking status updated");
    Ok(Json(outcome))
}

pub async fn requester_update_booking(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    AppJson(req): AppJson<StatusUpdateRequest>,
) -> Result<Json<UpdateOutcome>, AppError> {
    let id = BookingId::parse_path(&id)?;
    if req.status != BookingStatus::Cancelled {
        return Err(AppError::validation("Only cancellation is allowed"));
    }
    let booking = fetch(&state, id).await?;
    if booking.email != auth.email {
        return Err(AppError::forbidden("Forbidden"));
    }
    let outcome = transition(&state, &booking, req.status).await?;
    tracing::info!(%id, by = %auth.email, "booking cancelled");
    Ok(Json(outcome))
}

async fn fetch(state: &AppState, id: BookingId) -> Result<Booking, AppError> {
    state
        .bookings
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Booking not found"))
}

/// Moves `booking` to `to`, provided nobody changed its status since it was read.
async fn transition(state: &AppState, booking: &Booking, to: BookingStatus) -> Result<UpdateOutcome, AppError> {
    let from = booking.status;
    if !from.can_transition_to(to) {
        return Err(AppError::validation(format!("Cannot move booking from {from} to {to}")));
    }
    let outcome = state.bookings.transition_status(booking.id, from, to).await?;
    if outcome.matched_count == 0 {
        tracing::warn!(id = %booking.id, %from, %to, "booking status changed concurrently");
        return Err(AppError::conflict("Booking status changed, reload and retry"));
    }
    Ok(outcome)
}

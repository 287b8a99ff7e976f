use axum::extract::{Extension, Path, State};
use axum::Json;

use crate::dtos::review::ReviewRequest;
use crate::error::AppError;
use crate::extract::AppJson;
use crate::middleware::auth::AuthContext;
use crate::models::{Review, Role, UserId};
use crate::state::AppState;
use crate::store::UpdateOutcome;

pub async fn add_review(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    AppJson(req): AppJson<ReviewRequest>,
) -> Result<Json<UpdateOutcome>, AppError> {
    let id = UserId::parse_path(&id)?;
    let review = Review::try_from(req)?;

    let target = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    if target.role != Role::Deliveryman {
        return Err(AppError::validation("Only delivery-men can be reviewed"));
    }

    // a booking review must come from its requester and name its delivery-man
    if let Some(booking_id) = review.booking_id {
        let booking = state
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Booking not found"))?;
        if booking.email != auth.email {
            return Err(AppError::forbidden("Forbidden"));
        }
        if booking.deliveryman_id != Some(id) {
            return Err(AppError::validation("Booking was not delivered by this delivery-man"));
        }
    }

    let outcome = state.users.append_review(id, &review).await?;
    if let Some(booking_id) = review.booking_id {
        state.bookings.attach_review(booking_id, &review).await?;
    }
    tracing::info!(deliveryman = %id, rating = review.rating, by = %auth.email, "review added");
    Ok(Json(outcome))
}

use serde::Deserialize;

use crate::error::AppError;
use crate::models::{BookingId, Review};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub user: String,
    pub user_image: Option<String>,
    pub rating: i64,
    pub review_text: Option<String>,
    pub booking_id: Option<BookingId>,
}

impl TryFrom<ReviewRequest> for Review {
    type Error = AppError;

    fn try_from(req: ReviewRequest) -> Result<Self, Self::Error> {
        if !(1..=5).contains(&req.rating) {
            return Err(AppError::validation("rating must be between 1 and 5"));
        }
        Ok(Review {
            user: req.user,
            user_image: req.user_image,
            rating: req.rating as u8,
            review_text: req.review_text.unwrap_or_default(),
            booking_id: req.booking_id,
        })
    }
}

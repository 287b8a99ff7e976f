//! Persistence ports for users and bookings.
//!
//! Handlers only see these traits. `postgres` backs them with sqlx, `memory`
//! with lock-guarded vectors for local runs and tests.

pub mod memory;
pub mod postgres;

use serde::Serialize;

use crate::models::{
    AdminBookingUpdate, Booking, BookingId, BookingStatus, NewBooking, NewUser, ProfileUpdate,
    Review, Role, User, UserId,
};

pub use memory::{MemoryBookingStore, MemoryIdentityStore};
pub use postgres::{PgBookingStore, PgIdentityStore};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} already exists")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Acknowledgement of a single-record insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome<Id> {
    pub acknowledged: bool,
    pub inserted_id: Id,
}

impl<Id> InsertOutcome<Id> {
    pub fn new(inserted_id: Id) -> Self {
        Self { acknowledged: true, inserted_id }
    }
}

/// Acknowledgement of a single-record update. A zero `matched_count` means
/// the id named nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateOutcome {
    pub fn matched(count: u64) -> Self {
        Self { acknowledged: true, matched_count: count, modified_count: count }
    }

    /// Folds the outcome of a follow-up write on the same record.
    pub fn and(self, other: UpdateOutcome) -> Self {
        Self {
            acknowledged: self.acknowledged && other.acknowledged,
            matched_count: self.matched_count.max(other.matched_count),
            modified_count: self.modified_count.max(other.modified_count),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SocialLogin {
    Created(User),
    AlreadyExists,
}

/// `skip = page * limit`; no limit means everything from the offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: Option<i64>,
}

impl Page {
    pub fn offset(&self) -> i64 {
        self.limit.map_or(0, |limit| self.page.max(0).saturating_mul(limit.max(0)))
    }
}

#[async_trait::async_trait]
pub trait IdentityStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>>;
    /// Inserts unless a record with the same email exists; never mutates.
    async fn upsert_social_login(&self, user: NewUser) -> StoreResult<SocialLogin>;
    async fn list_by_role(&self, role: Role, page: Page) -> StoreResult<Vec<User>>;
    async fn update_profile_fields(&self, id: UserId, update: &ProfileUpdate) -> StoreResult<UpdateOutcome>;
    async fn change_role(&self, id: UserId, role: Role) -> StoreResult<UpdateOutcome>;
    /// Zeroes `averageReview` and `parcelDelivered`.
    async fn init_deliveryman_stats(&self, id: UserId) -> StoreResult<UpdateOutcome>;
    async fn increment_parcel_delivered(&self, id: UserId) -> StoreResult<UpdateOutcome>;
    async fn count_by_role(&self, role: Role) -> StoreResult<i64>;
    /// Appends to the review list and refreshes `averageReview` in one
    /// atomic write.
    async fn append_review(&self, id: UserId, review: &Review) -> StoreResult<UpdateOutcome>;
}

#[async_trait::async_trait]
pub trait BookingStore: Send + Sync {
    async fn create_booking(&self, booking: NewBooking) -> StoreResult<Booking>;
    async fn find_by_id(&self, id: BookingId) -> StoreResult<Option<Booking>>;
    async fn list_for_requester(&self, email: &str) -> StoreResult<Vec<Booking>>;
    async fn list_for_deliveryman(&self, deliveryman_id: UserId) -> StoreResult<Vec<Booking>>;
    async fn list_all(&self) -> StoreResult<Vec<Booking>>;
    async fn update_by_admin(&self, id: BookingId, update: &AdminBookingUpdate) -> StoreResult<UpdateOutcome>;
    /// Sets `to` only while the booking is still in `from`. A zero
    /// `matched_count` means the id is unknown or another write got there first.
    async fn transition_status(&self, id: BookingId, from: BookingStatus, to: BookingStatus) -> StoreResult<UpdateOutcome>;
    async fn attach_review(&self, id: BookingId, review: &Review) -> StoreResult<UpdateOutcome>;
    async fn count_all(&self) -> StoreResult<i64>;
    async fn count_by_status(&self, status: BookingStatus) -> StoreResult<i64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_offset_is_page_times_limit() {
        assert_eq!(Page { page: 2, limit: Some(10) }.offset(), 20);
        assert_eq!(Page { page: 3, limit: None }.offset(), 0);
        assert_eq!(Page::default().offset(), 0);
    }

    #[test]
    fn huge_page_saturates_instead_of_overflowing() {
        assert_eq!(Page { page: i64::MAX, limit: Some(2) }.offset(), i64::MAX);
    }

    #[test]
    fn outcome_serializes_like_a_driver_ack() {
        let v = serde_json::to_value(UpdateOutcome::matched(1)).unwrap();
        assert_eq!(v, serde_json::json!({"acknowledged": true, "matchedCount": 1, "modifiedCount": 1}));
    }

    #[test]
    fn outcomes_fold() {
        let folded = UpdateOutcome::matched(0).and(UpdateOutcome::matched(1));
        assert_eq!(folded.matched_count, 1);
    }
}

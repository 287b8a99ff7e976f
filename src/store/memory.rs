use chrono::Utc;
use tokio::sync::RwLock;

use super::{BookingStore, IdentityStore, Page, SocialLogin, StoreError, StoreResult, UpdateOutcome};
use crate::models::user::average_rating;
use crate::models::{
    AdminBookingUpdate, Booking, BookingId, BookingStatus, NewBooking, NewUser, ProfileUpdate,
    Review, Role, User, UserId,
};

/// Users kept in insertion order so pages are stable.
#[derive(Default)]
pub struct MemoryIdentityStore {
    users: RwLock<Vec<User>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update_with(&self, id: UserId, f: impl FnOnce(&mut User)) -> UpdateOutcome {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                f(user);
                UpdateOutcome::matched(1)
            }
            None => UpdateOutcome::matched(0),
        }
    }
}

#[async_trait::async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::Conflict(format!("email {}", new.email)));
        }
        let user = User::from_new(UserId::generate(), new, Utc::now());
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn upsert_social_login(&self, new: NewUser) -> StoreResult<SocialLogin> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == new.email) {
            return Ok(SocialLogin::AlreadyExists);
        }
        let user = User::from_new(UserId::generate(), new, Utc::now());
        users.push(user.clone());
        Ok(SocialLogin::Created(user))
    }

    async fn list_by_role(&self, role: Role, page: Page) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let matching = users.iter().filter(|u| u.role == role).skip(skip);
        Ok(match page.limit {
            Some(limit) => matching.take(usize::try_from(limit).unwrap_or(0)).cloned().collect(),
            None => matching.cloned().collect(),
        })
    }

    async fn update_profile_fields(&self, id: UserId, update: &ProfileUpdate) -> StoreResult<UpdateOutcome> {
        Ok(self.update_with(id, |u| update.apply(u)).await)
    }

    async fn change_role(&self, id: UserId, role: Role) -> StoreResult<UpdateOutcome> {
        Ok(self.update_with(id, |u| u.role = role).await)
    }

    async fn init_deliveryman_stats(&self, id: UserId) -> StoreResult<UpdateOutcome> {
        Ok(self
            .update_with(id, |u| {
                u.average_review = Some(0.0);
                u.parcel_delivered = Some(0);
            })
            .await)
    }

    async fn increment_parcel_delivered(&self, id: UserId) -> StoreResult<UpdateOutcome> {
        Ok(self
            .update_with(id, |u| u.parcel_delivered = Some(u.parcel_delivered.unwrap_or(0) + 1))
            .await)
    }

    async fn count_by_role(&self, role: Role) -> StoreResult<i64> {
        Ok(self.users.read().await.iter().filter(|u| u.role == role).count() as i64)
    }

    async fn append_review(&self, id: UserId, review: &Review) -> StoreResult<UpdateOutcome> {
        Ok(self
            .update_with(id, |u| {
                u.reviews.push(review.clone());
                u.average_review = average_rating(&u.reviews);
            })
            .await)
    }
}

#[derive(Default)]
pub struct MemoryBookingStore {
    bookings: RwLock<Vec<Booking>>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filtered(&self, pred: impl Fn(&Booking) -> bool) -> Vec<Booking> {
        self.bookings.read().await.iter().filter(|b| pred(b)).cloned().collect()
    }

    async fn update_with(&self, id: BookingId, f: impl FnOnce(&mut Booking)) -> UpdateOutcome {
        let mut bookings = self.bookings.write().await;
        match bookings.iter_mut().find(|b| b.id == id) {
            Some(booking) => {
                f(booking);
                UpdateOutcome::matched(1)
            }
            None => UpdateOutcome::matched(0),
        }
    }
}

#[async_trait::async_trait]
impl BookingStore for MemoryBookingStore {
    async fn create_booking(&self, new: NewBooking) -> StoreResult<Booking> {
        let booking = Booking::from_new(BookingId::generate(), new, Utc::now());
        self.bookings.write().await.push(booking.clone());
        Ok(booking)
    }

    async fn find_by_id(&self, id: BookingId) -> StoreResult<Option<Booking>> {
        Ok(self.bookings.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn list_for_requester(&self, email: &str) -> StoreResult<Vec<Booking>> {
        Ok(self.filtered(|b| b.email == email).await)
    }

    async fn list_for_deliveryman(&self, deliveryman_id: UserId) -> StoreResult<Vec<Booking>> {
        Ok(self.filtered(|b| b.deliveryman_id == Some(deliveryman_id)).await)
    }

    async fn list_all(&self) -> StoreResult<Vec<Booking>> {
        Ok(self.bookings.read().await.clone())
    }

    async fn update_by_admin(&self, id: BookingId, update: &AdminBookingUpdate) -> StoreResult<UpdateOutcome> {
        Ok(self.update_with(id, |b| update.apply(b)).await)
    }

    async fn transition_status(&self, id: BookingId, from: BookingStatus, to: BookingStatus) -> StoreResult<UpdateOutcome> {
        let mut bookings = self.bookings.write().await;
        let matched = match bookings.iter_mut().find(|b| b.id == id && b.status == from) {
            Some(booking) => {
                booking.status = to;
                1
            }
            None => 0,
        };
        Ok(UpdateOutcome::matched(matched))
    }

    async fn attach_review(&self, id: BookingId, review: &Review) -> StoreResult<UpdateOutcome> {
        Ok(self.update_with(id, |b| b.review = Some(review.clone())).await)
    }

    async fn count_all(&self) -> StoreResult<i64> {
        Ok(self.bookings.read().await.len() as i64)
    }

    async fn count_by_status(&self, status: BookingStatus) -> StoreResult<i64> {
        Ok(self.bookings.read().await.iter().filter(|b| b.status == status).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_support::{new_booking, new_user, review};

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryIdentityStore::new();
        store.create_user(new_user("a@x.com", Role::User)).await.unwrap();
        let err = store.create_user(new_user("a@x.com", Role::User)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn social_login_never_overwrites() {
        let store = MemoryIdentityStore::new();
        let first = store.upsert_social_login(new_user("a@x.com", Role::User)).await.unwrap();
        assert!(matches!(first, SocialLogin::Created(_)));

        let mut again = new_user("a@x.com", Role::User);
        again.name = "Someone Else".into();
        assert_eq!(store.upsert_social_login(again).await.unwrap(), SocialLogin::AlreadyExists);
        assert_eq!(store.find_by_email("a@x.com").await.unwrap().unwrap().name, "a");
    }

    #[tokio::test]
    async fn list_by_role_pages() {
        let store = MemoryIdentityStore::new();
        for i in 0..5 {
            store.create_user(new_user(&format!("u{i}@x.com"), Role::User)).await.unwrap();
        }
        store.create_user(new_user("d@x.com", Role::Deliveryman)).await.unwrap();

        let page = store.list_by_role(Role::User, Page { page: 1, limit: Some(2) }).await.unwrap();
        let emails: Vec<_> = page.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, ["u2@x.com", "u3@x.com"]);
        assert_eq!(store.list_by_role(Role::User, Page::default()).await.unwrap().len(), 5);
        assert_eq!(store.count_by_role(Role::Deliveryman).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn role_change_and_stat_init_are_separate() {
        let store = MemoryIdentityStore::new();
        let user = store.create_user(new_user("d@x.com", Role::User)).await.unwrap();

        store.change_role(user.id, Role::Deliveryman).await.unwrap();
        let changed = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(changed.role, Role::Deliveryman);
        assert_eq!(changed.parcel_delivered, None);

        store.init_deliveryman_stats(user.id).await.unwrap();
        let initialised = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(initialised.parcel_delivered, Some(0));
        assert_eq!(initialised.average_review, Some(0.0));
    }

    #[tokio::test]
    async fn sequential_review_appends_keep_every_entry() {
        let store = MemoryIdentityStore::new();
        let d = store.create_user(new_user("d@x.com", Role::Deliveryman)).await.unwrap();
        for rating in [5, 4, 3] {
            store.append_review(d.id, &review(rating)).await.unwrap();
        }
        let d = store.find_by_id(d.id).await.unwrap().unwrap();
        assert_eq!(d.reviews.len(), 3);
        assert_eq!(d.average_review, Some(4.0));
    }

    #[tokio::test]
    async fn concurrent_review_appends_keep_every_entry() {
        let store = Arc::new(MemoryIdentityStore::new());
        let id = store.create_user(new_user("d@x.com", Role::Deliveryman)).await.unwrap().id;

        let handles: Vec<_> = (0..32u8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.append_review(id, &review(1 + i % 5)).await })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }
        assert_eq!(store.find_by_id(id).await.unwrap().unwrap().reviews.len(), 32);
    }

    #[tokio::test]
    async fn update_of_unknown_id_matches_nothing() {
        let store = MemoryIdentityStore::new();
        let outcome = store.change_role(UserId::generate(), Role::Admin).await.unwrap();
        assert_eq!(outcome.matched_count, 0);
    }

    #[tokio::test]
    async fn admin_update_preserves_omitted_assignment() {
        let store = MemoryBookingStore::new();
        let booking = store.create_booking(new_booking("a@x.com")).await.unwrap();
        let d = UserId::generate();

        store
            .update_by_admin(booking.id, &AdminBookingUpdate { status: BookingStatus::Assigned, aprx_delivery: None, deliveryman_id: Some(d) })
            .await
            .unwrap();
        store
            .update_by_admin(booking.id, &AdminBookingUpdate { status: BookingStatus::InTransit, aprx_delivery: None, deliveryman_id: None })
            .await
            .unwrap();

        let stored = store.find_by_id(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::InTransit);
        assert_eq!(stored.deliveryman_id, Some(d));
        assert_eq!(store.list_for_deliveryman(d).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn stale_transition_matches_nothing() {
        let store = MemoryBookingStore::new();
        let id = store.create_booking(new_booking("a@x.com")).await.unwrap().id;

        let first = store.transition_status(id, BookingStatus::Pending, BookingStatus::Cancelled).await.unwrap();
        assert_eq!(first.matched_count, 1);
        let stale = store.transition_status(id, BookingStatus::Pending, BookingStatus::Assigned).await.unwrap();
        assert_eq!(stale.matched_count, 0);
        assert_eq!(store.find_by_id(id).await.unwrap().unwrap().status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn listings_filter_by_requester() {
        let store = MemoryBookingStore::new();
        store.create_booking(new_booking("a@x.com")).await.unwrap();
        store.create_booking(new_booking("a@x.com")).await.unwrap();
        store.create_booking(new_booking("b@x.com")).await.unwrap();

        assert_eq!(store.list_for_requester("a@x.com").await.unwrap().len(), 2);
        assert_eq!(store.list_all().await.unwrap().len(), 3);
        assert_eq!(store.count_by_status(BookingStatus::Pending).await.unwrap(), 3);
    }
}

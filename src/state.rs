use std::sync::Arc;

use crate::auth::jwt::TokenService;
use crate::store::{BookingStore, IdentityStore, MemoryBookingStore, MemoryIdentityStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn IdentityStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(users: Arc<dyn IdentityStore>, bookings: Arc<dyn BookingStore>, tokens: TokenService) -> Self {
        Self { users, bookings, tokens }
    }

    pub fn in_memory(tokens: TokenService) -> Self {
        Self::new(
            Arc::new(MemoryIdentityStore::new()),
            Arc::new(MemoryBookingStore::new()),
            tokens,
        )
    }
}

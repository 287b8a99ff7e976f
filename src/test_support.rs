//! Fixtures shared by unit and endpoint tests.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDate};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::jwt::{Claims, TokenService};
use crate::middleware::auth::AuthContext;
use crate::models::{NewBooking, NewUser, Review, Role, User};
use crate::routes;
use crate::state::AppState;

pub fn new_user(email: &str, role: Role) -> NewUser {
    NewUser {
        name: email.split('@').next().unwrap_or(email).to_string(),
        email: email.to_string(),
        role,
        image: Some(format!("https://img.example/{email}.png")),
        phone: Some("0100000000".to_string()),
    }
}

pub fn new_booking(email: &str) -> NewBooking {
    NewBooking {
        name: "Sender".to_string(),
        email: email.to_string(),
        phone: "0100000000".to_string(),
        parcel_type: "documents".to_string(),
        parcel_weight: 1.5,
        receiver_name: "Receiver".to_string(),
        receiver_phone: "0111111111".to_string(),
        delivery_address: "12 Harbour Road".to_string(),
        requested_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
        latitude: Some(23.81),
        longitude: Some(90.41),
        price: 100.0,
    }
}

pub fn review(rating: u8) -> Review {
    Review {
        user: "reviewer".to_string(),
        user_image: None,
        rating,
        review_text: "on time".to_string(),
        booking_id: None,
    }
}

pub fn auth_for(email: &str) -> AuthContext {
    AuthContext { email: email.to_string(), claims: Claims::for_email(email) }
}

pub fn test_state() -> AppState {
    AppState::in_memory(TokenService::new("test-secret", Duration::hours(10)))
}

/// Router plus the state behind it, so tests can seed records directly.
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = test_state();
        Self { router: routes::app(state.clone()), state }
    }

    pub async fn seed(&self, email: &str, role: Role) -> User {
        let user = self.state.users.create_user(new_user(email, role)).await.unwrap();
        if role == Role::Deliveryman {
            self.state.users.init_deliveryman_stats(user.id).await.unwrap();
        }
        user
    }

    pub fn token(&self, email: &str) -> String {
        self.state.tokens.issue(Claims::for_email(email)).unwrap()
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }
}

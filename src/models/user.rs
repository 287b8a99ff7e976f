use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{BookingId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Deliveryman,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Deliveryman => "deliveryman",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "deliveryman" => Ok(Role::Deliveryman),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role {other:?}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer's review of a delivery-man.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_image: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub review_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<BookingId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub image: Option<String>,
    pub phone: Option<String>,
    pub booking_count: i64,
    pub total_payment: Option<f64>,
    pub parcel_delivered: Option<i64>,
    pub average_review: Option<f64>,
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn from_new(id: UserId, new: NewUser, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            email: new.email,
            role: new.role,
            image: new.image,
            phone: new.phone,
            booking_count: 0,
            total_payment: None,
            parcel_delivered: None,
            average_review: None,
            reviews: Vec::new(),
            created_at,
        }
    }
}

/// Validated registration payload.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub image: Option<String>,
    pub phone: Option<String>,
}

/// Counters and profile fields a partial update may touch. Role changes go
/// through their own store operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub image: Option<String>,
    pub booking_count: Option<i64>,
    pub total_payment: Option<f64>,
    pub parcel_delivered: Option<i64>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.image.is_none()
            && self.booking_count.is_none()
            && self.total_payment.is_none()
            && self.parcel_delivered.is_none()
    }

    pub fn apply(&self, user: &mut User) {
        if let Some(image) = &self.image {
            user.image = Some(image.clone());
        }
        if let Some(count) = self.booking_count {
            user.booking_count = count;
        }
        if let Some(total) = self.total_payment {
            user.total_payment = Some(total);
        }
        if let Some(delivered) = self.parcel_delivered {
            user.parcel_delivered = Some(delivered);
        }
    }
}

pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let sum: f64 = reviews.iter().map(|r| f64::from(r.rating)).sum();
    Some(sum / reviews.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_text() {
        for role in [Role::User, Role::Deliveryman, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("courier".parse::<Role>().is_err());
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn user_serializes_camel_case() {
        let user = User::from_new(
            UserId::generate(),
            NewUser {
                name: "Ann".into(),
                email: "a@x.com".into(),
                role: Role::User,
                image: None,
                phone: Some("123".into()),
            },
            Utc::now(),
        );
        let v = serde_json::to_value(&user).unwrap();
        assert_eq!(v["bookingCount"], 0);
        assert_eq!(v["role"], "user");
        assert!(v["reviews"].as_array().unwrap().is_empty());
    }

    #[test]
    fn profile_update_only_touches_present_fields() {
        let mut user = User::from_new(
            UserId::generate(),
            NewUser { name: "Ann".into(), email: "a@x.com".into(), role: Role::User, image: Some("old".into()), phone: None },
            Utc::now(),
        );
        ProfileUpdate { booking_count: Some(3), ..Default::default() }.apply(&mut user);
        assert_eq!(user.booking_count, 3);
        assert_eq!(user.image.as_deref(), Some("old"));
    }

    #[test]
    fn average_of_ratings() {
        let review = |rating| Review { user: "u".into(), user_image: None, rating, review_text: String::new(), booking_id: None };
        assert_eq!(average_rating(&[]), None);
        assert_eq!(average_rating(&[review(4), review(5)]), Some(4.5));
    }
}

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{BookingId, UserId};
use super::user::Review;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Assigned,
    InTransit,
    Delivered,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Assigned => "assigned",
            BookingStatus::InTransit => "in-transit",
            BookingStatus::Delivered => "delivered",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Forward-only lifecycle; cancellation is allowed until delivery.
    /// The admin route bypasses this table.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Assigned)
                | (Assigned, InTransit)
                | (InTransit, Delivered)
                | (Pending | Assigned | InTransit, Cancelled)
        )
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "assigned" => Ok(BookingStatus::Assigned),
            "in-transit" => Ok(BookingStatus::InTransit),
            "delivered" => Ok(BookingStatus::Delivered),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status {other:?}")),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub parcel_type: String,
    pub parcel_weight: f64,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub delivery_address: String,
    pub requested_date: NaiveDate,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price: f64,
    pub status: BookingStatus,
    pub deliveryman_id: Option<UserId>,
    pub aprx_delivery: Option<NaiveDate>,
    pub review: Option<Review>,
    pub booked_at: DateTime<Utc>,
}

impl Booking {
    pub fn from_new(id: BookingId, new: NewBooking, booked_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            parcel_type: new.parcel_type,
            parcel_weight: new.parcel_weight,
            receiver_name: new.receiver_name,
            receiver_phone: new.receiver_phone,
            delivery_address: new.delivery_address,
            requested_date: new.requested_date,
            latitude: new.latitude,
            longitude: new.longitude,
            price: new.price,
            status: BookingStatus::Pending,
            deliveryman_id: None,
            aprx_delivery: None,
            review: None,
            booked_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub parcel_type: String,
    pub parcel_weight: f64,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub delivery_address: String,
    pub requested_date: NaiveDate,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price: f64,
}

/// Admin write: status is always set, the other two only when present.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminBookingUpdate {
    pub status: BookingStatus,
    pub aprx_delivery: Option<NaiveDate>,
    pub deliveryman_id: Option<UserId>,
}

impl AdminBookingUpdate {
    pub fn apply(&self, booking: &mut Booking) {
        booking.status = self.status;
        if let Some(date) = self.aprx_delivery {
            booking.aprx_delivery = Some(date);
        }
        if let Some(id) = self.deliveryman_id {
            booking.deliveryman_id = Some(id);
        }
    }
}

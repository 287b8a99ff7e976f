use chrono::NaiveDate;
use serde::Deserialize;

use crate::models::{AdminBookingUpdate, BookingStatus, NewBooking, UserId};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub name: String,
    /// Defaults to the caller's email.
    pub email: Option<String>,
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

impl CreateBookingRequest {
    pub fn into_new_booking(self, caller_email: &str) -> NewBooking {
        NewBooking {
            name: self.name,
            email: self.email.unwrap_or_else(|| caller_email.to_string()),
            phone: self.phone,
            parcel_type: self.parcel_type,
            parcel_weight: self.parcel_weight,
            receiver_name: self.receiver_name,
            receiver_phone: self.receiver_phone,
            delivery_address: self.delivery_address,
            requested_date: self.requested_date,
            latitude: self.latitude,
            longitude: self.longitude,
            price: self.price,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateRequest {
    pub status: BookingStatus,
    pub aprx_delivery: Option<NaiveDate>,
    pub deliveryman_id: Option<UserId>,
}

impl From<AdminUpdateRequest> for AdminBookingUpdate {
    fn from(req: AdminUpdateRequest) -> Self {
        AdminBookingUpdate {
            status: req.status,
            aprx_delivery: req.aprx_delivery,
            deliveryman_id: req.deliveryman_id,
        }
    }
}

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: BookingStatus,
}

pub mod booking;
pub mod ids;
pub mod user;

pub use booking::{AdminBookingUpdate, Booking, BookingStatus, NewBooking};
pub use ids::{BookingId, UserId};
pub use user::{NewUser, ProfileUpdate, Review, Role, User};

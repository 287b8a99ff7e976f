pub mod booking;
pub mod review;
pub mod stats;
pub mod user;

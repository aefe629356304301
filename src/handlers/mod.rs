pub mod auth;
pub mod bookings;
pub mod locations;
pub mod tours;

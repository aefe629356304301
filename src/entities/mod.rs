pub mod booking;
pub mod location;
pub mod location_image;
pub mod tour;
pub mod user;

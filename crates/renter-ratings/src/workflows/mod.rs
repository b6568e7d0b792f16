pub mod ratings;
pub mod reservations;
pub mod reviews;
pub mod vehicles;

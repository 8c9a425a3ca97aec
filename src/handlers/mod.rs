pub mod admin;
pub mod availability;
pub mod events;
pub mod health;
pub mod reservations;

pub mod client;
pub mod client_parking;
pub mod error;
pub mod health;
pub mod parking;

pub mod client;
pub mod client_parking;
pub mod parking;
pub mod postgres_repository;

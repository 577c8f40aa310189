pub mod parking_session;

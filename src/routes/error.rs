use crate::error::app_error::ErrorBody;
use rocket::serde::json::Json;
use rocket::{Catcher, Request, catch, catchers};

fn error_body(message: &str) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: message.to_string(),
    })
}

#[catch(400)]
pub fn bad_request(_: &Request) -> Json<ErrorBody> {
    error_body("Malformed request body")
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<ErrorBody> {
    error_body("Not found")
}

#[catch(409)]
pub fn conflict(_: &Request) -> Json<ErrorBody> {
    error_body("Conflict")
}

#[catch(413)]
pub fn payload_too_large(_: &Request) -> Json<ErrorBody> {
    error_body("Request body too large")
}

#[catch(422)]
pub fn unprocessable_entity(_: &Request) -> Json<ErrorBody> {
    error_body("Unprocessable request")
}

#[catch(500)]
pub fn internal_error(_: &Request) -> Json<ErrorBody> {
    error_body("Internal server error")
}

pub fn catchers() -> Vec<Catcher> {
    catchers![bad_request, not_found, conflict, payload_too_large, unprocessable_entity, internal_error]
}

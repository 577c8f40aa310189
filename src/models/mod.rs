pub mod client;
pub mod client_parking;
pub mod health;
pub mod parking;

use crate::error::app_error::AppError;

/// Unwraps a field the validator already checked, reporting `message` if it is absent.
pub(crate) fn required<T>(value: Option<T>, message: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::BadRequest(message.to_string()))
}

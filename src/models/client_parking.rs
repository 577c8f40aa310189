use crate::error::app_error::AppError;
use crate::models::client::Client;
use crate::models::parking::Parking;
use crate::models::required;
use chrono::{DateTime, Utc};
use rocket::FromForm;
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use validator::Validate;

pub const ENTERED_MESSAGE: &str = "Entered parking";
pub const EXITED_MESSAGE: &str = "Exited parking";

pub const CLIENT_NOT_FOUND: &str = "Client not found";
pub const PARKING_NOT_FOUND: &str = "Parking not found";
pub const PARKING_CLOSED: &str = "Parking is closed";
pub const NO_AVAILABLE_PLACES: &str = "No available spaces";
pub const ALREADY_PARKED: &str = "Client is already parked";
pub const ACTIVE_SESSION_NOT_FOUND: &str = "Active client parking not found";
pub const NO_PAYMENT_CARD: &str = "Client has no payment card attached";

/// Admission rules for entering a lot, checked in a fixed order so every
/// failure has exactly one cause.
pub fn admit_entry(client: Option<&Client>, parking: Option<&Parking>, active: Option<&ClientParking>) -> Result<(), AppError> {
    if client.is_none() {
        return Err(AppError::NotFound(CLIENT_NOT_FOUND.to_string()));
    }
    let parking = parking.ok_or_else(|| AppError::NotFound(PARKING_NOT_FOUND.to_string()))?;
    if !parking.opened {
        return Err(AppError::Rejected(PARKING_CLOSED.to_string()));
    }
    if !parking.has_free_places() {
        return Err(AppError::Rejected(NO_AVAILABLE_PLACES.to_string()));
    }
    if active.is_some() {
        return Err(AppError::Rejected(ALREADY_PARKED.to_string()));
    }
    Ok(())
}

/// Settlement rules for leaving a lot. Returns the session to close.
///
/// A missing session wins over a missing payment card.
pub fn settle_exit(active: Option<ClientParking>, client: Option<&Client>) -> Result<ClientParking, AppError> {
    let session = active
        .filter(ClientParking::is_active)
        .ok_or_else(|| AppError::NotFound(ACTIVE_SESSION_NOT_FOUND.to_string()))?;
    let client = client.ok_or_else(|| AppError::NotFound(CLIENT_NOT_FOUND.to_string()))?;
    if !client.has_payment_card() {
        return Err(AppError::Rejected(NO_PAYMENT_CARD.to_string()));
    }
    Ok(session)
}

/// One client's stay at a lot. `time_out` stays empty while the car is parked.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, sqlx::FromRow, JsonSchema)]
pub struct ClientParking {
    pub id: i32,
    pub client_id: i32,
    pub parking_id: i32,
    pub time_in: DateTime<Utc>,
    pub time_out: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Closed,
}

impl ClientParking {
    pub fn status(&self) -> SessionStatus {
        match self.time_out {
            None => SessionStatus::Active,
            Some(_) => SessionStatus::Closed,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status() == SessionStatus::Active
    }
}

#[derive(Deserialize, Debug, Default, Validate, FromForm, JsonSchema)]
pub struct ClientParkingRequest {
    #[validate(
        required(message = "client_id and parking_id are required"),
        range(min = 1, message = "client_id and parking_id are required")
    )]
    pub client_id: Option<i32>,
    #[validate(
        required(message = "client_id and parking_id are required"),
        range(min = 1, message = "client_id and parking_id are required")
    )]
    pub parking_id: Option<i32>,
}

/// Identifies the client and lot an enter or exit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub client_id: i32,
    pub parking_id: i32,
}

impl TryFrom<ClientParkingRequest> for SessionKey {
    type Error = AppError;

    fn try_from(request: ClientParkingRequest) -> Result<Self, Self::Error> {
        const MISSING: &str = "client_id and parking_id are required";
        Ok(Self {
            client_id: required(request.client_id.filter(|id| *id > 0), MISSING)?,
            parking_id: required(request.parking_id.filter(|id| *id > 0), MISSING)?,
        })
    }
}

/// Settlement of a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitReceipt {
    pub client_parking: ClientParking,
    pub parking_time_hours: f64,
    pub cost: i64,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct EnterParkingResponse {
    pub message: String,
    pub client_parking: ClientParking,
}

impl From<ClientParking> for EnterParkingResponse {
    fn from(client_parking: ClientParking) -> Self {
        Self {
            message: ENTERED_MESSAGE.to_string(),
            client_parking,
        }
    }
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct ExitParkingResponse {
    pub message: String,
    pub parking_time_hours: f64,
    pub cost: i64,
    pub client_parking: ClientParking,
}

impl From<ExitReceipt> for ExitParkingResponse {
    fn from(receipt: ExitReceipt) -> Self {
        Self {
            message: EXITED_MESSAGE.to_string(),
            parking_time_hours: receipt.parking_time_hours,
            cost: receipt.cost,
            client_parking: receipt.client_parking,
        }
    }
}

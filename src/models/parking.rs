use crate::error::app_error::AppError;
use crate::models::required;
use rocket::FromForm;
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use validator::Validate;

/// A parking lot and its live occupancy counter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, sqlx::FromRow, JsonSchema)]
pub struct Parking {
    pub id: i32,
    pub address: String,
    pub opened: bool,
    pub count_places: i32,
    pub count_available_places: i32,
}

impl Parking {
    pub fn has_free_places(&self) -> bool {
        self.count_available_places > 0
    }
}

#[derive(Deserialize, Debug, Default, Validate, FromForm, JsonSchema)]
pub struct ParkingRequest {
    #[validate(
        required(message = "Address and count_places are required"),
        length(min = 1, max = 100, message = "Address must be between 1 and 100 characters")
    )]
    pub address: Option<String>,
    #[validate(
        required(message = "Address and count_places are required"),
        range(min = 1, message = "count_places must be a positive number")
    )]
    pub count_places: Option<i32>,
    pub opened: Option<bool>,
}

/// A validated lot definition. A new lot starts with every place available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParking {
    pub address: String,
    pub opened: bool,
    pub count_places: i32,
}

impl TryFrom<ParkingRequest> for NewParking {
    type Error = AppError;

    fn try_from(request: ParkingRequest) -> Result<Self, Self::Error> {
        const MISSING: &str = "Address and count_places are required";
        Ok(Self {
            address: required(request.address.filter(|address| !address.is_empty()), MISSING)?,
            opened: request.opened.unwrap_or(true),
            count_places: required(request.count_places.filter(|count| *count > 0), MISSING)?,
        })
    }
}

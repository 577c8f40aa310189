use crate::error::app_error::AppError;
use crate::models::required;
use rocket::FromForm;
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, sqlx::FromRow, JsonSchema)]
pub struct Client {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub credit_card: Option<String>,
    pub car_number: Option<String>,
}

impl Client {
    /// A card token that is present but blank does not count as a payment method.
    pub fn has_payment_card(&self) -> bool {
        self.credit_card.as_deref().is_some_and(|card| !card.trim().is_empty())
    }
}

/// Signup payload as it arrives over the wire, JSON or form encoded.
#[derive(Deserialize, Debug, Default, Validate, FromForm, JsonSchema)]
pub struct ClientRequest {
    #[validate(
        required(message = "Name and surname are required"),
        length(min = 1, max = 50, message = "Name must be between 1 and 50 characters")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "Name and surname are required"),
        length(min = 1, max = 50, message = "Surname must be between 1 and 50 characters")
    )]
    pub surname: Option<String>,
    #[validate(length(max = 50, message = "Credit card must be at most 50 characters"))]
    pub credit_card: Option<String>,
    #[validate(length(max = 10, message = "Car number must be at most 10 characters"))]
    pub car_number: Option<String>,
}

/// A validated signup, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub name: String,
    pub surname: String,
    pub credit_card: Option<String>,
    pub car_number: Option<String>,
}

impl TryFrom<ClientRequest> for NewClient {
    type Error = AppError;

    fn try_from(request: ClientRequest) -> Result<Self, Self::Error> {
        const MISSING: &str = "Name and surname are required";
        Ok(Self {
            name: required(request.name.filter(|name| !name.is_empty()), MISSING)?,
            surname: required(request.surname.filter(|surname| !surname.is_empty()), MISSING)?,
            credit_card: request.credit_card.filter(|card| !card.trim().is_empty()),
            car_number: request.car_number.filter(|car| !car.trim().is_empty()),
        })
    }
}

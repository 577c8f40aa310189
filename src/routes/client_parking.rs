use crate::config::ParkingConfig;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonOrForm;
use crate::models::client_parking::{ClientParkingRequest, EnterParkingResponse, ExitParkingResponse, SessionKey};
use crate::service::parking_session::ParkingSessionService;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::{State, delete, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use validator::Validate;

/// Enter a parking lot
///
/// Fails when the lot is closed or full, or when the client is already parked.
#[openapi(tag = "Client parkings")]
#[post("/client_parkings", data = "<payload>")]
pub async fn enter_parking(
    pool: &State<PgPool>,
    parking_config: &State<ParkingConfig>,
    payload: JsonOrForm<ClientParkingRequest>,
) -> Result<Created<Json<EnterParkingResponse>>, AppError> {
    payload.validate()?;
    let key = SessionKey::try_from(payload.into_inner())?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let service = ParkingSessionService::new(&repo, parking_config);
    let client_parking = service.enter(key).await?;

    let location = format!("/clients/{}/client_parkings", client_parking.client_id);
    Ok(Created::new(location).body(Json(EnterParkingResponse::from(client_parking))))
}

/// Leave a parking lot and pay for the stay
#[openapi(tag = "Client parkings")]
#[delete("/client_parkings", data = "<payload>")]
pub async fn exit_parking(
    pool: &State<PgPool>,
    parking_config: &State<ParkingConfig>,
    payload: JsonOrForm<ClientParkingRequest>,
) -> Result<Json<ExitParkingResponse>, AppError> {
    payload.validate()?;
    let key = SessionKey::try_from(payload.into_inner())?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let service = ParkingSessionService::new(&repo, parking_config);
    let receipt = service.exit(key).await?;

    Ok(Json(ExitParkingResponse::from(receipt)))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![enter_parking, exit_parking]
}

use crate::database::parking::ParkingRepository;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonOrForm;
use crate::models::parking::{NewParking, Parking, ParkingRequest};
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use validator::Validate;

/// List every parking lot with its current occupancy
#[openapi(tag = "Parkings")]
#[get("/parkings")]
pub async fn list_parkings(pool: &State<PgPool>) -> Result<Json<Vec<Parking>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    Ok(Json(repo.list_parkings().await?))
}

#[openapi(tag = "Parkings")]
#[get("/parkings/<id>")]
pub async fn get_parking(pool: &State<PgPool>, id: i32) -> Result<Json<Parking>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    repo.get_parking_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Parking not found".to_string()))
}

/// Create a parking lot; every place starts out available
#[openapi(tag = "Parkings")]
#[post("/parkings", data = "<payload>")]
pub async fn create_parking(pool: &State<PgPool>, payload: JsonOrForm<ParkingRequest>) -> Result<Created<Json<Parking>>, AppError> {
    payload.validate()?;
    let new_parking = NewParking::try_from(payload.into_inner())?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let parking = repo.create_parking(&new_parking).await?;
    Ok(Created::new(format!("/parkings/{}", parking.id)).body(Json(parking)))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_parkings, get_parking, create_parking]
}

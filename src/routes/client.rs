use crate::database::client::ClientRepository;
use crate::database::client_parking::ClientParkingRepository;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonOrForm;
use crate::models::client::{Client, ClientRequest, NewClient};
use crate::models::client_parking::ClientParking;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use validator::Validate;

/// List every client
#[openapi(tag = "Clients")]
#[get("/clients")]
pub async fn list_clients(pool: &State<PgPool>) -> Result<Json<Vec<Client>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    Ok(Json(repo.list_clients().await?))
}

/// Get a client by id
#[openapi(tag = "Clients")]
#[get("/clients/<id>")]
pub async fn get_client(pool: &State<PgPool>, id: i32) -> Result<Json<Client>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    if let Some(client) = repo.get_client_by_id(id).await? {
        Ok(Json(client))
    } else {
        Err(AppError::NotFound("Client not found".to_string()))
    }
}

/// Sign up a new client
#[openapi(tag = "Clients")]
#[post("/clients", data = "<payload>")]
pub async fn create_client(pool: &State<PgPool>, payload: JsonOrForm<ClientRequest>) -> Result<Created<Json<Client>>, AppError> {
    payload.validate()?;
    let new_client = NewClient::try_from(payload.into_inner())?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let client = repo.create_client(&new_client).await?;
    Ok(Created::new(format!("/clients/{}", client.id)).body(Json(client)))
}

/// Parking history of a client, newest first
#[openapi(tag = "Clients")]
#[get("/clients/<id>/client_parkings")]
pub async fn list_client_parkings(pool: &State<PgPool>, id: i32) -> Result<Json<Vec<ClientParking>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    if repo.get_client_by_id(id).await?.is_none() {
        return Err(AppError::NotFound("Client not found".to_string()));
    }
    Ok(Json(repo.list_client_parkings_for_client(id).await?))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_clients, get_client, create_client, list_client_parkings]
}

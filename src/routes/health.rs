use crate::database::postgres_repository::PostgresRepository;
use crate::models::health::HealthResponse;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;
use sqlx::PgPool;
use tracing::warn;

/// Liveness plus a database round trip
#[openapi(tag = "Health")]
#[get("/health")]
pub async fn healthcheck(pool: &State<PgPool>) -> Custom<Json<HealthResponse>> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    match repo.ping().await {
        Ok(()) => Custom(Status::Ok, Json(HealthResponse::from_database_reachable(true))),
        Err(e) => {
            warn!(error = ?e, "health check could not reach the database");
            Custom(Status::ServiceUnavailable, Json(HealthResponse::from_database_reachable(false)))
        }
    }
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![healthcheck]
}

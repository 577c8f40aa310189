use rocket::serde::Serialize;
use schemars::JsonSchema;

#[derive(Serialize, Debug, JsonSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

impl HealthResponse {
    pub fn from_database_reachable(reachable: bool) -> Self {
        if reachable {
            Self { status: "ok", database: "up" }
        } else {
            Self {
                status: "degraded",
                database: "down",
            }
        }
    }
}

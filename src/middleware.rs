use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::request::Request;
use rocket::{Data, Response};
use tracing::{info, warn};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Request ID attached to every request for log correlation
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new() -> Self {
        RequestId(Uuid::new_v4().to_string())
    }

    /// Reuses a caller-supplied id when it looks sane, otherwise mints one.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(id) if !id.is_empty() && id.len() <= 64 && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') => {
                RequestId(id.to_string())
            }
            _ => RequestId::new(),
        }
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// Fairing that tags requests with an id and logs each request and its outcome
pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        let request_id = RequestId::from_header(request.headers().get_one(REQUEST_ID_HEADER));
        request.local_cache(|| Some(request_id.clone()));

        info!(
            request_id = %request_id.0,
            method = %request.method(),
            uri = %request.uri(),
            content_type = ?request.content_type(),
            "incoming request"
        );
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let request_id = request
            .local_cache(|| None::<RequestId>)
            .as_ref()
            .map(|r| r.0.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let status = response.status();

        response.set_header(Header::new(REQUEST_ID_HEADER, request_id.clone()));
        response.set_header(Header::new("X-Content-Type-Options", "nosniff"));
        response.set_header(Header::new("Cache-Control", "no-store"));

        if status.class().is_server_error() || status.class().is_client_error() {
            warn!(
                request_id = %request_id,
                method = %request.method(),
                uri = %request.uri(),
                status = %status.code,
                "request completed with error"
            );
        } else {
            info!(
                request_id = %request_id,
                method = %request.method(),
                uri = %request.uri(),
                status = %status.code,
                "request completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::http::Status;
    use rocket::local::asynchronous::Client;

    #[test]
    fn generated_ids_are_unique_uuids() {
        let id1 = RequestId::new();
        let id2 = RequestId::default();
        assert!(Uuid::parse_str(&id1.0).is_ok());
        assert_ne!(id1.0, id2.0);
    }

    #[test]
    fn caller_supplied_id_is_reused() {
        assert_eq!(RequestId::from_header(Some("gate-7-abc")).0, "gate-7-abc");
    }

    #[test]
    fn unsafe_caller_id_is_replaced() {
        let id = RequestId::from_header(Some("bad id\nInjected: header"));
        assert!(Uuid::parse_str(&id.0).is_ok());
        assert!(Uuid::parse_str(&RequestId::from_header(Some("")).0).is_ok());
    }

    #[rocket::get("/ping")]
    fn ping() -> &'static str {
        "pong"
    }

    #[rocket::async_test]
    async fn responses_carry_request_id() {
        let rocket = rocket::build().attach(RequestLogger).mount("/", rocket::routes![ping]);
        let client = Client::tracked(rocket).await.expect("valid rocket instance");

        let response = client.get("/ping").header(Header::new(REQUEST_ID_HEADER, "abc-123")).dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.headers().get_one(REQUEST_ID_HEADER), Some("abc-123"));
    }
}

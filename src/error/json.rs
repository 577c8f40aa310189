use rocket::data::{ByteUnit, Data, FromData, Outcome};
use rocket::form::{Form, FromForm};
use rocket::http::Status;
use rocket::request::Request;
use rocket::serde::json::Json;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::RequestBody;
use rocket_okapi::request::OpenApiFromData;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::ops::Deref;
use tracing::warn;

const DEFAULT_BODY_LIMIT: ByteUnit = ByteUnit::Mebibyte(1);

/// Request body accepted either as JSON or as `application/x-www-form-urlencoded`.
///
/// Both encodings land in the same typed struct, so handlers never branch on
/// the content type. Bodies without a content type are read as JSON.
#[derive(Debug)]
pub struct JsonOrForm<T>(pub T);

impl<T> JsonOrForm<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for JsonOrForm<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Why a request body could not be turned into a typed payload.
#[derive(Debug)]
pub enum BodyError {
    TooLarge,
    Io,
    Json,
    Form,
}

#[rocket::async_trait]
impl<'r, T> FromData<'r> for JsonOrForm<T>
where
    T: DeserializeOwned + FromForm<'r> + Send,
{
    type Error = BodyError;

    async fn from_data(req: &'r Request<'_>, data: Data<'r>) -> Outcome<'r, Self> {
        if req.content_type().is_some_and(|ct| ct.is_form()) {
            return match Form::<T>::from_data(req, data).await {
                Outcome::Success(form) => Outcome::Success(JsonOrForm(form.into_inner())),
                Outcome::Error((_, errors)) => {
                    warn!(
                        method = %req.method(),
                        uri = %req.uri(),
                        error = %errors,
                        "Failed to parse form request body"
                    );
                    Outcome::Error((Status::BadRequest, BodyError::Form))
                }
                Outcome::Forward(forward) => Outcome::Forward(forward),
            };
        }

        let limit = req.limits().get("json").unwrap_or(DEFAULT_BODY_LIMIT);

        let bytes = match data.open(limit).into_bytes().await {
            Ok(bytes) if bytes.is_complete() => bytes.into_inner(),
            Ok(_) => {
                warn!(
                    method = %req.method(),
                    uri = %req.uri(),
                    "JSON payload exceeded size limit"
                );
                return Outcome::Error((Status::PayloadTooLarge, BodyError::TooLarge));
            }
            Err(e) => {
                warn!(
                    method = %req.method(),
                    uri = %req.uri(),
                    error = %e,
                    "Failed to read request body"
                );
                return Outcome::Error((Status::BadRequest, BodyError::Io));
            }
        };

        match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => Outcome::Success(JsonOrForm(value)),
            Err(e) => {
                let body_preview = String::from_utf8_lossy(&bytes);
                let body_preview: String = body_preview.chars().take(500).collect();

                warn!(
                    method = %req.method(),
                    uri = %req.uri(),
                    error_message = %e,
                    error_line = e.line(),
                    error_column = e.column(),
                    error_category = ?e.classify(),
                    request_body = %body_preview,
                    "Failed to parse JSON request body"
                );

                Outcome::Error((Status::BadRequest, BodyError::Json))
            }
        }
    }
}

impl<'r, T> OpenApiFromData<'r> for JsonOrForm<T>
where
    T: DeserializeOwned + FromForm<'r> + JsonSchema + Send,
{
    fn request_body(generator: &mut OpenApiGenerator) -> rocket_okapi::Result<RequestBody> {
        <Json<T> as OpenApiFromData<'r>>::request_body(generator)
    }
}

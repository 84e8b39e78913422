use actix_web::{error, http::StatusCode, HttpResponse};
use crate::models::ErrorResponse;
use crate::services::{DispatchError, StoreError};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Map a service error onto an HTTP response
pub fn dispatch_error_response(err: &DispatchError) -> HttpResponse {
    let (status, error) = match err {
        DispatchError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation failed"),
        DispatchError::Store(StoreError::NotFound(_)) => (StatusCode::NOT_FOUND, "Not found"),
        DispatchError::Store(StoreError::RequestError(_))
        | DispatchError::Store(StoreError::ApiError(_))
        | DispatchError::Store(StoreError::InvalidResponse(_)) => (StatusCode::BAD_GATEWAY, "Record store error"),
        DispatchError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Record store error"),
    };

    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message: err.to_string(),
        status_code: status.as_u16(),
    })
}

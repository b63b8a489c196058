//! # API Error Type
//!
//! Maps request failures to the structured `{"errors": [...]}` envelope.
//! Internal failures are logged but never surface their message to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use texplore_core::{ErrorCode, RequestError};
use utoipa::ToSchema;

/// Wire shape of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorsBody {
    /// One entry per problem; a single entry for structural failures.
    #[schema(value_type = Vec<Object>)]
    pub errors: Vec<RequestError>,
}

/// Application-level error type implementing [`IntoResponse`].
#[derive(Debug)]
pub enum ApiError {
    /// A structural lookup failure (unknown schema/service/operation) — 404.
    NotFound(RequestError),
    /// A rejected request: envelope problems or accumulated field
    /// validation errors — 400.
    BadRequest(Vec<RequestError>),
    /// An internal failure — 500. The message is logged, not returned.
    Internal(String),
}

impl ApiError {
    /// Split a `validate_call` error list into the right variant:
    /// structural errors are fatal and alone, everything else is a 400.
    pub fn from_request_errors(errors: Vec<RequestError>) -> Self {
        let structural = errors.first().map(|e| {
            matches!(
                e.code,
                ErrorCode::ThriftNotLoaded
                    | ErrorCode::ServiceNotInThrift
                    | ErrorCode::EndpointNotInService
            )
        });
        match structural {
            Some(true) => {
                let mut errors = errors;
                ApiError::NotFound(errors.remove(0))
            }
            _ => ApiError::BadRequest(errors),
        }
    }

    /// A single malformed-envelope error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(vec![RequestError::invalid_request(message)])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, errors) = match self {
            ApiError::NotFound(error) => (StatusCode::NOT_FOUND, vec![error]),
            ApiError::BadRequest(errors) => (StatusCode::BAD_REQUEST, errors),
            ApiError::Internal(message) => {
                tracing::error!(%message, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    vec![RequestError::invalid_request("An internal error occurred")],
                )
            }
        };
        (status, Json(ErrorsBody { errors })).into_response()
    }
}

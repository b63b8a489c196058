//! # Read-Only Registry Views
//!
//! Listings, raw schema definitions, and per-service operation names.
//! Nothing here touches the network; every handler is a registry lookup.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use texplore_core::{ErrorCode, RequestError, ServiceListing};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for the root listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse {
    /// Every (schema file, service) pair with its sorted operation names.
    #[schema(value_type = Vec<Object>)]
    pub thrifts: Vec<ServiceListing>,
}

/// Response body for one service's info.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    /// The schema file name.
    pub thrift: String,
    /// The service name.
    pub service: String,
    /// Sorted operation names.
    pub methods: Vec<String>,
}

/// GET / — every loaded (schema, service) pair.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Loaded services", body = ListResponse),
    ),
    tag = "explorer"
)]
pub async fn list_services(State(state): State<AppState>) -> Json<ListResponse> {
    Json(ListResponse {
        thrifts: state.registry.listings(),
    })
}

/// GET /:thrift — the raw schema source, verbatim.
#[utoipa::path(
    get,
    path = "/{thrift}",
    params(("thrift" = String, Path, description = "Schema file name, extension optional")),
    responses(
        (status = 200, description = "Raw schema source", body = String, content_type = "text/plain"),
        (status = 404, description = "Schema file not loaded", body = crate::error::ErrorsBody),
    ),
    tag = "explorer"
)]
pub async fn schema_definition(
    State(state): State<AppState>,
    Path(thrift): Path<String>,
) -> Result<Response, ApiError> {
    let file = super::qualify(&thrift);
    let source = state
        .registry
        .source(&file)
        .ok_or_else(|| thrift_not_found(&file))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        source.to_string(),
    )
        .into_response())
}

/// GET /:thrift/:service — one service's operation names.
#[utoipa::path(
    get,
    path = "/{thrift}/{service}",
    params(
        ("thrift" = String, Path, description = "Schema file name, extension optional"),
        ("service" = String, Path, description = "Service name"),
    ),
    responses(
        (status = 200, description = "Service info", body = ServiceInfo),
        (status = 404, description = "Unknown schema file or service", body = crate::error::ErrorsBody),
    ),
    tag = "explorer"
)]
pub async fn service_info(
    State(state): State<AppState>,
    Path((thrift, service)): Path<(String, String)>,
) -> Result<Json<ServiceInfo>, ApiError> {
    let file = super::qualify(&thrift);
    let schema = state
        .registry
        .schema(&file)
        .ok_or_else(|| thrift_not_found(&file))?;
    let descriptor = schema.services.get(&service).ok_or_else(|| {
        ApiError::NotFound(RequestError::structural(
            ErrorCode::ServiceNotInThrift,
            format!("Service '{service}' not found"),
        ))
    })?;
    Ok(Json(ServiceInfo {
        thrift: file,
        service: descriptor.name.clone(),
        methods: descriptor.operation_names(),
    }))
}

fn thrift_not_found(file: &str) -> ApiError {
    ApiError::NotFound(RequestError::structural(
        ErrorCode::ThriftNotLoaded,
        format!("Thrift '{file}' not found"),
    ))
}

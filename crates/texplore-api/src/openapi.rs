//! # OpenAPI Document
//!
//! Generated from the handler annotations via utoipa and served at
//! `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// The OpenAPI document for the explorer's surface.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::schemas::list_services,
        crate::routes::schemas::schema_definition,
        crate::routes::schemas::service_info,
        crate::routes::invoke::operation_template,
        crate::routes::invoke::invoke,
    ),
    components(schemas(
        crate::routes::schemas::ListResponse,
        crate::routes::schemas::ServiceInfo,
        crate::routes::invoke::CallRequest,
        crate::routes::invoke::EchoedRequest,
        crate::routes::invoke::CallResponse,
        crate::error::ErrorsBody,
    )),
    tags((name = "explorer", description = "Schema inspection and ad-hoc Thrift calls"))
)]
pub struct ApiDoc;

/// Router serving the document.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve))
}

async fn serve() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

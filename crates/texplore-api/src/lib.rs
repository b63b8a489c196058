//! # texplore-api — HTTP Surface for the Thrift Explorer
//!
//! Exposes the loaded schema registry and the ad-hoc call path over HTTP.
//!
//! ## API Surface
//!
//! | Route                          | Method | Purpose                          |
//! |--------------------------------|--------|----------------------------------|
//! | `/`                            | GET    | Every (schema, service) pair     |
//! | `/:thrift`                     | GET    | Raw schema source, `text/plain`  |
//! | `/:thrift/:service`            | GET    | The service's operation names    |
//! | `/:thrift/:service/:method`    | GET    | An empty request template        |
//! | `/:thrift/:service/:method`    | POST   | Validate, translate, and call    |
//! | `/health/liveness`             | GET    | Process liveness probe           |
//! | `/health/readiness`            | GET    | Readiness probe                  |
//! | `/openapi.json`                | GET    | OpenAPI document                 |
//!
//! A missing `.thrift` extension in the path is appended before lookup on
//! every route, so `/todo/TodoService` and `/todo.thrift/TodoService` are
//! the same resource.
//!
//! ## Error Envelope
//!
//! Structural lookup failures return 404, request problems 400, both as
//! `{"errors": [{code, message, field?}]}`. Field validation errors
//! accumulate; structural errors are always alone in the list.

pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use state::{AppConfig, AppState};

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    Router::new()
        .route("/", get(routes::schemas::list_services))
        .merge(openapi::router())
        .route("/:thrift", get(routes::schemas::schema_definition))
        .route("/:thrift/:service", get(routes::schemas::service_info))
        .route(
            "/:thrift/:service/:method",
            get(routes::invoke::operation_template).post(routes::invoke::invoke),
        )
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — the registry is built before the router exists, so
/// a serving process is always ready.
async fn readiness() -> &'static str {
    "ready"
}

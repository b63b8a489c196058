//! # Request Templates and Invocation
//!
//! The GET handler hands back an empty, fill-in-the-blanks request for an
//! operation. The POST handler runs the full path: envelope checks, the
//! core's accumulated validation, translation to native arguments, the
//! blocking wire call (behind `spawn_blocking`), and translation of
//! whatever came back.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use texplore_core::{from_native, translate_args, Value};
use texplore_wire::{CallOutcome, Endpoint, Protocol, Transport, WireError};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::state::AppState;

/// The invocation envelope an operator POSTs.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CallRequest {
    /// Hostname or IP of the remote service.
    pub host: String,
    /// TCP port of the remote service.
    pub port: u16,
    /// Protocol name; the configured default applies when absent.
    pub protocol: Option<String>,
    /// Transport name; the configured default applies when absent.
    pub transport: Option<String>,
    /// The operation's arguments, keyed by argument name.
    #[serde(default = "empty_body")]
    #[schema(value_type = Object)]
    pub request_body: serde_json::Value,
}

fn empty_body() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// The request as the server resolved it, echoed in every response.
#[derive(Debug, Serialize, ToSchema)]
pub struct EchoedRequest {
    /// The schema file, extension included.
    pub thrift_file: String,
    /// The service name.
    pub service_name: String,
    /// The operation name.
    pub endpoint_name: String,
    /// Hostname or IP the call went to.
    pub host: String,
    /// TCP port the call went to.
    pub port: u16,
    /// The resolved protocol.
    #[schema(value_type = String)]
    pub protocol: Protocol,
    /// The resolved transport.
    #[schema(value_type = String)]
    pub transport: Transport,
    /// The request body as supplied.
    #[schema(value_type = Object)]
    pub request_body: serde_json::Value,
}

/// The invocation result.
#[derive(Debug, Serialize, ToSchema)]
pub struct CallResponse {
    /// `"Success"`, a declared error variant's type name, or a transport
    /// failure category (`"ConnectionError"` / `"ServerError"`).
    pub status: String,
    /// The request as resolved.
    pub request: EchoedRequest,
    /// The translated response value, or the failure message for
    /// transport-level failures.
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    /// Seconds to establish the connection; null on transport failure.
    pub time_to_connect: Option<f64>,
    /// Seconds for the call itself; null on transport failure.
    pub time_to_make_request: Option<f64>,
}

/// GET /:thrift/:service/:method — an empty request template.
#[utoipa::path(
    get,
    path = "/{thrift}/{service}/{method}",
    params(
        ("thrift" = String, Path, description = "Schema file name, extension optional"),
        ("service" = String, Path, description = "Service name"),
        ("method" = String, Path, description = "Operation name"),
    ),
    responses(
        (status = 200, description = "Empty request template", body = EchoedRequest),
        (status = 404, description = "Unknown schema, service, or operation", body = crate::error::ErrorsBody),
    ),
    tag = "explorer"
)]
pub async fn operation_template(
    State(state): State<AppState>,
    Path((thrift, service, method)): Path<(String, String, String)>,
) -> Result<Json<EchoedRequest>, ApiError> {
    let file = super::qualify(&thrift);
    let (_, op) = state
        .registry
        .lookup(&file, &service, &method)
        .map_err(ApiError::NotFound)?;
    Ok(Json(EchoedRequest {
        thrift_file: file,
        service_name: service,
        endpoint_name: op.name.clone(),
        host: "<hostname>".to_string(),
        port: 9090,
        protocol: state.config.default_protocol,
        transport: state.config.default_transport,
        request_body: empty_body(),
    }))
}

/// POST /:thrift/:service/:method — validate, translate, call, translate.
#[utoipa::path(
    post,
    path = "/{thrift}/{service}/{method}",
    params(
        ("thrift" = String, Path, description = "Schema file name, extension optional"),
        ("service" = String, Path, description = "Service name"),
        ("method" = String, Path, description = "Operation name"),
    ),
    request_body = CallRequest,
    responses(
        (status = 200, description = "Call performed", body = CallResponse),
        (status = 400, description = "Invalid envelope or failed validation", body = crate::error::ErrorsBody),
        (status = 404, description = "Unknown schema, service, or operation", body = crate::error::ErrorsBody),
    ),
    tag = "explorer"
)]
pub async fn invoke(
    State(state): State<AppState>,
    Path((thrift, service, method)): Path<(String, String, String)>,
    body: Result<Json<CallRequest>, JsonRejection>,
) -> Result<Json<CallResponse>, ApiError> {
    let request = body
        .map(|Json(v)| v)
        .map_err(|rejection| ApiError::invalid_request(rejection.body_text()))?;
    let file = super::qualify(&thrift);

    let protocol = match &request.protocol {
        Some(name) => name
            .parse::<Protocol>()
            .map_err(|e| ApiError::invalid_request(e.to_string()))?,
        None => state.config.default_protocol,
    };
    let transport = match &request.transport {
        Some(name) => name
            .parse::<Transport>()
            .map_err(|e| ApiError::invalid_request(e.to_string()))?,
        None => state.config.default_transport,
    };

    let body_value = Value::from(request.request_body.clone());
    let (op, structs) = state
        .registry
        .validate_call(&file, &service, &method, &body_value)
        .map_err(ApiError::from_request_errors)?;

    // Validation has passed, so translation failures are internal.
    let args = translate_args(op, &body_value, structs)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let endpoint = Endpoint {
        host: request.host.clone(),
        port: request.port,
        protocol,
        transport,
    };
    let echoed = EchoedRequest {
        thrift_file: file,
        service_name: service,
        endpoint_name: op.name.clone(),
        host: request.host,
        port: request.port,
        protocol,
        transport,
        request_body: request.request_body,
    };

    let op = op.clone();
    let structs = structs.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        texplore_wire::call(&endpoint, &op, &structs, &args)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    let response = match outcome {
        Ok(wire) => {
            let (status, data) = match wire.outcome {
                CallOutcome::Success(native) => {
                    ("Success".to_string(), from_native(&native).to_json())
                }
                CallOutcome::DeclaredError { name, value } => {
                    (name, from_native(&value).to_json())
                }
            };
            CallResponse {
                status,
                request: echoed,
                data,
                time_to_connect: Some(wire.time_to_connect.as_secs_f64()),
                time_to_make_request: Some(wire.time_to_make_request.as_secs_f64()),
            }
        }
        // transport failures carry no partial timing: they may occur
        // before or during connection
        Err(WireError::Connect(message)) => CallResponse {
            status: "ConnectionError".to_string(),
            request: echoed,
            data: serde_json::Value::String(format!(
                "Failed to make client connection: {message}"
            )),
            time_to_connect: None,
            time_to_make_request: None,
        },
        Err(WireError::Call(message)) => CallResponse {
            status: "ServerError".to_string(),
            request: echoed,
            data: serde_json::Value::String(format!("Failed to make call: {message}")),
            time_to_connect: None,
            time_to_make_request: None,
        },
    };
    Ok(Json(response))
}

//! The HTTP surface's contract: listings, definitions, templates, the
//! error envelope for every failure family, and full invocations against
//! the in-process todo service.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{demo_dir, demo_registry, TodoServer};
use http_body_util::BodyExt;
use serde_json::json;
use texplore_api::state::{AppConfig, AppState};
use texplore_wire::{Protocol, Transport};
use tower::ServiceExt;

fn test_app() -> axum::Router {
    texplore_api::app(AppState::new(demo_registry(), AppConfig::default()))
}

async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn lists_every_service_with_sorted_methods() {
    let response = test_app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "thrifts": [
                {
                    "thrift": "Batman.thrift",
                    "service": "BatPuter",
                    "methods": ["addVillain", "getVillain", "ping", "saveCase"],
                },
                {
                    "thrift": "todo.thrift",
                    "service": "TodoService",
                    "methods": [
                        "completeTask",
                        "createTask",
                        "createTaskWithObject",
                        "fancyNewMethod",
                        "getTask",
                        "listTasks",
                        "numTasks",
                        "ping",
                    ],
                },
            ]
        })
    );
}

#[tokio::test]
async fn serves_raw_definitions_verbatim_with_or_without_extension() {
    let expected = std::fs::read_to_string(demo_dir().join("Batman.thrift")).unwrap();

    let response = test_app().oneshot(get("/Batman")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; charset=utf-8"
    );
    assert_eq!(body_text(response).await, expected);

    let response = test_app().oneshot(get("/Batman.thrift")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_thrift_is_a_single_structural_404() {
    let response = test_app().oneshot(get("/notAThrift")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({
            "errors": [{
                "code": "THRIFT_NOT_LOADED",
                "message": "Thrift 'notAThrift.thrift' not found",
            }]
        })
    );
}

#[tokio::test]
async fn unknown_service_is_a_single_structural_404() {
    let response = test_app().oneshot(get("/Batman/NotAService")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({
            "errors": [{
                "code": "SERVICE_NOT_IN_THRIFT",
                "message": "Service 'NotAService' not found",
            }]
        })
    );
}

#[tokio::test]
async fn unknown_method_is_a_single_structural_404() {
    let response = test_app()
        .oneshot(get("/Batman/BatPuter/notAMethod"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({
            "errors": [{
                "code": "ENDPOINT_NOT_IN_SERVICE",
                "message": "Method 'notAMethod' not found",
            }]
        })
    );
}

#[tokio::test]
async fn service_info_lists_methods() {
    let response = test_app().oneshot(get("/Batman/BatPuter")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "thrift": "Batman.thrift",
            "service": "BatPuter",
            "methods": ["addVillain", "getVillain", "ping", "saveCase"],
        })
    );
}

#[tokio::test]
async fn templates_default_host_port_and_wire_options() {
    let response = test_app()
        .oneshot(get("/Batman/BatPuter/getVillain"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "thrift_file": "Batman.thrift",
            "service_name": "BatPuter",
            "endpoint_name": "getVillain",
            "host": "<hostname>",
            "port": 9090,
            "protocol": "binary",
            "transport": "buffered",
            "request_body": {},
        })
    );
}

#[tokio::test]
async fn missing_required_argument_returns_the_field_descriptor() {
    let response = test_app()
        .oneshot(post_json(
            "/todo/TodoService/completeTask",
            json!({"host": "127.0.0.1", "port": 6000, "request_body": {}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({
            "errors": [{
                "code": "REQUIRED_FIELD_MISSING",
                "message": "Required Field 'taskId' not found",
                "field": {
                    "field_id": 1,
                    "name": "taskId",
                    "type": {"primitive": "string"},
                    "required": true,
                },
            }]
        })
    );
}

#[tokio::test]
async fn field_validation_errors_accumulate() {
    let response = test_app()
        .oneshot(post_json(
            "/todo/TodoService/createTask",
            json!({
                "host": "127.0.0.1",
                "port": 6000,
                "request_body": {"description": 4, "dueDate": 5},
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|e| e["code"] == json!("FIELD_VALIDATION_ERROR")));
}

#[tokio::test]
async fn missing_host_is_an_invalid_request() {
    let response = test_app()
        .oneshot(post_json(
            "/todo/TodoService/createTask",
            json!({"port": 6000, "request_body": {"description": "task 1"}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["code"], json!("INVALID_REQUEST"));
    assert!(body["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("host"));
}

#[tokio::test]
async fn unknown_transport_is_an_invalid_request() {
    let response = test_app()
        .oneshot(post_json(
            "/todo/TodoService/createTask",
            json!({
                "host": "localhost",
                "port": 6000,
                "transport": "batman!",
                "request_body": {"description": "task 1"},
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({
            "errors": [{
                "code": "INVALID_REQUEST",
                "message": "'batman!' is not a valid transport",
            }]
        })
    );
}

#[tokio::test]
async fn full_invocation_succeeds_with_timing() {
    let server = TodoServer::spawn(Protocol::Binary, Transport::Buffered);
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/todo/TodoService/createTask",
            json!({
                "host": "127.0.0.1",
                "port": server.port,
                "request_body": {"description": "task 1", "dueDate": "12-12-2012"},
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json(
            "/todo/TodoService/numTasks",
            json!({"host": "127.0.0.1", "port": server.port, "request_body": {}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let mut body = body_json(response).await;

    assert!(body["time_to_connect"].as_f64().is_some());
    assert!(body["time_to_make_request"].as_f64().is_some());
    let object = body.as_object_mut().unwrap();
    object.remove("time_to_connect");
    object.remove("time_to_make_request");
    assert_eq!(
        body,
        json!({
            "status": "Success",
            "request": {
                "thrift_file": "todo.thrift",
                "service_name": "TodoService",
                "endpoint_name": "numTasks",
                "host": "127.0.0.1",
                "port": server.port,
                "protocol": "binary",
                "transport": "buffered",
                "request_body": {},
            },
            "data": 1,
        })
    );
}

#[tokio::test]
async fn struct_arguments_invoke_end_to_end() {
    let server = TodoServer::spawn(Protocol::Binary, Transport::Buffered);

    let response = test_app()
        .oneshot(post_json(
            "/todo/TodoService/createTaskWithObject",
            json!({
                "host": "127.0.0.1",
                "port": server.port,
                "request_body": {
                    "task": {"description": "task 1", "dueDate": "12-12-2012"},
                },
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], json!("Success"));
    assert_eq!(body["data"]["__type_tag__"], json!("Task"));
    assert_eq!(body["data"]["description"], json!("task 1"));
}

#[tokio::test]
async fn declared_errors_become_the_response_status() {
    let server = TodoServer::spawn(Protocol::Binary, Transport::Buffered);

    let response = test_app()
        .oneshot(post_json(
            "/todo/TodoService/getTask",
            json!({
                "host": "127.0.0.1",
                "port": server.port,
                "request_body": {"taskId": "whatever"},
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], json!("NotFound"));
    assert_eq!(body["data"], json!({"__type_tag__": "NotFound"}));
    assert!(body["time_to_connect"].as_f64().is_some());
}

#[tokio::test]
async fn connection_failures_report_without_timing() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let response = test_app()
        .oneshot(post_json(
            "/todo/TodoService/ping",
            json!({"host": "127.0.0.1", "port": port, "request_body": {}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], json!("ConnectionError"));
    assert!(body["data"]
        .as_str()
        .unwrap()
        .starts_with("Failed to make client connection:"));
    assert_eq!(body["time_to_connect"], json!(null));
    assert_eq!(body["time_to_make_request"], json!(null));
}

#[tokio::test]
async fn unimplemented_remote_methods_are_server_errors() {
    let server = TodoServer::spawn(Protocol::Binary, Transport::Buffered);

    let response = test_app()
        .oneshot(post_json(
            "/todo/TodoService/fancyNewMethod",
            json!({"host": "127.0.0.1", "port": server.port, "request_body": {}}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], json!("ServerError"));
    assert!(body["data"]
        .as_str()
        .unwrap()
        .starts_with("Failed to make call:"));
}

#[tokio::test]
async fn openapi_document_serves() {
    let response = test_app().oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["paths"]["/{thrift}/{service}/{method}"].is_object());
}

#[tokio::test]
async fn health_probes_answer() {
    let response = test_app().oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = test_app().oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

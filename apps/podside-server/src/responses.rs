use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

pub fn json_ok(value: Value) -> Response {
    (StatusCode::OK, Json(value)).into_response()
}

pub fn json_status(status: StatusCode, value: Value) -> Response {
    (status, Json(value)).into_response()
}

/// `{"detail": ...}` error body used by the download endpoints.
pub fn detail(status: StatusCode, detail: &str) -> Response {
    json_status(status, json!({ "detail": detail }))
}

pub fn unsupported_path() -> Response {
    detail(StatusCode::NOT_FOUND, "Unsupported path")
}

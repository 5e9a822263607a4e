use axum::{extract::State, response::Response};
use serde_json::json;

use crate::{responses, AppState};

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "Meta",
    operation_id = "healthz_doc",
    description = "Service readiness probe with download task totals.",
    responses(
        (status = 200, description = "Service healthy", body = crate::openapi::HealthOk)
    )
)]
pub async fn healthz(State(state): State<AppState>) -> Response {
    let tasks = state.downloads().tasks().counts();
    responses::json_ok(json!({ "ok": true, "tasks": tasks }))
}

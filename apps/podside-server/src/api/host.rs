use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{inventory, log_tail, responses, AppState};

/// Installed custom nodes and model files.
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "Host",
    operation_id = "host_status_doc",
    responses(
        (status = 200, description = "Host inventory", body = crate::inventory::HostInventory)
    )
)]
pub async fn api_status(State(state): State<AppState>) -> Response {
    let inventory =
        inventory::snapshot(state.comfy_root(), state.downloads().destinations()).await;
    // Category order must survive; a `serde_json::Value` map would sort it.
    Json(inventory).into_response()
}

/// Tail of the ComfyUI log.
#[utoipa::path(
    get,
    path = "/logs",
    tag = "Host",
    operation_id = "host_logs_doc",
    responses(
        (status = 200, description = "Last lines of the log file", body = crate::openapi::LogTail)
    )
)]
pub async fn logs(State(state): State<AppState>) -> Response {
    let logs = log_tail::tail(state.log_file(), state.log_tail_lines()).await;
    responses::json_ok(json!({ "logs": logs }))
}

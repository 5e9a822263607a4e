use axum::{
    body::Bytes,
    extract::{OriginalUri, Query, State},
    http::StatusCode,
    response::Response,
};
use serde_json::{json, Value};
use tracing::debug;
use utoipa::ToSchema;

use crate::{downloads::StartRequest, responses, AppState};

/// Body accepted by `POST /download/...`.
#[derive(Debug, Default, ToSchema)]
pub struct DownloadPayload {
    pub url: String,
    /// Category key such as `models/loras`.
    pub model_type: String,
    pub api_key: Option<String>,
    /// Alias for `api_key`.
    pub token: Option<String>,
    pub filename: Option<String>,
}

impl DownloadPayload {
    /// Reads whatever string fields the body carries. A body that is not a
    /// JSON object reads as empty, and a field of the wrong type reads as
    /// absent without discarding its neighbours.
    fn parse_lenient(body: &[u8]) -> Self {
        let fields = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => return Self::default(),
            Err(err) => {
                debug!("download body ignored: {err}");
                return Self::default();
            }
        };
        let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            url: text("url").unwrap_or_default(),
            model_type: text("model_type").unwrap_or_default(),
            api_key: text("api_key"),
            token: text("token"),
            filename: text("filename"),
        }
    }

    fn bearer(&self) -> Option<String> {
        non_empty(self.api_key.as_deref()).or_else(|| non_empty(self.token.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Start a download.
#[utoipa::path(
    post,
    path = "/download/{source}",
    tag = "Downloads",
    operation_id = "download_start_doc",
    description = "Queue a model download into a registered category directory. Any suffix after /download/ is accepted.",
    params(("source" = String, Path, description = "Free-form suffix, logged only")),
    request_body = DownloadPayload,
    responses(
        (status = 202, description = "Accepted", body = crate::openapi::TaskAccepted),
        (status = 400, description = "Missing url or unknown model_type", body = crate::openapi::Detail),
    )
)]
pub async fn download_start(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    body: Bytes,
) -> Response {
    let payload = DownloadPayload::parse_lenient(&body);
    let url = payload.url.trim();
    let category = payload.model_type.trim();

    if url.is_empty() {
        return responses::detail(StatusCode::BAD_REQUEST, "url is required");
    }
    let downloads = state.downloads();
    if !downloads.destinations().contains(category) {
        return responses::detail(StatusCode::BAD_REQUEST, "Unsupported model_type");
    }

    let task_id = downloads.start(StartRequest {
        category: category.to_string(),
        url: url.to_string(),
        token: payload.bearer(),
        filename: non_empty(payload.filename.as_deref()),
        route: uri.path().to_string(),
    });
    responses::json_status(StatusCode::ACCEPTED, json!({ "task_id": task_id }))
}

/// Poll a download task.
#[utoipa::path(
    get,
    path = "/download/status",
    tag = "Downloads",
    operation_id = "download_status_doc",
    params(("id" = String, Query, description = "Task id returned by the start call")),
    responses(
        (status = 200, description = "Task state", body = crate::downloads::DownloadTask),
        (status = 404, description = "Unknown task", body = crate::openapi::UnknownTask),
    )
)]
pub async fn download_status(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let id = params
        .into_iter()
        .find_map(|(key, value)| (key == "id").then_some(value))
        .unwrap_or_default();
    match state.downloads().status(&id) {
        Some(task) => responses::json_ok(json!(task)),
        None => responses::json_status(StatusCode::NOT_FOUND, json!({ "status": "unknown" })),
    }
}

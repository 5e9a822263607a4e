use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use utoipa::OpenApi;

use crate::{
    access_log,
    app_state::HostPaths,
    config::ServerArgs,
    downloads::{DestinationRegistry, DownloadTuning, Downloads, HttpTransfer, TaskRegistry},
    http_client, router, AppState,
};

pub(crate) struct BootstrapOutput {
    pub router: axum::Router<AppState>,
    pub state: AppState,
}

pub(crate) fn build(args: &ServerArgs) -> anyhow::Result<BootstrapOutput> {
    let tuning = DownloadTuning::from_env();
    let client = http_client::client(tuning.connect_timeout).context("build download client")?;
    let transfer = Arc::new(HttpTransfer::new(client, tuning.idle_timeout));
    let destinations = Arc::new(DestinationRegistry::from_root(&args.comfy_root));
    let tasks = Arc::new(TaskRegistry::new(args.max_finished_tasks));
    info!(
        comfy_root = %args.comfy_root.display(),
        categories = destinations.len(),
        connect_timeout_secs = tuning.connect_timeout.as_secs(),
        idle_timeout_secs = ?tuning.idle_timeout_secs(),
        max_finished_tasks = ?args.max_finished_tasks,
        "download subsystem ready"
    );

    let downloads = Arc::new(Downloads::new(destinations, tasks, transfer));
    let state = AppState::new(
        downloads,
        HostPaths {
            comfy_root: args.comfy_root.clone(),
            web_root: args.web_root.clone(),
            log_file: args.log_file.clone(),
            log_tail_lines: args.log_tail_lines(),
        },
    );
    Ok(BootstrapOutput {
        router: router::build_router(),
        state,
    })
}

pub(crate) fn attach_http_layers(router: axum::Router<()>) -> axum::Router<()> {
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    router
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

pub(crate) fn attach_global_layers(router: axum::Router<()>) -> axum::Router<()> {
    router.layer(axum::middleware::from_fn(access_log::access_log_mw))
}

/// Write the OpenAPI document and report where, when `OPENAPI_OUT` asks for it.
pub(crate) fn ensure_openapi_export() -> Result<Option<String>, std::io::Error> {
    if let Ok(path) = std::env::var("OPENAPI_OUT") {
        export_openapi(&path)?;
        return Ok(Some(path));
    }
    Ok(None)
}

fn export_openapi(path: &str) -> Result<(), std::io::Error> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = crate::openapi::ApiDoc::openapi()
        .to_yaml()
        .unwrap_or_else(|_| "openapi: 3.1.0".into());
    std::fs::write(path, yaml)
}

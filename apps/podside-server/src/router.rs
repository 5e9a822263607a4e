use axum::{
    routing::{get, post},
    Router,
};

use crate::{api, AppState};

pub(crate) mod paths {
    pub const HEALTHZ: &str = "/healthz";
    pub const API_STATUS: &str = "/api/status";
    pub const LOGS: &str = "/logs";
    pub const DOWNLOAD_STATUS: &str = "/download/status";
    pub const DOWNLOAD_ROOT: &str = "/download/";
    pub const DOWNLOAD_ANY: &str = "/download/{*source}";
}

/// API routes plus the static UI fallback.
///
/// Any POST under `/download/` starts a download, `/download/status`
/// included. Methods a route does not list fall through to the static
/// handler, which answers non-GET requests with `Unsupported path`.
pub(crate) fn build_router() -> Router<AppState> {
    use api::ui::static_fallback;

    Router::new()
        .route(
            paths::HEALTHZ,
            get(api::meta::healthz).fallback(static_fallback),
        )
        .route(
            paths::API_STATUS,
            get(api::host::api_status).fallback(static_fallback),
        )
        .route(paths::LOGS, get(api::host::logs).fallback(static_fallback))
        .route(
            paths::DOWNLOAD_STATUS,
            get(api::downloads::download_status)
                .post(api::downloads::download_start)
                .fallback(static_fallback),
        )
        .route(
            paths::DOWNLOAD_ROOT,
            post(api::downloads::download_start).fallback(static_fallback),
        )
        .route(
            paths::DOWNLOAD_ANY,
            post(api::downloads::download_start).fallback(static_fallback),
        )
        .fallback(static_fallback)
}

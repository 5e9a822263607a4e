use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, Uri},
    response::{IntoResponse, Response},
};
use tower::util::ServiceExt;
use tower_http::services::ServeDir;

use crate::{responses, AppState};

/// Entry page served for `/` and `/index.html`.
pub const ENTRY_PAGE: &str = "/web.html";

/// Everything the API routes do not claim. Reads are served from the web
/// root; any other method is an unsupported path.
pub async fn static_fallback(State(state): State<AppState>, req: Request<Body>) -> Response {
    if !matches!(*req.method(), Method::GET | Method::HEAD) {
        return responses::unsupported_path();
    }
    let (mut parts, body) = req.into_parts();
    if matches!(parts.uri.path(), "/" | "/index.html") {
        parts.uri = Uri::from_static(ENTRY_PAGE);
    }
    let req = Request::from_parts(parts, body);
    match ServeDir::new(state.web_root()).oneshot(req).await {
        Ok(res) => res.into_response(),
        Err(never) => match never {},
    }
}

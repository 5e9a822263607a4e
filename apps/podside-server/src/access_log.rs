use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, MatchedPath},
    http::Request,
    middleware::Next,
    response::Response,
};
use once_cell::sync::Lazy;
use podside_otel::ACCESS_TARGET;

#[derive(Clone, Debug)]
struct Cfg {
    enabled: bool,
    sample_n: u64,
}

impl Cfg {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            enabled: lookup("PODSIDE_ACCESS_LOG").as_deref() != Some("0"),
            sample_n: lookup("PODSIDE_ACCESS_SAMPLE_N")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(1)
                .max(1),
        }
    }
}

static CFG: Lazy<Cfg> = Lazy::new(|| Cfg::from_lookup(|key| std::env::var(key).ok()));

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// One structured line per request on the access target. The UI polls
/// `/download/status` often, so `PODSIDE_ACCESS_SAMPLE_N` keeps every n-th.
pub async fn access_log_mw(req: Request<axum::body::Body>, next: Next) -> Response {
    if !CFG.enabled {
        return next.run(req).await;
    }
    let started = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let remote = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|c| c.0.ip().to_string());

    let res = next.run(req).await;

    let n = COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    if CFG.sample_n > 1 && n % CFG.sample_n != 0 {
        return res;
    }
    tracing::info!(
        target: ACCESS_TARGET,
        method = %method,
        path = %path,
        status = res.status().as_u16(),
        remote = remote.as_deref().unwrap_or("-"),
        dur_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    res
}

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;

/// Serve `router` on an ephemeral loopback port for the rest of the test.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// A URL pointing at a loopback port nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback listener");
    let addr = listener.local_addr().expect("listener addr");
    drop(listener);
    format!("http://{addr}/gone.bin")
}

/// Client that ignores proxy settings from the environment.
pub fn test_client() -> reqwest::Client {
    crate::http_client::builder(Duration::from_secs(2))
        .no_proxy()
        .build()
        .expect("test http client")
}

/// Poll `check` until it returns `Some` or the deadline passes.
pub async fn eventually<T, F>(mut check: F) -> T
where
    F: FnMut() -> Option<T>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(value) = check() {
            return value;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met before deadline"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

use std::time::Duration;

fn user_agent() -> String {
    format!("podside-server/{}", env!("CARGO_PKG_VERSION"))
}

/// Base client builder with harmonized defaults. No overall request timeout is
/// applied; downloads can legitimately run for a long time.
pub fn builder(connect_timeout: Duration) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(user_agent())
        .connect_timeout(connect_timeout)
        .tcp_keepalive(Duration::from_secs(60))
        .pool_idle_timeout(Duration::from_secs(90))
}

pub fn client(connect_timeout: Duration) -> reqwest::Result<reqwest::Client> {
    builder(connect_timeout).build()
}

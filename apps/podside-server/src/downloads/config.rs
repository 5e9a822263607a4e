use std::time::Duration;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

/// Transport limits for downloads. Read once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DownloadTuning {
    pub connect_timeout: Duration,
    /// Abort a transfer when no chunk arrives for this long. `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for DownloadTuning {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            idle_timeout: Some(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS)),
        }
    }
}

impl DownloadTuning {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let connect_timeout = lookup("PODSIDE_HTTP_CONNECT_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS)
            .max(1);
        let idle_timeout = lookup("PODSIDE_DL_IDLE_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok());
        let idle_timeout = match idle_timeout {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS)),
        };
        Self {
            connect_timeout: Duration::from_secs(connect_timeout),
            idle_timeout,
        }
    }

    pub fn idle_timeout_secs(&self) -> Option<u64> {
        self.idle_timeout.map(|d| d.as_secs())
    }
}

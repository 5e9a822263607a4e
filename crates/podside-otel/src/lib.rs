use once_cell::sync::OnceCell;
use tracing_subscriber::{
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

static FILE_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();

/// Target used by the HTTP access-log middleware.
pub const ACCESS_TARGET: &str = "http.access";

/// Where and how often the optional rolling log copy is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RollConfig {
    pub dir: String,
    pub prefix: String,
    pub rotation: Rotation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    Minutely,
    Hourly,
    Daily,
}

impl Rotation {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hourly" => Rotation::Hourly,
            "minutely" => Rotation::Minutely,
            _ => Rotation::Daily,
        }
    }
}

impl RollConfig {
    /// Reads `PODSIDE_LOG_ROLL`, `PODSIDE_LOG_DIR`, `PODSIDE_LOG_PREFIX` and
    /// `PODSIDE_LOG_ROTATION`. Returns `None` unless rolling is switched on.
    pub fn from_env() -> Option<Self> {
        if std::env::var("PODSIDE_LOG_ROLL").ok().as_deref() != Some("1") {
            return None;
        }
        let dir = std::env::var("PODSIDE_LOG_DIR").unwrap_or_else(|_| "logs".to_string());
        let prefix = std::env::var("PODSIDE_LOG_PREFIX").unwrap_or_else(|_| "podside".into());
        let rotation = std::env::var("PODSIDE_LOG_ROTATION")
            .map(|raw| Rotation::parse(&raw))
            .unwrap_or(Rotation::Daily);
        Some(Self {
            dir,
            prefix,
            rotation,
        })
    }
}

/// Install the global subscriber. Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    install_console(filter, RollConfig::from_env());
}

fn install_console(filter: EnvFilter, roll: Option<RollConfig>) {
    let fmt_layer = fmt::layer();
    let registry = tracing_subscriber::registry().with(fmt_layer.with_filter(filter));
    let Some(roll) = roll else {
        let _ = registry.try_init();
        return;
    };

    if std::fs::create_dir_all(&roll.dir).is_err() {
        tracing::warn!(directory = %roll.dir, "failed to create log directory");
    }
    let writer = match roll.rotation {
        Rotation::Hourly => tracing_appender::rolling::hourly(&roll.dir, &roll.prefix),
        Rotation::Minutely => tracing_appender::rolling::minutely(&roll.dir, &roll.prefix),
        Rotation::Daily => tracing_appender::rolling::daily(&roll.dir, &roll.prefix),
    };
    let (nb, guard) = tracing_appender::non_blocking(writer);
    let _ = FILE_GUARD.set(guard);
    let file_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(nb)
        .with_filter(file_filter);
    let _ = registry.with(file_layer).try_init();
}

use std::net::{SocketAddr, ToSocketAddrs};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

/// Startup configuration. Every flag can also come from the environment.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "podside-server",
    version,
    about = "Status, logs and model downloads for a ComfyUI host"
)]
pub struct ServerArgs {
    #[arg(long, env = "PODSIDE_HOST", default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, env = "PODSIDE_PORT", default_value_t = 8189)]
    pub port: u16,
    /// Directory holding the UI bundle (`web.html` is the entry page).
    #[arg(long, env = "PODSIDE_WEB_ROOT", default_value = "/workspace/webui")]
    pub web_root: PathBuf,
    /// ComfyUI install root; download categories live beneath it.
    #[arg(
        long,
        env = "PODSIDE_COMFY_ROOT",
        default_value = "/workspace/runpod-slim/ComfyUI"
    )]
    pub comfy_root: PathBuf,
    #[arg(
        long,
        env = "PODSIDE_LOG_FILE",
        default_value = "/workspace/runpod-slim/comfyui.log"
    )]
    pub log_file: PathBuf,
    /// Lines returned by `/logs`.
    #[arg(long, env = "PODSIDE_LOG_TAIL_LINES", default_value_t = 400)]
    pub log_tail_lines: usize,
    /// Keep only this many finished download tasks. Unbounded when unset;
    /// zero is refused so a finished task can always be polled at least once.
    #[arg(long, env = "PODSIDE_MAX_FINISHED_TASKS")]
    pub max_finished_tasks: Option<NonZeroUsize>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid bind address {host}:{port}: {reason}")]
    InvalidBind {
        host: String,
        port: u16,
        reason: String,
    },
}

impl ServerArgs {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBind {
            host: self.host.clone(),
            port: self.port,
            reason,
        };
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|err| invalid(err.to_string()))?
            .next()
            .ok_or_else(|| invalid("no addresses resolved".into()))
    }

    pub fn log_tail_lines(&self) -> usize {
        self.log_tail_lines.max(1)
    }
}

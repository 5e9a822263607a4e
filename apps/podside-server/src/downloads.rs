use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use tokio::fs;
use tracing::{error, info, warn};

mod config;
mod destinations;
mod registry;
mod sandbox;
mod transfer;

pub use config::DownloadTuning;
pub use destinations::DestinationRegistry;
pub use registry::{DownloadTask, TaskCounts, TaskRegistry, TaskStatus};
use sandbox::{filename_from_url, resolve_within};
pub use transfer::{HttpTransfer, Transfer, TransferError};

/// A download accepted by the HTTP surface.
#[derive(Clone, Debug, Default)]
pub struct StartRequest {
    pub category: String,
    pub url: String,
    pub token: Option<String>,
    pub filename: Option<String>,
    /// Request path that accepted the download, kept for logs.
    pub route: String,
}

/// Accepts downloads and runs each one on its own detached task.
pub struct Downloads {
    destinations: Arc<DestinationRegistry>,
    tasks: Arc<TaskRegistry>,
    transfer: Arc<dyn Transfer>,
    seq: AtomicU64,
}

impl Downloads {
    pub fn new(
        destinations: Arc<DestinationRegistry>,
        tasks: Arc<TaskRegistry>,
        transfer: Arc<dyn Transfer>,
    ) -> Self {
        Self {
            destinations,
            tasks,
            transfer,
            seq: AtomicU64::new(0),
        }
    }

    pub fn destinations(&self) -> &DestinationRegistry {
        &self.destinations
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    pub fn status(&self, id: &str) -> Option<DownloadTask> {
        self.tasks.get(id)
    }

    /// Register a `downloading` task and spawn its transfer. Returns the task
    /// id without waiting on any network I/O; must be called inside a tokio
    /// runtime.
    pub fn start(&self, req: StartRequest) -> String {
        let id = self.next_task_id();
        self.tasks.register(&id);
        info!(
            task_id = %id,
            route = %req.route,
            category = %req.category,
            url = %redact_url_for_logs(&req.url),
            "download accepted"
        );

        let job = Job {
            id: id.clone(),
            req,
            destinations: Arc::clone(&self.destinations),
            transfer: Arc::clone(&self.transfer),
        };
        let tasks = Arc::clone(&self.tasks);
        let task_id = id.clone();
        tokio::spawn(async move {
            let started = Instant::now();
            let outcome = match tokio::spawn(job.run()).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(task_id = %task_id, "download task aborted: {err}");
                    DownloadTask::failed(format!("download task aborted: {err}"))
                }
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match outcome.status {
                TaskStatus::Success => {
                    info!(task_id = %task_id, dest = %outcome.detail, elapsed_ms, "download finished")
                }
                _ => {
                    warn!(task_id = %task_id, detail = %outcome.detail, elapsed_ms, "download failed")
                }
            }
            tasks.finish(&task_id, outcome);
        });
        id
    }

    fn next_task_id(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("task-{millis}-{seq}")
    }
}

struct Job {
    id: String,
    req: StartRequest,
    destinations: Arc<DestinationRegistry>,
    transfer: Arc<dyn Transfer>,
}

impl Job {
    async fn run(self) -> DownloadTask {
        let Job {
            id,
            req,
            destinations,
            transfer,
        } = self;

        let Some(dir) = destinations.resolve(&req.category).map(PathBuf::from) else {
            return DownloadTask::failed(format!("Unsupported model type: {}", req.category));
        };
        if let Err(err) = fs::create_dir_all(&dir).await {
            error!(task_id = %id, dir = %dir.display(), "destination dir create failed: {err}");
            return DownloadTask::failed(err.to_string());
        }

        let filename = req
            .filename
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| filename_from_url(&req.url));
        let resolved =
            tokio::task::spawn_blocking(move || resolve_within(&dir, &filename)).await;
        let dest = match resolved {
            Ok(Ok(dest)) => dest,
            Ok(Err(err)) => {
                warn!(task_id = %id, "rejected destination: {err}");
                return DownloadTask::failed(err.to_string());
            }
            Err(err) => return DownloadTask::failed(format!("path check aborted: {err}")),
        };

        match transfer
            .fetch(&req.url, &dest, req.token.as_deref())
            .await
        {
            Ok(bytes) => {
                info!(task_id = %id, bytes, "download stored");
                DownloadTask::success(dest.display().to_string())
            }
            Err(err) => DownloadTask::failed(err.to_string()),
        }
    }
}

/// Strip credentials and query strings before a URL reaches the logs.
fn redact_url_for_logs(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) => {
            let _ = parsed.set_username("");
            let _ = parsed.set_password(None);
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => raw.split(['?', '#']).next().unwrap_or_default().to_string(),
    }
}

use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Downloading,
    Success,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskStatus::Downloading)
    }
}

/// Snapshot of one download as served by `/download/status`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct DownloadTask {
    pub status: TaskStatus,
    pub detail: String,
}

impl DownloadTask {
    pub fn downloading() -> Self {
        Self {
            status: TaskStatus::Downloading,
            detail: String::new(),
        }
    }

    pub fn success(detail: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Success,
            detail: detail.into(),
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Failed,
            detail: detail.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TaskCounts {
    pub downloading: usize,
    pub success: usize,
    pub failed: usize,
}

#[derive(Default)]
struct Inner {
    tasks: HashMap<String, DownloadTask>,
    finished: VecDeque<String>,
}

/// Every download the process has accepted, keyed by task id.
///
/// Reads hand out clones; writers go through the same lock, so a `get` issued
/// after a completed `put` always observes it.
pub struct TaskRegistry {
    inner: Mutex<Inner>,
    max_finished: Option<NonZeroUsize>,
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TaskRegistry {
    /// `max_finished` bounds how many terminal tasks are retained; `None`
    /// keeps every task for the lifetime of the process.
    pub fn new(max_finished: Option<NonZeroUsize>) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_finished,
        }
    }

    pub fn put(&self, id: &str, task: DownloadTask) {
        let mut inner = self.inner.lock();
        self.insert_locked(&mut inner, id, task);
    }

    pub fn get(&self, id: &str) -> Option<DownloadTask> {
        self.inner.lock().tasks.get(id).cloned()
    }

    /// Record a freshly accepted download.
    pub fn register(&self, id: &str) {
        self.put(id, DownloadTask::downloading());
    }

    /// Move a task to its terminal state. Returns `false` when the task had
    /// already finished (or is unknown) and nothing was written.
    pub fn finish(&self, id: &str, outcome: DownloadTask) -> bool {
        if !outcome.status.is_terminal() {
            warn!(task_id = %id, "refusing to finish task with non-terminal status");
            return false;
        }
        let mut inner = self.inner.lock();
        let current = inner.tasks.get(id).map(|task| task.status);
        match current {
            Some(TaskStatus::Downloading) => {
                self.insert_locked(&mut inner, id, outcome);
                true
            }
            Some(status) => {
                warn!(task_id = %id, ?status, "task already finished; ignoring update");
                false
            }
            None => {
                warn!(task_id = %id, "finish for unknown task; ignoring");
                false
            }
        }
    }

    pub fn counts(&self) -> TaskCounts {
        let inner = self.inner.lock();
        inner
            .tasks
            .values()
            .fold(TaskCounts::default(), |mut acc, task| {
                match task.status {
                    TaskStatus::Downloading => acc.downloading += 1,
                    TaskStatus::Success => acc.success += 1,
                    TaskStatus::Failed => acc.failed += 1,
                }
                acc
            })
    }

    pub fn len(&self) -> usize {
        self.inner.lock().tasks.len()
    }

    fn insert_locked(&self, inner: &mut Inner, id: &str, task: DownloadTask) {
        let terminal = task.status.is_terminal();
        inner.tasks.insert(id.to_string(), task);
        if terminal && self.max_finished.is_some() {
            inner.finished.push_back(id.to_string());
            self.evict_finished(inner);
        }
    }

    fn evict_finished(&self, inner: &mut Inner) {
        let Some(max) = self.max_finished else {
            return;
        };
        while inner.finished.len() > max.get() {
            if let Some(oldest) = inner.finished.pop_front() {
                inner.tasks.remove(&oldest);
                debug!(task_id = %oldest, "evicted finished download task");
            }
        }
    }
}

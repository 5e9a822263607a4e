use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::downloads::Downloads;

/// Filesystem locations the read-only endpoints work from.
#[derive(Debug, Clone)]
pub(crate) struct HostPaths {
    pub comfy_root: PathBuf,
    pub web_root: PathBuf,
    pub log_file: PathBuf,
    pub log_tail_lines: usize,
}

#[derive(Clone)]
pub(crate) struct AppState {
    downloads: Arc<Downloads>,
    paths: Arc<HostPaths>,
}

impl AppState {
    pub fn new(downloads: Arc<Downloads>, paths: HostPaths) -> Self {
        Self {
            downloads,
            paths: Arc::new(paths),
        }
    }

    pub fn downloads(&self) -> &Downloads {
        &self.downloads
    }

    pub fn comfy_root(&self) -> &Path {
        &self.paths.comfy_root
    }

    pub fn web_root(&self) -> &Path {
        &self.paths.web_root
    }

    pub fn log_file(&self) -> &Path {
        &self.paths.log_file
    }

    pub fn log_tail_lines(&self) -> usize {
        self.paths.log_tail_lines
    }
}

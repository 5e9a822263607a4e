//! Destination path checks for downloads.
//!
//! A filename comes from the client (or from the last segment of the URL the
//! client sent), so it is untrusted. [`resolve_within`] joins it onto a
//! registered directory and only hands back a path whose canonical form still
//! lives under that directory.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("Invalid destination path")]
    Escapes,
    #[error("failed to resolve destination directory {dir}: {source}")]
    Directory {
        dir: String,
        #[source]
        source: io::Error,
    },
}

/// Filename for a download when the client did not name one: the last
/// non-empty path segment of `url`, falling back to `download-<unix secs>`.
pub fn filename_from_url(url: &str) -> String {
    let candidate = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .unwrap_or_default()
            .to_string(),
        Err(_) => raw_last_segment(url).to_string(),
    };
    let candidate = candidate.split('?').next().unwrap_or_default();
    if candidate.is_empty() {
        synthesized_name()
    } else {
        candidate.to_string()
    }
}

fn raw_last_segment(url: &str) -> &str {
    let end = url.find(|c: char| c == '?' || c == '#').unwrap_or(url.len());
    url[..end]
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

fn synthesized_name() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    format!("download-{secs}")
}

/// Resolve `filename` inside `dir` and prove containment.
///
/// `dir` must exist. The result is accepted when it equals the canonical
/// directory or has it as a component-wise ancestor.
pub fn resolve_within(dir: &Path, filename: &str) -> Result<PathBuf, SandboxError> {
    let base = dir
        .canonicalize()
        .map_err(|source| SandboxError::Directory {
            dir: dir.display().to_string(),
            source,
        })?;
    let resolved = resolve_lenient(&base.join(filename)).ok_or(SandboxError::Escapes)?;
    if resolved == base || resolved.starts_with(&base) {
        Ok(resolved)
    } else {
        Err(SandboxError::Escapes)
    }
}

/// Canonicalize as much of `path` as exists and apply the remaining
/// components lexically. Returns `None` for dangling symlinks, whose target
/// cannot be checked.
fn resolve_lenient(path: &Path) -> Option<PathBuf> {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                match resolved.canonicalize() {
                    Ok(canonical) => resolved = canonical,
                    Err(_) => {
                        let is_link = std::fs::symlink_metadata(&resolved)
                            .map(|meta| meta.file_type().is_symlink())
                            .unwrap_or(false);
                        if is_link {
                            return None;
                        }
                    }
                }
            }
        }
    }
    Some(resolved)
}

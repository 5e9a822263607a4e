use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("{0}")]
    Http(reqwest::Error),
    #[error("failed to create directory {}: {source}", dir.display())]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no data received for {0} seconds")]
    IdleTimeout(u64),
}

impl From<reqwest::Error> for TransferError {
    /// The request URL may carry credentials in its query string, and this
    /// text ends up in task details and logs.
    fn from(err: reqwest::Error) -> Self {
        TransferError::Http(err.without_url())
    }
}

/// Moves the bytes behind a URL into a local file.
///
/// `dest` has already been validated; implementations only perform I/O.
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Returns the number of bytes written.
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        bearer: Option<&str>,
    ) -> Result<u64, TransferError>;
}

pub struct HttpTransfer {
    client: reqwest::Client,
    idle_timeout: Option<Duration>,
}

impl HttpTransfer {
    pub fn new(client: reqwest::Client, idle_timeout: Option<Duration>) -> Self {
        Self {
            client,
            idle_timeout,
        }
    }
}

#[async_trait]
impl Transfer for HttpTransfer {
    async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        bearer: Option<&str>,
    ) -> Result<u64, TransferError> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| TransferError::CreateDir {
                    dir: parent.to_path_buf(),
                    source,
                })?;
        }

        let mut request = self.client.get(url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?.error_for_status()?;

        let write_err = |source| TransferError::Write {
            path: dest.to_path_buf(),
            source,
        };
        // A failure past this point leaves whatever was written on disk.
        let file = fs::File::create(dest).await.map_err(write_err)?;
        let mut file = BufWriter::new(file);
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        loop {
            let next = match self.idle_timeout {
                Some(idle) => tokio::time::timeout(idle, stream.next())
                    .await
                    .map_err(|_| TransferError::IdleTimeout(idle.as_secs()))?,
                None => stream.next().await,
            };
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk?;
            file.write_all(&chunk).await.map_err(write_err)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_err)?;
        debug!(dest = %dest.display(), bytes = written, "transfer complete");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve, test_client, unreachable_url};
    use axum::{
        body::Body,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::get,
        Router,
    };
    use bytes::Bytes;
    use futures_util::stream;
    use tempfile::tempdir;

    fn transfer(idle: Option<Duration>) -> HttpTransfer {
        HttpTransfer::new(test_client(), idle)
    }

    #[tokio::test]
    async fn streams_body_and_creates_parents() {
        let addr = serve(Router::new().route(
            "/models/foo.safetensors",
            get(|| async { "weights-weights-weights" }),
        ))
        .await;
        let tmp = tempdir().unwrap();
        let dest = tmp.path().join("nested/dir/foo.safetensors");

        let written = transfer(None)
            .fetch(&format!("http://{addr}/models/foo.safetensors"), &dest, None)
            .await
            .expect("transfer succeeds");

        assert_eq!(written, 23);
        assert_eq!(
            std::fs::read_to_string(&dest).unwrap(),
            "weights-weights-weights"
        );
    }

    #[tokio::test]
    async fn bearer_token_is_forwarded() {
        let addr = serve(Router::new().route(
            "/private.bin",
            get(|headers: HeaderMap| async move {
                match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                    Some("Bearer s3cret") => (StatusCode::OK, "ok").into_response(),
                    _ => StatusCode::UNAUTHORIZED.into_response(),
                }
            }),
        ))
        .await;
        let tmp = tempdir().unwrap();
        let url = format!("http://{addr}/private.bin");

        let denied = transfer(None)
            .fetch(&url, &tmp.path().join("a.bin"), None)
            .await
            .unwrap_err();
        assert!(denied.to_string().contains("401"), "{denied}");

        transfer(None)
            .fetch(&url, &tmp.path().join("b.bin"), Some("s3cret"))
            .await
            .expect("authorized transfer");
        assert_eq!(std::fs::read(tmp.path().join("b.bin")).unwrap(), b"ok");
    }

    #[tokio::test]
    async fn error_text_omits_query_credentials() {
        let addr = serve(Router::new().route(
            "/m.bin",
            get(|| async { StatusCode::UNAUTHORIZED }),
        ))
        .await;
        let tmp = tempdir().unwrap();
        let err = transfer(None)
            .fetch(
                &format!("http://{addr}/m.bin?token=hf_SECRET123"),
                &tmp.path().join("m.bin"),
                None,
            )
            .await
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("401"), "{text}");
        assert!(!text.contains("hf_SECRET123"), "{text}");
        assert!(!text.contains("token="), "{text}");
    }

    #[tokio::test]
    async fn http_error_status_fails_without_creating_file() {
        let addr = serve(Router::new()).await;
        let tmp = tempdir().unwrap();
        let dest = tmp.path().join("missing.bin");
        let err = transfer(None)
            .fetch(&format!("http://{addr}/missing.bin"), &dest, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Http(_)));
        assert!(err.to_string().contains("404"), "{err}");
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn unreachable_host_fails() {
        let tmp = tempdir().unwrap();
        let err = transfer(None)
            .fetch(&unreachable_url().await, &tmp.path().join("x.bin"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Http(_)));
    }

    #[tokio::test]
    async fn stalled_body_hits_idle_timeout_and_leaves_partial_file() {
        let addr = serve(Router::new().route(
            "/slow.bin",
            get(|| async {
                let body = stream::once(async { Ok::<_, std::io::Error>(Bytes::from_static(b"head")) })
                    .chain(stream::pending());
                Body::from_stream(body)
            }),
        ))
        .await;
        let tmp = tempdir().unwrap();
        let dest = tmp.path().join("slow.bin");
        let err = transfer(Some(Duration::from_millis(200)))
            .fetch(&format!("http://{addr}/slow.bin"), &dest, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::IdleTimeout(_)));
        assert!(dest.exists());
    }

    #[tokio::test]
    async fn parent_that_is_a_file_reports_create_dir() {
        let addr = serve(Router::new().route("/a.bin", get(|| async { "a" }))).await;
        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join("blocker"), b"x").unwrap();
        let err = transfer(None)
            .fetch(
                &format!("http://{addr}/a.bin"),
                &tmp.path().join("blocker/a.bin"),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::CreateDir { .. }), "{err}");
    }
}

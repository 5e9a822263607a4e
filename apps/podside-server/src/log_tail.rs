use std::path::Path;

use tracing::debug;

/// Last `limit` lines of the file at `path`. `\r\n` and bare `\r` count as
/// line breaks and come back as `\n`; bytes that are not UTF-8 are dropped.
/// Missing or unreadable files read as empty.
pub async fn tail(path: &Path, limit: usize) -> String {
    match tokio::fs::read(path).await {
        Ok(bytes) => tail_lines(&normalize(&bytes), limit),
        Err(err) => {
            debug!(path = %path.display(), "log tail unavailable: {err}");
            String::new()
        }
    }
}

/// Progress bars redraw with `\r`, so each redraw is its own line here.
fn normalize(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn tail_lines(text: &str, limit: usize) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let start = lines.len().saturating_sub(limit);
    lines[start..].concat()
}

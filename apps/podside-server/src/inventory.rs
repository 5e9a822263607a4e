use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use tokio::fs;
use tracing::warn;
use utoipa::ToSchema;

use crate::downloads::DestinationRegistry;

/// What `/api/status` reports about the host install.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct HostInventory {
    pub custom_nodes: Vec<String>,
    /// Keyed by category in registry order, not alphabetically.
    #[schema(value_type = Object)]
    pub models: IndexMap<String, Vec<String>>,
    pub total_models: usize,
}

pub async fn snapshot(comfy_root: &Path, destinations: &DestinationRegistry) -> HostInventory {
    let custom_nodes = list_custom_nodes(comfy_root).await;
    let models = list_models(destinations).await;
    let total_models = models.values().map(Vec::len).sum();
    HostInventory {
        custom_nodes,
        models,
        total_models,
    }
}

/// Visible subdirectories of `<root>/custom_nodes`, sorted.
pub async fn list_custom_nodes(comfy_root: &Path) -> Vec<String> {
    let dir = comfy_root.join("custom_nodes");
    let mut names = list_entries(&dir, EntryKind::Dir).await;
    names.retain(|name| !name.starts_with('.'));
    names
}

/// Sorted file names per category; categories with no files are left out.
pub async fn list_models(destinations: &DestinationRegistry) -> IndexMap<String, Vec<String>> {
    let mut out = IndexMap::new();
    for dest in destinations.iter() {
        let files = list_entries(&dest.dir, EntryKind::File).await;
        if !files.is_empty() {
            out.insert(dest.key.clone(), files);
        }
    }
    out
}

#[derive(Clone, Copy)]
enum EntryKind {
    Dir,
    File,
}

async fn list_entries(dir: &Path, kind: EntryKind) -> Vec<String> {
    let mut reader = match fs::read_dir(dir).await {
        Ok(reader) => reader,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            warn!(dir = %dir.display(), "read_dir failed: {err}");
            return Vec::new();
        }
    };
    let mut names = Vec::new();
    loop {
        let entry = match reader.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => {
                warn!(dir = %dir.display(), "read_dir entry failed: {err}");
                break;
            }
        };
        // Follow symlinks so linked model folders count like real ones.
        let Ok(meta) = fs::metadata(entry.path()).await else {
            continue;
        };
        let wanted = match kind {
            EntryKind::Dir => meta.is_dir(),
            EntryKind::File => meta.is_file(),
        };
        if wanted {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_root_is_empty() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("absent");
        let inv = snapshot(&root, &DestinationRegistry::from_root(&root)).await;
        assert_eq!(inv, HostInventory::default());
    }

    #[tokio::test]
    async fn lists_nodes_and_models() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        for dir in [
            "custom_nodes/zeta",
            "custom_nodes/alpha",
            "custom_nodes/.git",
            "models/loras/nested",
            "models/vae",
        ] {
            std::fs::create_dir_all(root.join(dir)).unwrap();
        }
        std::fs::write(root.join("custom_nodes/readme.txt"), b"x").unwrap();
        std::fs::write(root.join("models/loras/b.safetensors"), b"x").unwrap();
        std::fs::write(root.join("models/loras/a.safetensors"), b"x").unwrap();
        std::fs::write(root.join("models/checkpoints.txt"), b"x").unwrap();

        let inv = snapshot(root, &DestinationRegistry::from_root(root)).await;
        assert_eq!(inv.custom_nodes, vec!["alpha", "zeta"]);
        assert_eq!(inv.models.len(), 1, "empty categories are omitted");
        assert_eq!(
            inv.models["models/loras"],
            vec!["a.safetensors", "b.safetensors"]
        );
        assert_eq!(inv.total_models, 2);

        let value = serde_json::to_value(&inv).unwrap();
        assert_eq!(value["total_models"], 2);
        assert_eq!(value["custom_nodes"][0], "alpha");
    }

    #[tokio::test]
    async fn categories_keep_registry_order() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        for key in ["models/ipadapter", "models/clip", "models/vae", "models/checkpoints"] {
            std::fs::create_dir_all(root.join(key)).unwrap();
            std::fs::write(root.join(key).join("m.safetensors"), b"x").unwrap();
        }

        let inv = snapshot(root, &DestinationRegistry::from_root(root)).await;
        let keys: Vec<&str> = inv.models.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["models/checkpoints", "models/vae", "models/clip", "models/ipadapter"]
        );

        let body = serde_json::to_string(&inv).unwrap();
        let pos = |key: &str| body.find(key).unwrap();
        assert!(pos("models/checkpoints") < pos("models/vae"));
        assert!(pos("models/vae") < pos("models/clip"));
        assert!(pos("models/clip") < pos("models/ipadapter"));
    }
}

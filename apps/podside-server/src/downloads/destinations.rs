use std::path::{Path, PathBuf};

/// Categories the UI can download into, relative to the application root.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "models/checkpoints",
    "models/vae",
    "models/unet",
    "models/diffusion_models",
    "models/text_encoders",
    "models/loras",
    "models/upscale_models",
    "models/clip",
    "models/controlnet",
    "models/clip_vision",
    "models/ipadapter",
];

#[derive(Clone, Debug)]
pub struct Destination {
    pub key: String,
    pub dir: PathBuf,
}

/// Allow-list of download directories keyed by category. Built once at
/// startup and never mutated afterwards.
#[derive(Clone, Debug, Default)]
pub struct DestinationRegistry {
    entries: Vec<Destination>,
}

impl DestinationRegistry {
    /// Registry for the default categories under `root`.
    pub fn from_root(root: &Path) -> Self {
        let entries = DEFAULT_CATEGORIES
            .iter()
            .map(|key| Destination {
                key: (*key).to_string(),
                dir: root.join(key),
            })
            .collect();
        Self { entries }
    }

    pub fn resolve(&self, key: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.dir.as_path())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.resolve(key).is_some()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Destination> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

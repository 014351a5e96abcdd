//! Asset manifest: the scene declares what it needs during `preload`, the
//! runtime loads the files afterward. Keys are scene-chosen names ("bg",
//! "star", ...); paths are relative to the working directory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Embedded copy of the placeholder texture. Disk load failures fall back to
/// this so the game always has something to draw.
pub const FALLBACK_TEXTURE_BYTES: &[u8] =
    include_bytes!("../../../assets/textures/placeholder.png");

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    SpriteSheet { frame_width: u32, frame_height: u32 },
    Audio,
}

#[derive(Debug, Clone)]
pub struct AssetEntry {
    pub key: String,
    pub path: PathBuf,
    pub kind: AssetKind,
}

#[derive(Debug, Default)]
pub struct AssetManifest {
    entries: Vec<AssetEntry>,
    by_key: HashMap<String, usize>,
}

impl AssetManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_image(&mut self, key: &str, path: impl Into<PathBuf>) {
        self.add(key, path.into(), AssetKind::Image);
    }

    pub fn add_sprite_sheet(
        &mut self,
        key: &str,
        path: impl Into<PathBuf>,
        frame_width: u32,
        frame_height: u32,
    ) {
        self.add(
            key,
            path.into(),
            AssetKind::SpriteSheet {
                frame_width,
                frame_height,
            },
        );
    }

    pub fn add_audio(&mut self, key: &str, path: impl Into<PathBuf>) {
        self.add(key, path.into(), AssetKind::Audio);
    }

    /// Re-registering a key replaces the earlier entry. Scenes register each
    /// key once; a replacement is almost certainly a typo, so it is logged.
    fn add(&mut self, key: &str, path: PathBuf, kind: AssetKind) {
        if let Some(&index) = self.by_key.get(key) {
            log::warn!("Asset key '{key}' registered twice; replacing earlier entry");
            self.entries[index] = AssetEntry {
                key: key.to_string(),
                path,
                kind,
            };
            return;
        }
        self.by_key.insert(key.to_string(), self.entries.len());
        self.entries.push(AssetEntry {
            key: key.to_string(),
            path,
            kind,
        });
    }

    pub fn get(&self, key: &str) -> Option<&AssetEntry> {
        self.by_key.get(key).map(|&index| &self.entries[index])
    }

    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }
}

pub fn load_bytes(path: &Path) -> Result<Vec<u8>, String> {
    fs::read(path).map_err(|e| format!("Failed to read asset {}: {e}", path.display()))
}

/// Read an image asset's bytes, falling back to the embedded placeholder when
/// the file is missing or unreadable.
pub fn load_image_bytes_or_fallback(path: &Path) -> Vec<u8> {
    match load_bytes(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("{err}. Using embedded placeholder texture.");
            FALLBACK_TEXTURE_BYTES.to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_stores_entries_in_registration_order() {
        let mut manifest = AssetManifest::new();
        manifest.add_image("bg", "assets/textures/placeholder.png");
        manifest.add_sprite_sheet("player", "assets/textures/placeholder.png", 48, 48);
        manifest.add_audio("hit", "assets/audio/hit.wav");

        let keys: Vec<&str> = manifest.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["bg", "player", "hit"]);
        assert_eq!(
            manifest.get("player").map(|e| &e.kind),
            Some(&AssetKind::SpriteSheet {
                frame_width: 48,
                frame_height: 48
            })
        );
        assert!(manifest.get("missing").is_none());
    }

    #[test]
    fn duplicate_key_replaces_earlier_entry() {
        let mut manifest = AssetManifest::new();
        manifest.add_image("bg", "a.png");
        manifest.add_image("bg", "b.png");
        assert_eq!(manifest.entries().len(), 1);
        assert_eq!(manifest.get("bg").map(|e| e.path.as_path()), Some(Path::new("b.png")));
    }

    #[test]
    fn missing_image_falls_back_to_embedded_placeholder() {
        let bytes = load_image_bytes_or_fallback(Path::new("does/not/exist.png"));
        assert_eq!(bytes, FALLBACK_TEXTURE_BYTES);
    }
}

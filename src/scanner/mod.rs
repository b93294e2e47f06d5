//! Directory scanner that builds the viewer's item collection.
//!
//! - Walks a directory with walkdir (optionally recursive, depth-limited)
//! - Keeps files whose extension maps to a `MediaKind`
//! - Sorts by path so indices are stable between runs
//! - Dimensions are left unresolved; the resolve queue fills them in lazily

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::models::{MediaItem, MediaKind};

/// Configuration for the directory scanner.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to scan directories recursively.
    pub recursive: bool,
    /// Maximum directory depth (0 = unlimited).
    pub max_depth: usize,
    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            max_depth: 0,
            follow_symlinks: false,
        }
    }
}

/// Collect every media file under `dir`, sorted by path.
pub fn scan_directory(dir: &Path, config: &ScanConfig) -> Result<Vec<MediaItem>> {
    let meta = std::fs::metadata(dir).with_context(|| format!("Failed to open {:?}", dir))?;
    if !meta.is_dir() {
        bail!("Not a directory: {:?}", dir);
    }

    info!("Starting scan of {:?}", dir);

    let mut walker = WalkDir::new(dir).follow_links(config.follow_symlinks);
    if !config.recursive {
        walker = walker.max_depth(1);
    } else if config.max_depth > 0 {
        walker = walker.max_depth(config.max_depth);
    }

    let mut items = Vec::new();
    let mut skipped = 0usize;

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.into_path();
        match MediaKind::from_path(&path) {
            Some(kind) => items.push(MediaItem::new(path, kind)),
            None => skipped += 1,
        }
    }

    items.sort_by(|a, b| a.source.cmp(&b.source));

    debug!(skipped, "Ignored non-media files");
    info!("Discovered {} media files", items.len());
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn create_test_image(path: &Path) {
        image::RgbImage::new(3, 2).save(path).unwrap();
    }

    #[test]
    fn test_scan_config_default() {
        let config = ScanConfig::default();
        assert!(config.recursive);
        assert_eq!(config.max_depth, 0);
        assert!(!config.follow_symlinks);
    }

    #[test]
    fn test_scan_empty_dir() {
        let dir = tempdir().unwrap();
        let items = scan_directory(dir.path(), &ScanConfig::default()).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = tempdir().unwrap();
        create_test_image(&dir.path().join("b.png"));
        create_test_image(&dir.path().join("a.png"));
        File::create(dir.path().join("clip.mp4")).unwrap();
        File::create(dir.path().join("notes.txt")).unwrap();

        let items = scan_directory(dir.path(), &ScanConfig::default()).unwrap();
        let names: Vec<_> = items
            .iter()
            .map(|i| i.source.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png", "clip.mp4"]);
        assert_eq!(items[2].kind, MediaKind::Video);
        assert!(items.iter().all(|i| i.dimensions.is_none()));
    }

    #[test]
    fn test_scan_recursive() {
        let dir = tempdir().unwrap();
        let subdir = dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        create_test_image(&dir.path().join("root.png"));
        create_test_image(&subdir.join("nested.png"));

        let config = ScanConfig {
            recursive: true,
            ..Default::default()
        };
        assert_eq!(scan_directory(dir.path(), &config).unwrap().len(), 2);

        let config = ScanConfig {
            recursive: false,
            ..Default::default()
        };
        assert_eq!(scan_directory(dir.path(), &config).unwrap().len(), 1);
    }

    #[test]
    fn test_scan_missing_dir_errors() {
        let dir = tempdir().unwrap();
        let err = scan_directory(&dir.path().join("nope"), &ScanConfig::default()).unwrap_err();
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn test_keys_are_stable_across_scans() {
        let dir = tempdir().unwrap();
        create_test_image(&dir.path().join("x.png"));
        let first = scan_directory(dir.path(), &ScanConfig::default()).unwrap();
        let second = scan_directory(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(first[0].key, second[0].key);
    }
}

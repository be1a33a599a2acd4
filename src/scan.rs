//! Asset directory scanning.
//!
//! Walks the asset root recursively and returns one [`ImageRecord`] per file
//! whose extension is on the configured allow-list. Directories named in
//! `exclude_dirs` are never descended into.
//!
//! ```text
//! dist/assets/                 # Asset root
//! ├── street/
//! │   ├── 001.jpg              # → "street/001.jpg"
//! │   └── notes.txt            # ignored (extension)
//! ├── node_modules/            # ignored (excluded dir)
//! └── cover.PNG                # → "cover.PNG"
//! ```
//!
//! ## Failure Model
//!
//! Scanning never fails as a whole. A missing root or an unreadable
//! subdirectory is logged and contributes zero images; everything collected
//! elsewhere is still returned.
//!
//! ## Ordering
//!
//! Entries are visited in file-name order within each directory, so repeated
//! scans of an unchanged tree return records in the same order.

use crate::config::GalleryConfig;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// One image discovered under the asset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// File name including extension.
    pub name: String,
    /// Path relative to the asset root, always with forward slashes.
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
}

impl ImageRecord {
    /// File name without its extension, used as alt text.
    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name)
    }
}

/// Scan `root` for images. See the module docs for the failure model.
pub fn scan_images(root: &Path, config: &GalleryConfig) -> Vec<ImageRecord> {
    let mut images = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !config.is_excluded_dir(&entry.file_name().to_string_lossy())
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let dir = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                warn!("Failed to scan {}: {}", dir, e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !config.is_image_path(entry.path()) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Failed to read metadata for {}: {}", entry.path().display(), e);
                continue;
            }
        };

        let modified_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_default();

        images.push(ImageRecord {
            name: entry.file_name().to_string_lossy().to_string(),
            relative_path: relative_slash_path(entry.path(), root),
            absolute_path: entry.path().to_path_buf(),
            size_bytes: metadata.len(),
            modified_at,
        });
    }

    images
}

/// Express `path` relative to `root` with `/` separators on every platform.
fn relative_slash_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_images_recursively() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a.jpg", "x");
        write_file(tmp.path(), "street/b.png", "xx");
        write_file(tmp.path(), "street/night/c.webp", "xxx");

        let images = scan_images(tmp.path(), &GalleryConfig::default());
        assert_eq!(
            relative_paths(&images),
            vec!["a.jpg", "street/b.png", "street/night/c.webp"]
        );
    }

    #[test]
    fn ignores_non_image_extensions() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a.jpg", "x");
        write_file(tmp.path(), "notes.txt", "x");
        write_file(tmp.path(), "raw.tiff", "x");
        write_file(tmp.path(), "noext", "x");

        let images = scan_images(tmp.path(), &GalleryConfig::default());
        assert_eq!(relative_paths(&images), vec!["a.jpg"]);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "A.JPG", "x");
        write_file(tmp.path(), "b.Jpeg", "x");
        write_file(tmp.path(), "c.GIF", "x");

        let images = scan_images(tmp.path(), &GalleryConfig::default());
        assert_eq!(images.len(), 3);
    }

    #[test]
    fn skips_excluded_directories() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "keep/a.jpg", "x");
        write_file(tmp.path(), "__MACOSX/a.jpg", "x");
        write_file(tmp.path(), "node_modules/pkg/b.png", "x");
        write_file(tmp.path(), "keep/node_modules/c.png", "x");

        let images = scan_images(tmp.path(), &GalleryConfig::default());
        assert_eq!(relative_paths(&images), vec!["keep/a.jpg"]);
    }

    #[test]
    fn excluded_name_as_file_is_still_considered() {
        // Exclusion applies to directories only.
        let tmp = TempDir::new().unwrap();
        let config = GalleryConfig {
            exclude_dirs: vec!["skip.jpg".to_string()],
            ..GalleryConfig::default()
        };
        write_file(tmp.path(), "skip.jpg", "x");

        let images = scan_images(tmp.path(), &config);
        assert_eq!(images.len(), 1);
    }

    #[test]
    fn missing_root_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let images = scan_images(&tmp.path().join("nope"), &GalleryConfig::default());
        assert!(images.is_empty());
    }

    #[test]
    fn record_fields_populated() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "trip/dawn.jpg", "12345");

        let images = scan_images(tmp.path(), &GalleryConfig::default());
        let image = &images[0];
        assert_eq!(image.name, "dawn.jpg");
        assert_eq!(image.stem(), "dawn");
        assert_eq!(image.relative_path, "trip/dawn.jpg");
        assert_eq!(image.absolute_path, tmp.path().join("trip").join("dawn.jpg"));
        assert_eq!(image.size_bytes, 5);
        assert!(image.modified_at.timestamp() > 0);
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a/b/c/d.jpg", "x");

        let images = scan_images(tmp.path(), &GalleryConfig::default());
        assert_eq!(images[0].relative_path, "a/b/c/d.jpg");
        assert!(!images[0].relative_path.contains('\\'));
    }

    #[test]
    fn repeated_scans_have_same_order() {
        let tmp = TempDir::new().unwrap();
        for name in ["z.jpg", "m.jpg", "a.jpg", "sub/q.jpg"] {
            write_file(tmp.path(), name, "x");
        }
        let config = GalleryConfig::default();
        let first_scan = scan_images(tmp.path(), &config);
        let first = relative_paths(&first_scan);
        let second_scan = scan_images(tmp.path(), &config);
        let second = relative_paths(&second_scan);
        assert_eq!(first, second);
        assert_eq!(first, vec!["a.jpg", "m.jpg", "sub/q.jpg", "z.jpg"]);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_contributes_nothing() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "ok.jpg", "x");
        write_file(tmp.path(), "locked/hidden.jpg", "x");
        let locked = tmp.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Running as root ignores permission bits; only assert what always holds.
        let images = scan_images(tmp.path(), &GalleryConfig::default());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(relative_paths(&images).contains(&"ok.jpg"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycle_does_not_hang() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "loop/a.jpg", "x");
        std::os::unix::fs::symlink(tmp.path(), tmp.path().join("loop/back")).unwrap();

        let images = scan_images(tmp.path(), &GalleryConfig::default());
        assert_eq!(relative_paths(&images), vec!["loop/a.jpg"]);
    }
}

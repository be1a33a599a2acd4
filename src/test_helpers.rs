//! Shared test utilities for the folio-gal test suite.
//!
//! Provides a throwaway project layout (asset directory plus a root page with
//! splice markers), small file helpers, and in-memory `ImageRecord` builders
//! for renderer tests that should not touch the filesystem.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let project = setup_project(20);          // dist/assets/img_000.jpg … img_019.jpg
//! update_gallery(project.path(), &GalleryConfig::default()).unwrap();
//! assert!(read(project.path(), "index.html").contains("img_000.jpg"));
//! ```

use crate::scan::ImageRecord;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Fixture setup
// =========================================================================

/// Root page content before (and including) the default start marker.
pub const INDEX_HEAD: &str =
    "<!DOCTYPE html>\n<html>\n<body>\n  <h1>Portfolio</h1>\n        <div class=\"flex flex-wrap w-full\">";

/// Root page content from the default end marker onwards.
pub const INDEX_TAIL: &str = "  <!-- Footer -->\n  <footer>hand written</footer>\n</body>\n</html>\n";

/// Create a project with `image_count` images in `dist/assets` and a root
/// page carrying the default markers.
///
/// Images are named `img_000.jpg`, `img_001.jpg`, … and contain 4 bytes.
pub fn setup_project(image_count: usize) -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("dist/assets")).unwrap();
    for i in 0..image_count {
        write_file(tmp.path(), &format!("dist/assets/img_{i:03}.jpg"), "fake");
    }
    write_file(
        tmp.path(),
        "index.html",
        &format!("{INDEX_HEAD}\n    <p>old tiles</p>\n{INDEX_TAIL}"),
    );
    tmp
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

/// Read `root/rel` to a string. Panics with the path on failure.
pub fn read(root: &Path, rel: &str) -> String {
    let path = root.join(rel);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

// =========================================================================
// In-memory records
// =========================================================================

/// Build image records from relative paths without touching the filesystem.
pub fn records<S: AsRef<str>>(paths: &[S]) -> Vec<ImageRecord> {
    paths
        .iter()
        .map(|p| {
            let rel = p.as_ref();
            let name = rel.rsplit('/').next().unwrap_or(rel).to_string();
            ImageRecord {
                name,
                relative_path: rel.to_string(),
                absolute_path: Path::new("/assets").join(rel),
                size_bytes: 1,
                modified_at: DateTime::<Utc>::default(),
            }
        })
        .collect()
}

/// All relative paths in scan order.
pub fn relative_paths(images: &[ImageRecord]) -> Vec<&str> {
    images.iter().map(|i| i.relative_path.as_str()).collect()
}

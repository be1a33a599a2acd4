//! Gallery regeneration.
//!
//! Drives one full update of the portfolio from the asset directory:
//!
//! ```text
//! 1. check     assets_dir exists                 (fatal if not)
//! 2. scan      assets_dir → Vec<ImageRecord>     (stop quietly if empty)
//! 3. clean     delete output_dir/gallery_page_*.html
//! 4. paginate  total_pages = ceil(images / images_per_page)
//! 5. splice    page 1 → index_file between the markers
//! 6. render    pages 2..=N → output_dir/gallery_page_<n>.html
//! 7. manifest  output_dir/gallery-info.json
//! ```
//!
//! Steps 3 and 5 log their failures and the run continues. Writes in steps 6
//! and 7 propagate their I/O errors. Every run regenerates everything; with
//! unchanged inputs the splice region and page files are byte-identical and
//! the manifest differs only in `generatedAt`.

use crate::config::{GalleryConfig, SiteLayout, page_file_name};
use crate::generate;
use crate::scan::{self, ImageRecord};
use crate::splice;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

const PAGE_PREFIX: &str = "gallery_page_";
const PAGE_SUFFIX: &str = ".html";

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Asset directory does not exist: {0}")]
    MissingAssets(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// `gallery-info.json`, fully rewritten on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryManifest {
    pub total_images: usize,
    pub total_pages: usize,
    pub images_per_page: usize,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub generated_at: String,
    pub images: Vec<ManifestImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestImage {
    pub name: String,
    pub path: String,
    pub size: u64,
}

impl GalleryManifest {
    pub fn new(images: &[ImageRecord], images_per_page: usize, generated_at: DateTime<Utc>) -> Self {
        Self {
            total_images: images.len(),
            total_pages: total_pages(images.len(), images_per_page),
            images_per_page,
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            images: images
                .iter()
                .map(|img| ManifestImage {
                    name: img.name.clone(),
                    path: img.relative_path.clone(),
                    size: img.size_bytes,
                })
                .collect(),
        }
    }
}

/// What happened to the root page during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexUpdate {
    Updated,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPage {
    pub page: usize,
    pub file_name: String,
    pub image_count: usize,
}

/// Summary of a run that produced output.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub total_images: usize,
    pub total_pages: usize,
    pub images_per_page: usize,
    /// Stale page files deleted before writing, in file-name order.
    pub removed_pages: Vec<String>,
    pub index: IndexUpdate,
    pub pages: Vec<WrittenPage>,
    pub manifest_path: PathBuf,
}

#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    /// No images were found; nothing was written or deleted.
    NoImages,
    Updated(UpdateReport),
}

// ============================================================================
// Pagination
// ============================================================================

/// Number of pages needed for `total_images` at `per_page` images each.
pub fn total_pages(total_images: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    total_images.div_ceil(per_page)
}

/// Images shown on 1-based `page`. Empty past the last page.
pub fn page_slice(images: &[ImageRecord], page: usize, per_page: usize) -> &[ImageRecord] {
    if page == 0 {
        return &[];
    }
    let start = ((page - 1) * per_page).min(images.len());
    let end = (start + per_page).min(images.len());
    &images[start..end]
}

// ============================================================================
// Run
// ============================================================================

/// Regenerate the gallery for the project at `root`.
pub fn update_gallery(root: &Path, config: &GalleryConfig) -> Result<UpdateOutcome, GalleryError> {
    let layout = SiteLayout::new(root, config);
    update_gallery_at(&layout, config, Utc::now())
}

/// [`update_gallery`] with an explicit layout and manifest timestamp.
pub fn update_gallery_at(
    layout: &SiteLayout,
    config: &GalleryConfig,
    generated_at: DateTime<Utc>,
) -> Result<UpdateOutcome, GalleryError> {
    if !layout.assets_dir.is_dir() {
        return Err(GalleryError::MissingAssets(layout.assets_dir.clone()));
    }

    info!("Scanning {}", layout.assets_dir.display());
    let images = scan::scan_images(&layout.assets_dir, config);
    info!("Found {} images", images.len());

    if images.is_empty() {
        warn!("No images found in {}", layout.assets_dir.display());
        return Ok(UpdateOutcome::NoImages);
    }

    let removed_pages = remove_stale_pages(&layout.output_dir);

    let per_page = config.images_per_page;
    let pages_total = total_pages(images.len(), per_page);
    info!(
        "Generating {} pages ({} images per page)",
        pages_total, per_page
    );

    let index = match update_index(layout, config, page_slice(&images, 1, per_page), pages_total) {
        Ok(()) => {
            info!("Updated {}", layout.index_path.display());
            IndexUpdate::Updated
        }
        Err(reason) => {
            error!("Root page not updated: {}", reason);
            IndexUpdate::Failed(reason)
        }
    };

    let mut pages = Vec::new();
    if pages_total > 1 {
        fs::create_dir_all(&layout.output_dir)?;
    }
    for page in 2..=pages_total {
        let page_images = page_slice(&images, page, per_page);
        let html = generate::render_page(page_images, page, pages_total, &config.site, layout);
        let file_name = page_file_name(page);
        fs::write(layout.output_dir.join(&file_name), html.into_string())?;
        info!("Wrote {} ({} images)", file_name, page_images.len());
        pages.push(WrittenPage {
            page,
            file_name,
            image_count: page_images.len(),
        });
    }

    let manifest = GalleryManifest::new(&images, per_page, generated_at);
    write_manifest(&layout.manifest_path, &manifest)?;
    info!("Wrote {}", layout.manifest_path.display());

    Ok(UpdateOutcome::Updated(UpdateReport {
        total_images: images.len(),
        total_pages: pages_total,
        images_per_page: per_page,
        removed_pages,
        index,
        pages,
        manifest_path: layout.manifest_path.clone(),
    }))
}

/// Whether `name` is a generated page file, `gallery_page_<digits>.html`.
pub fn is_page_file(name: &str) -> bool {
    name.strip_prefix(PAGE_PREFIX)
        .and_then(|rest| rest.strip_suffix(PAGE_SUFFIX))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Delete every generated page file in `output_dir`. Failures are logged.
fn remove_stale_pages(output_dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Failed to list {}: {}", output_dir.display(), e);
            return Vec::new();
        }
    };

    let mut stale: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| is_page_file(name))
        .collect();
    stale.sort();

    let mut removed = Vec::new();
    for name in stale {
        match fs::remove_file(output_dir.join(&name)) {
            Ok(()) => {
                info!("Removed stale page {}", name);
                removed.push(name);
            }
            Err(e) => error!("Failed to remove {}: {}", name, e),
        }
    }
    removed
}

/// Splice page 1 into the root page. Errors come back as a loggable reason.
fn update_index(
    layout: &SiteLayout,
    config: &GalleryConfig,
    first_page: &[ImageRecord],
    pages_total: usize,
) -> Result<(), String> {
    let content = fs::read_to_string(&layout.index_path)
        .map_err(|e| format!("failed to read {}: {}", layout.index_path.display(), e))?;

    let region = generate::render_index_region(first_page, pages_total, &config.splice.trailer, layout);
    let updated = splice::replace_region(
        &content,
        &config.splice.start_marker,
        &config.splice.end_marker,
        &region,
    )
    .map_err(|e| e.to_string())?;

    fs::write(&layout.index_path, updated)
        .map_err(|e| format!("failed to write {}: {}", layout.index_path.display(), e))
}

fn write_manifest(path: &Path, manifest: &GalleryManifest) -> Result<(), GalleryError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(manifest)?;
    fs::write(path, json)?;
    Ok(())
}

//! CLI output formatting for update and raw-sync results.
//!
//! Diagnostics during a run go through `tracing`; this module only renders
//! the final summary a user reads after a command completes.
//!
//! # Output Format
//!
//! ## Update
//!
//! ```text
//! Root → index.html (16 images)
//! Pages
//! 002 → dist/gallery_page_2.html (16 images)
//! 003 → dist/gallery_page_3.html (1 image)
//! Removed
//!     dist/gallery_page_4.html
//! Manifest → dist/gallery-info.json
//!
//! Updated 33 images across 3 pages (16 per page)
//! ```
//!
//! ## Raw sync
//!
//! ```text
//! Comparisons
//! 001 dog
//!     Before: assets/raw/dog_before.jpg
//!     After: assets/raw/dog_after.jpg
//!     Pan: https://example.com/pan
//!
//! Wrote 1 comparison
//! ```
//!
//! # Architecture
//!
//! Each result has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::config::SiteLayout;
use crate::gallery::{IndexUpdate, UpdateOutcome, UpdateReport};
use crate::raw::RawComparisonManifest;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Display `path` relative to `root` when it lives under it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ============================================================================
// Update
// ============================================================================

pub fn format_update_outcome(outcome: &UpdateOutcome, layout: &SiteLayout) -> Vec<String> {
    match outcome {
        UpdateOutcome::NoImages => vec![format!(
            "No images found in {}, nothing updated",
            display_path(&layout.assets_dir, &layout.root)
        )],
        UpdateOutcome::Updated(report) => format_update_report(report, layout),
    }
}

pub fn format_update_report(report: &UpdateReport, layout: &SiteLayout) -> Vec<String> {
    let mut lines = Vec::new();
    let index = display_path(&layout.index_path, &layout.root);
    let first_page = report.total_images.min(report.images_per_page);

    match &report.index {
        IndexUpdate::Updated => lines.push(format!(
            "Root → {} ({})",
            index,
            plural(first_page, "image")
        )),
        IndexUpdate::Failed(reason) => {
            lines.push(format!("Root → {} (not updated)", index));
            lines.push(format!("{}{}", indent(1), reason));
        }
    }

    if !report.pages.is_empty() {
        lines.push("Pages".to_string());
        for page in &report.pages {
            lines.push(format!(
                "{} → {} ({})",
                format_index(page.page),
                display_path(&layout.output_dir.join(&page.file_name), &layout.root),
                plural(page.image_count, "image")
            ));
        }
    }

    if !report.removed_pages.is_empty() {
        lines.push("Removed".to_string());
        for name in &report.removed_pages {
            lines.push(format!(
                "{}{}",
                indent(1),
                display_path(&layout.output_dir.join(name), &layout.root)
            ));
        }
    }

    lines.push(format!(
        "Manifest → {}",
        display_path(&report.manifest_path, &layout.root)
    ));
    lines.push(String::new());
    lines.push(format!(
        "Updated {} across {} ({} per page)",
        plural(report.total_images, "image"),
        plural(report.total_pages, "page"),
        report.images_per_page
    ));

    lines
}

pub fn print_update_outcome(outcome: &UpdateOutcome, layout: &SiteLayout) {
    for line in format_update_outcome(outcome, layout) {
        println!("{}", line);
    }
}

// ============================================================================
// Raw sync
// ============================================================================

pub fn format_raw_manifest(manifest: &RawComparisonManifest) -> Vec<String> {
    let mut lines = Vec::new();

    if !manifest.raw_comparisons.is_empty() {
        lines.push("Comparisons".to_string());
        for entry in &manifest.raw_comparisons {
            lines.push(format!("{} {}", format_index(entry.id), entry.title));
            lines.push(format!("{}Before: {}", indent(1), entry.before));
            lines.push(format!("{}After: {}", indent(1), entry.after));
            if !entry.pan_url.is_empty() {
                lines.push(format!("{}Pan: {}", indent(1), entry.pan_url));
            }
        }
        lines.push(String::new());
    }

    lines.push(format!(
        "Wrote {}",
        plural(manifest.raw_comparisons.len(), "comparison")
    ));
    lines
}

pub fn print_raw_manifest(manifest: &RawComparisonManifest) {
    for line in format_raw_manifest(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

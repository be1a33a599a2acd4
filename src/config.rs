//! Project configuration module.
//!
//! Handles loading and validating `folio.toml`. Every setting has a stock
//! default, so the file is optional and sparse: it only needs the keys it
//! wants to override.
//!
//! ## Config File Location
//!
//! `folio.toml` lives in the project root (the `--root` directory). All paths
//! inside it are resolved relative to that root:
//!
//! ```text
//! project/
//! ├── folio.toml              # Optional overrides
//! ├── index.html              # Hand-maintained root page (splice target)
//! └── dist/
//!     ├── assets/             # Asset root, scanned recursively
//!     │   └── raw/            # Before/after comparison pairs
//!     ├── gallery_page_2.html # Generated
//!     └── gallery-info.json   # Generated
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! assets_dir = "dist/assets"
//! output_dir = "dist"
//! index_file = "index.html"
//! manifest_file = "gallery-info.json"
//! images_per_page = 16
//! extensions = ["jpg", "jpeg", "png", "gif", "webp"]
//! exclude_dirs = ["__MACOSX", ".DS_Store", "node_modules"]
//!
//! [splice]
//! start_marker = '<div class="flex flex-wrap w-full">'
//! end_marker = "  <!-- Footer -->"
//! trailer = "        </div>\n      </div>\n    </section>\n  </div>\n"
//!
//! [watch]
//! delay_ms = 1000
//!
//! [raw]
//! dir = "dist/assets/raw"
//! manifest_file = "raw-config.json"
//! url_prefix = "assets/raw"
//!
//! [site]
//! name = "XING"
//! tagline = "Welcome to my view of the world"
//! contact_email = ""
//! copyright = "Developed and Designed by Xing."
//! about_href = "about_me.html"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE: &str = "folio.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `folio.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Asset root scanned for images, relative to the project root.
    pub assets_dir: String,
    /// Directory receiving page files and the gallery manifest.
    pub output_dir: String,
    /// Root page whose marker-delimited region holds page 1.
    pub index_file: String,
    /// Gallery manifest file name inside `output_dir`.
    pub manifest_file: String,
    pub images_per_page: usize,
    /// Image extensions, without the leading dot. Compared case-insensitively.
    pub extensions: Vec<String>,
    /// Directory names skipped while scanning.
    pub exclude_dirs: Vec<String>,
    pub splice: SpliceConfig,
    pub watch: WatchConfig,
    pub raw: RawConfig,
    pub site: SiteInfo,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            assets_dir: "dist/assets".to_string(),
            output_dir: "dist".to_string(),
            index_file: "index.html".to_string(),
            manifest_file: "gallery-info.json".to_string(),
            images_per_page: 16,
            extensions: ["jpg", "jpeg", "png", "gif", "webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_dirs: ["__MACOSX", ".DS_Store", "node_modules"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            splice: SpliceConfig::default(),
            watch: WatchConfig::default(),
            raw: RawConfig::default(),
            site: SiteInfo::default(),
        }
    }
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images_per_page == 0 {
            return Err(ConfigError::Validation(
                "images_per_page must be greater than 0".into(),
            ));
        }
        if self.watch.delay_ms == 0 {
            return Err(ConfigError::Validation(
                "watch.delay_ms must be greater than 0".into(),
            ));
        }
        if self.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "extensions must not be empty".into(),
            ));
        }
        if self.splice.start_marker.is_empty() || self.splice.end_marker.is_empty() {
            return Err(ConfigError::Validation(
                "splice markers must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Whether `path` carries one of the configured image extensions.
    pub fn is_image_path(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(&ext))
            })
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }

    pub fn watch_delay(&self) -> Duration {
        Duration::from_millis(self.watch.delay_ms)
    }
}

/// Literal markers delimiting the generated region of the root page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpliceConfig {
    pub start_marker: String,
    pub end_marker: String,
    /// Markup written after the generated tiles and pagination, closing the
    /// elements the start marker opened and the end marker no longer sees.
    pub trailer: String,
}

impl Default for SpliceConfig {
    fn default() -> Self {
        Self {
            start_marker: r#"<div class="flex flex-wrap w-full">"#.to_string(),
            end_marker: "  <!-- Footer -->".to_string(),
            trailer: DEFAULT_TRAILER.to_string(),
        }
    }
}

const DEFAULT_TRAILER: &str = "        </div>\n      </div>\n    </section>\n  </div>\n";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchConfig {
    /// Quiet period, in milliseconds, before a burst of events triggers an update.
    pub delay_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { delay_ms: 1000 }
    }
}

/// Before/after comparison settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// Flat directory holding `<name>_before.jpg` / `<name>_after.jpg` pairs.
    pub dir: String,
    /// Manifest file name inside `dir`.
    pub manifest_file: String,
    /// Prefix written in front of each pair's file name in the manifest.
    pub url_prefix: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            dir: "dist/assets/raw".to_string(),
            manifest_file: "raw-config.json".to_string(),
            url_prefix: "assets/raw".to_string(),
        }
    }
}

/// Identity shown in the page header and footer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    pub name: String,
    pub tagline: String,
    /// Shown in the footer when non-empty.
    pub contact_email: String,
    pub copyright: String,
    /// Extra nav link next to the gallery link, relative to the output dir.
    /// Hidden when empty.
    pub about_href: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "XING".to_string(),
            tagline: "Welcome to my view of the world".to_string(),
            contact_email: String::new(),
            copyright: "Developed and Designed by Xing.".to_string(),
            about_href: "about_me.html".to_string(),
        }
    }
}

// =============================================================================
// Resolved filesystem and link layout
// =============================================================================

/// Absolute paths and relative hrefs derived from a config and a project root.
#[derive(Debug, Clone)]
pub struct SiteLayout {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub output_dir: PathBuf,
    pub index_path: PathBuf,
    pub manifest_path: PathBuf,
    /// Image href prefix as seen from the root page, e.g. `dist/assets`.
    pub index_asset_prefix: String,
    /// Image href prefix as seen from a page file, e.g. `assets`.
    pub page_asset_prefix: String,
    /// Prefix from a page file back to the project root, e.g. `../`.
    pub root_prefix: String,
    /// Href from a page file back to the root page, e.g. `../index.html`.
    pub index_href: String,
    /// Href prefix from the root page to page files, e.g. `dist`.
    pub pages_href: String,
}

impl SiteLayout {
    pub fn new(root: &Path, config: &GalleryConfig) -> Self {
        let assets_rel = normalize_rel(&config.assets_dir);
        let output_rel = normalize_rel(&config.output_dir);
        let index_rel = normalize_rel(&config.index_file);

        let page_asset_prefix = if output_rel.is_empty() {
            assets_rel.clone()
        } else {
            assets_rel
                .strip_prefix(&format!("{output_rel}/"))
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}{}", up_levels(&output_rel), assets_rel))
        };

        Self {
            root: root.to_path_buf(),
            assets_dir: root.join(&config.assets_dir),
            output_dir: root.join(&config.output_dir),
            index_path: root.join(&config.index_file),
            manifest_path: root.join(&config.output_dir).join(&config.manifest_file),
            index_asset_prefix: assets_rel,
            page_asset_prefix,
            root_prefix: up_levels(&output_rel),
            index_href: format!("{}{}", up_levels(&output_rel), index_rel),
            pages_href: output_rel,
        }
    }

    /// Href of page `n` as seen from the root page.
    pub fn page_href_from_index(&self, page: usize) -> String {
        let file = page_file_name(page);
        if self.pages_href.is_empty() {
            file
        } else {
            format!("{}/{}", self.pages_href, file)
        }
    }
}

/// File name of generated page `n` (pages 2 and up).
pub fn page_file_name(page: usize) -> String {
    format!("gallery_page_{page}.html")
}

/// Forward-slash form of a configured relative path, without `./` or trailing `/`.
fn normalize_rel(path: &str) -> String {
    Path::new(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn up_levels(rel: &str) -> String {
    if rel.is_empty() {
        return String::new();
    }
    "../".repeat(rel.split('/').count())
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(GalleryConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `folio.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config for a project root: stock defaults overlaid with `folio.toml`.
pub fn load_config(root: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `folio.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# folio-gal configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Paths are relative to the project root (--root, default ".").
# Unknown keys will cause an error.

# Directory scanned recursively for images.
assets_dir = "dist/assets"

# Directory receiving gallery_page_<n>.html files and the gallery manifest.
output_dir = "dist"

# Hand-maintained root page. Page 1 is spliced between the markers below.
index_file = "index.html"

# Gallery manifest, written inside output_dir on every run.
manifest_file = "gallery-info.json"

images_per_page = 16

# Case-insensitive, without the leading dot.
extensions = ["jpg", "jpeg", "png", "gif", "webp"]

# Directory names never descended into.
exclude_dirs = ["__MACOSX", ".DS_Store", "node_modules"]

# ---------------------------------------------------------------------------
# Root page splice region
# ---------------------------------------------------------------------------
[splice]
# Everything after the start marker and before the end marker is replaced.
start_marker = '<div class="flex flex-wrap w-full">'
end_marker = "  <!-- Footer -->"
# Closes the grid that the start marker opens; written after the pagination.
trailer = "        </div>\n      </div>\n    </section>\n  </div>\n"

# ---------------------------------------------------------------------------
# Watcher
# ---------------------------------------------------------------------------
[watch]
# Quiet period (ms) after the last image event before regenerating.
delay_ms = 1000

# ---------------------------------------------------------------------------
# Before/after comparisons
# ---------------------------------------------------------------------------
[raw]
dir = "dist/assets/raw"
manifest_file = "raw-config.json"
# Prefix for the before/after paths written into the manifest.
url_prefix = "assets/raw"

# ---------------------------------------------------------------------------
# Site identity (page header and footer)
# ---------------------------------------------------------------------------
[site]
name = "XING"
tagline = "Welcome to my view of the world"
contact_email = ""
copyright = "Developed and Designed by Xing."
# Extra nav link, relative to output_dir. Empty hides it.
about_href = "about_me.html"
"##
}

//! Before/after comparison manifest.
//!
//! The raw directory is flat and holds pairs named by a shared prefix:
//!
//! ```text
//! dist/assets/raw/
//! ├── dog_before.jpg     ┐ pair "dog"
//! ├── dog_after.jpg      ┘
//! ├── cat_before.jpg       no cat_after.jpg → skipped
//! └── raw-config.json      written here
//! ```
//!
//! Each synchronization rebuilds `raw-config.json` from the directory
//! listing. The only state carried over is `panUrl`, which is edited by hand:
//! it is read from the previous manifest by title and written back onto the
//! matching pair. A missing or malformed previous manifest counts as empty.

use crate::config::RawConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const BEFORE_SUFFIX: &str = "_before.jpg";
const AFTER_SUFFIX: &str = "_after.jpg";

#[derive(Error, Debug)]
pub enum RawError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One before/after pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonEntry {
    /// 1-based, in `_before` file-name order.
    pub id: usize,
    /// Shared file name prefix.
    pub title: String,
    pub before: String,
    pub after: String,
    /// Always written empty.
    pub description: String,
    pub pan_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawComparisonManifest {
    pub raw_comparisons: Vec<ComparisonEntry>,
}

/// Title → `panUrl` from the manifest at `path`.
///
/// Entries are read one at a time: an entry without a string `title` is
/// skipped, and a missing or non-string `panUrl` maps to `""`. An unreadable
/// file, invalid JSON, or a `rawComparisons` that is not an array gives an
/// empty map.
pub fn load_pan_urls(path: &Path) -> HashMap<String, String> {
    let Ok(content) = fs::read_to_string(path) else {
        return HashMap::new();
    };
    let prior: Value = match serde_json::from_str(&content) {
        Ok(prior) => prior,
        Err(e) => {
            debug!("Ignoring unreadable manifest {}: {}", path.display(), e);
            return HashMap::new();
        }
    };
    let Some(entries) = prior.get("rawComparisons").and_then(Value::as_array) else {
        debug!("No rawComparisons list in {}", path.display());
        return HashMap::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let title = entry.get("title")?.as_str()?;
            let pan_url = entry.get("panUrl").and_then(Value::as_str).unwrap_or_default();
            Some((title.to_string(), pan_url.to_string()))
        })
        .collect()
}

/// Pair up `_before`/`_after` names. Only names whose counterpart is also
/// present produce an entry; ids follow sorted `_before` order.
pub fn build_comparisons(
    file_names: &[String],
    url_prefix: &str,
    pan_urls: &HashMap<String, String>,
) -> Vec<ComparisonEntry> {
    let present: BTreeSet<&str> = file_names.iter().map(String::as_str).collect();

    present
        .iter()
        .filter_map(|name| name.strip_suffix(BEFORE_SUFFIX).map(|prefix| (*name, prefix)))
        .filter_map(|(before, prefix)| {
            let after = format!("{prefix}{AFTER_SUFFIX}");
            present.contains(after.as_str()).then(|| (before, prefix, after))
        })
        .enumerate()
        .map(|(i, (before, prefix, after))| ComparisonEntry {
            id: i + 1,
            title: prefix.to_string(),
            before: join_url(url_prefix, before),
            after: join_url(url_prefix, &after),
            description: String::new(),
            pan_url: pan_urls.get(prefix).cloned().unwrap_or_default(),
        })
        .collect()
}

fn join_url(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Rebuild and write the manifest for `dir`. Always rewrites the file.
pub fn sync_raw_pairs(dir: &Path, config: &RawConfig) -> Result<RawComparisonManifest, RawError> {
    let manifest_path = dir.join(&config.manifest_file);

    let file_names: Vec<String> = fs::read_dir(dir)
        .map_err(|source| RawError::Io {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();

    let pan_urls = load_pan_urls(&manifest_path);
    let manifest = RawComparisonManifest {
        raw_comparisons: build_comparisons(&file_names, &config.url_prefix, &pan_urls),
    };

    let json = serde_json::to_string_pretty(&manifest)?;
    fs::write(&manifest_path, json).map_err(|source| RawError::Io {
        path: manifest_path.clone(),
        source,
    })?;
    Ok(manifest)
}

/// Whether a change to `path` should trigger a resync.
pub fn is_raw_trigger(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().ends_with(".jpg"))
}

//! # folio-gal
//!
//! Paginated photo gallery maintenance for a hand-written static portfolio.
//! The asset directory is the data source: every image under it becomes a
//! tile, the first page is spliced into the hand-maintained root page, and
//! later pages are generated as standalone HTML files.
//!
//! # Architecture: One Regeneration Pass
//!
//! ```text
//! dist/assets/**  ──scan──►  Vec<ImageRecord>  ──paginate──┬─► index.html   (page 1, spliced)
//!                                                          ├─► dist/gallery_page_N.html
//!                                                          └─► dist/gallery-info.json
//! ```
//!
//! Every run rebuilds from scratch: stale page files are deleted before new
//! ones are written, so the output always mirrors the current asset tree.
//! The watcher never regenerates in-process; it re-runs the `update`
//! command as a child, one at a time.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Recursive image discovery with extension and directory filters |
//! | [`generate`] | Maud rendering of page files and the root page's gallery region |
//! | [`splice`] | Marker-delimited region replacement in hand-written HTML |
//! | [`gallery`] | Orchestrates one regeneration pass and writes the gallery manifest |
//! | [`watch`] | Debounced, single-flight re-runs on filesystem changes |
//! | [`raw`] | Before/after comparison pairing and `raw-config.json` maintenance |
//! | [`config`] | `folio.toml` loading, merging and validation; resolved [`config::SiteLayout`] |
//! | [`output`] | CLI summaries of update and raw-sync results |
//!
//! # Design Decisions
//!
//! ## Splice, Don't Template
//!
//! The root page stays hand-written. Only the region after the grid start
//! marker and up to the footer marker is owned by the generator; both markers
//! survive every run, so the splice is repeatable. If either marker is
//! missing the root page is left untouched and the rest of the run proceeds.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/). File names are
//! interpolated into `src` and `alt` attributes and are escaped like any
//! other value.

pub mod config;
pub mod gallery;
pub mod generate;
pub mod output;
pub mod raw;
pub mod scan;
pub mod splice;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_helpers;

//! Marker-delimited region replacement in an externally owned document.
//!
//! The root page is written by hand; only the span between two literal
//! markers belongs to the generator. The start marker itself is kept, the end
//! marker and everything after it are kept, and the bytes in between are
//! replaced:
//!
//! ```text
//! <header>…</header>
//! <div class="flex flex-wrap w-full">   ← start marker (kept)
//!   …generated…                          ← replaced
//!   <!-- Footer -->                      ← end marker (kept)
//! <footer>…</footer>
//! ```

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SpliceError {
    #[error("start marker not found: {0:?}")]
    MissingStartMarker(String),
    #[error("end marker not found: {0:?}")]
    MissingEndMarker(String),
    #[error("end marker {end:?} appears before start marker {start:?}")]
    MarkersOutOfOrder { start: String, end: String },
}

/// Replace the contents between the first `start` marker and the first `end`
/// marker that follows it.
///
/// Everything outside the region, markers included, is preserved byte for
/// byte. If `end` only occurs before `start`, the markers are out of order.
pub fn replace_region(
    content: &str,
    start: &str,
    end: &str,
    replacement: &str,
) -> Result<String, SpliceError> {
    let start_idx = content
        .find(start)
        .ok_or_else(|| SpliceError::MissingStartMarker(start.to_string()))?;
    let region_start = start_idx + start.len();

    let end_idx = match content[region_start..].find(end) {
        Some(offset) => region_start + offset,
        None if content.contains(end) => {
            return Err(SpliceError::MarkersOutOfOrder {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        None => return Err(SpliceError::MissingEndMarker(end.to_string())),
    };

    let mut out = String::with_capacity(content.len() - (end_idx - region_start) + replacement.len());
    out.push_str(&content[..region_start]);
    out.push_str(replacement);
    out.push_str(&content[end_idx..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "<!-- start -->";
    const END: &str = "<!-- end -->";

    #[test]
    fn replaces_between_markers() {
        let doc = "head<!-- start -->old stuff<!-- end -->tail";
        let out = replace_region(doc, START, END, "NEW").unwrap();
        assert_eq!(out, "head<!-- start -->NEW<!-- end -->tail");
    }

    #[test]
    fn preserves_outside_bytes_exactly() {
        let doc = "α\r\n  <!-- start -->\n\n<!-- end -->\t  ω\n";
        let out = replace_region(doc, START, END, "x").unwrap();
        assert!(out.starts_with("α\r\n  <!-- start -->"));
        assert!(out.ends_with("<!-- end -->\t  ω\n"));
    }

    #[test]
    fn empty_region_is_filled() {
        let doc = "<!-- start --><!-- end -->";
        let out = replace_region(doc, START, END, "fill").unwrap();
        assert_eq!(out, "<!-- start -->fill<!-- end -->");
    }

    #[test]
    fn reapplying_is_stable() {
        let doc = "a<!-- start -->b<!-- end -->c";
        let once = replace_region(doc, START, END, "Z").unwrap();
        let twice = replace_region(&once, START, END, "Z").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_start_marker() {
        let err = replace_region("<!-- end -->", START, END, "x").unwrap_err();
        assert_eq!(err, SpliceError::MissingStartMarker(START.to_string()));
    }

    #[test]
    fn missing_end_marker() {
        let err = replace_region("<!-- start -->", START, END, "x").unwrap_err();
        assert_eq!(err, SpliceError::MissingEndMarker(END.to_string()));
    }

    #[test]
    fn end_before_start_is_out_of_order() {
        let err = replace_region("<!-- end --><!-- start -->", START, END, "x").unwrap_err();
        assert!(matches!(err, SpliceError::MarkersOutOfOrder { .. }));
    }

    #[test]
    fn uses_first_end_after_start() {
        let doc = "<!-- end -->a<!-- start -->b<!-- end -->c<!-- end -->";
        let out = replace_region(doc, START, END, "X").unwrap();
        assert_eq!(out, "<!-- end -->a<!-- start -->X<!-- end -->c<!-- end -->");
    }
}

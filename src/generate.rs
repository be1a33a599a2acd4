//! Gallery page rendering.
//!
//! Turns a slice of [`ImageRecord`]s into HTML. Two outputs exist:
//!
//! - **Page documents** (`gallery_page_<n>.html`, pages 2 and up): complete,
//!   self-contained documents with head, nav, image grid, pagination and footer.
//! - **Index region**: the tile grid and pagination for page 1, spliced into the
//!   hand-maintained root page between its markers.
//!
//! ## Links
//!
//! Page documents live in the output directory, so their image hrefs use
//! [`SiteLayout::page_asset_prefix`] and "previous" from page 2 points back to
//! the root page. The index region is seen from the project root and uses
//! [`SiteLayout::index_asset_prefix`].
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/). Filenames are interpolated through
//! maud, so they are escaped in both attributes and text. Rendering is pure:
//! the same inputs always produce the same bytes, and tiles appear in input
//! order.

use crate::config::{SiteInfo, SiteLayout, page_file_name};
use crate::scan::ImageRecord;
use maud::{DOCTYPE, Markup, PreEscaped, html};

const TILE_IMG_CLASS: &str = "block h-full w-full object-cover object-center opacity-0 animate-fade-in transition duration-500 transform scale-100 hover:scale-110";
const PAGER_LINK_CLASS: &str = "px-8 py-3 bg-gray-200 dark:bg-gray-700 rounded-lg hover:bg-gray-300 dark:hover:bg-gray-600 transition duration-300 font-medium";

const TAILWIND_CONFIG: &str = r#"
    tailwind.config = {
      content: ["./*.{html,js}"],
      theme: {
        extend: {
          fontFamily: {
            'nothingyoucoulddo': ['Nothing You Could Do', 'cursive'],
            'signika': ['Signika', 'sans-serif'],
          },
        },
      },
      plugins: [],
    }
"#;

/// Previous/next hrefs for one page; `None` hides the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinks {
    pub prev: Option<String>,
    pub next: Option<String>,
}

/// Links for page document `page` of `total_pages`.
///
/// Leaving page 2 backwards goes to the root page; the last page has no next.
pub fn page_links(page: usize, total_pages: usize, layout: &SiteLayout) -> PageLinks {
    let prev = match page {
        0 | 1 => None,
        2 => Some(layout.index_href.clone()),
        n => Some(page_file_name(n - 1)),
    };
    let next = (page < total_pages).then(|| page_file_name(page + 1));
    PageLinks { prev, next }
}

/// Links for page 1 as rendered into the root page.
pub fn index_links(total_pages: usize, layout: &SiteLayout) -> PageLinks {
    PageLinks {
        prev: None,
        next: (total_pages > 1).then(|| layout.page_href_from_index(2)),
    }
}

// ============================================================================
// Components
// ============================================================================

/// One grid tile: a lightbox link wrapping the image.
fn image_tile(image: &ImageRecord, asset_prefix: &str, lazy: bool) -> Markup {
    let href = asset_href(asset_prefix, &image.relative_path);
    html! {
        div class="flex w-full md:w-1/4 flex-wrap" {
            div class="w-full p-1" {
                div class="overflow-hidden h-full w-full" {
                    a href=(href) data-fancybox="gallery" {
                        img alt=(image.stem())
                            class=(TILE_IMG_CLASS)
                            src=(href)
                            loading=[lazy.then_some("lazy")]
                            style="aspect-ratio: 3 / 4;";
                    }
                }
            }
        }
    }
}

fn asset_href(prefix: &str, relative_path: &str) -> String {
    if prefix.is_empty() {
        relative_path.to_string()
    } else {
        format!("{prefix}/{relative_path}")
    }
}

/// Pagination block. Rendered only when there is more than one page.
fn pagination(page: usize, total_pages: usize, links: &PageLinks) -> Markup {
    html! {
        @if total_pages > 1 {
            div class="flex flex-col sm:flex-row justify-center items-center space-y-4 sm:space-y-0 sm:space-x-8 mt-12 mb-12 w-full text-center" {
                div class="flex flex-col sm:flex-row items-center space-y-4 sm:space-y-0 sm:space-x-8" {
                    @if let Some(prev) = &links.prev {
                        a href=(prev) class=(PAGER_LINK_CLASS) { "Previous" }
                    }
                    span class="text-xl font-semibold" {
                        "Page " (page) " of " (total_pages)
                    }
                    @if let Some(next) = &links.next {
                        a href=(next) class=(PAGER_LINK_CLASS) { "Next" }
                    }
                }
            }
        }
    }
}

fn document_head(title: &str, site: &SiteInfo, layout: &SiteLayout) -> Markup {
    html! {
        head {
            meta charset="UTF-8";
            meta http-equiv="X-UA-Compatible" content="IE=edge";
            meta name="viewport" content="width=device-width, initial-scale=1.0";
            title { (site.name) " - " (title) }
            meta name="description" content="Photography portfolio";
            link rel="icon" type="image/x-icon" href={ (layout.page_asset_prefix) "/favicon.ico" };
            link rel="stylesheet" href="output.css";
            link rel="stylesheet" href={ (layout.root_prefix) "styles.css" };
            script defer src="https://cdn.jsdelivr.net/npm/alpinejs@3.x.x/dist/cdn.min.js" {}
            link rel="preconnect" href="https://fonts.gstatic.com" crossorigin;
            link rel="preconnect" href="https://fonts.googleapis.com";
            link href="https://fonts.googleapis.com/css2?family=Signika:wght@400;700&display=swap" rel="stylesheet";
            script src="https://cdn.jsdelivr.net/npm/@fancyapps/ui@5.0/dist/fancybox/fancybox.umd.js" {}
            link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/@fancyapps/ui@5.0/dist/fancybox/fancybox.css";
            script src="https://cdn.tailwindcss.com" {}
            script { (PreEscaped(TAILWIND_CONFIG)) }
        }
    }
}

fn site_nav(site: &SiteInfo, layout: &SiteLayout) -> Markup {
    html! {
        header class="flex w-full overflow-hidden pt-10 pb-1" {
            nav id="nav" role="navigation" class="w-full" {
                div class="container mx-auto flex flex-wrap items-center md:flex-no-wrap" {
                    div class="mr-4 md:mr-8" {
                        a href=(layout.index_href) class="text-2xl font-signika font-bold" { (site.name) }
                    }
                    ul id="ulMenu" class="flex flex-col md:flex-row md:items-center md:ml-auto md:space-x-5" {
                        li class="group transition duration-300" {
                            a href=(layout.index_href) class="font-signika text-2xl" { "PHOTO ALBUM" }
                        }
                        @if !site.about_href.is_empty() {
                            li class="group transition duration-300" {
                                a href=(site.about_href) class="font-signika text-2xl" { "ABOUT ME" }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn site_footer(site: &SiteInfo) -> Markup {
    html! {
        footer {
            div class="max-w-screen-xl py-16 mx-auto" {
                div class="grid grid-cols-1 gap-8 text-center mx-auto" {
                    p class="font-signika" { b { (site.name) } }
                    @if !site.contact_email.is_empty() {
                        p class="mt-4 text-sm text-gray-600 dark:text-gray-300" { (site.contact_email) }
                    }
                }
                p class="mt-8 text-xs text-gray-600 dark:text-gray-300 text-center" {
                    "© " (site.copyright)
                }
            }
        }
    }
}

// ============================================================================
// Renderers
// ============================================================================

/// Render page document `page` of `total_pages` holding `images`.
pub fn render_page(
    images: &[ImageRecord],
    page: usize,
    total_pages: usize,
    site: &SiteInfo,
    layout: &SiteLayout,
) -> Markup {
    let title = if page == 1 {
        "PHOTO ALBUM".to_string()
    } else {
        format!("PHOTO ALBUM - Page {page}")
    };
    let links = page_links(page, total_pages, layout);
    let pager = pagination(page, total_pages, &links);

    html! {
        (DOCTYPE)
        html lang="en" class="scroll-smooth" {
            (document_head(&title, site, layout))
            body class="dark:bg-black bg-white h-screen text-black dark:text-white px-5 md:px-20 opacity-0 animate-fade-in transition duration-500" {
                (site_nav(site, layout))
                div class="container mx-auto" {
                    h1 class="text-4xl pt-10 pb-8 font-bold" { (site.tagline) }
                    (pager)
                    section class="text-neutral-700" {
                        div class="container w-full" {
                            div class="flex flex-wrap w-full" {
                                @for image in images {
                                    (image_tile(image, &layout.page_asset_prefix, true))
                                }
                            }
                        }
                    }
                    (pager)
                }
                (site_footer(site))
                script { (PreEscaped(r#"Fancybox.bind("[data-fancybox]", {});"#)) }
                script src="fade_in.js" {}
                script src="menu.js" {}
            }
        }
    }
}

/// Render the page-1 region spliced into the root page.
///
/// One tile per line, followed by the pagination block (when there is more
/// than one page) and the configured trailer.
pub fn render_index_region(
    images: &[ImageRecord],
    total_pages: usize,
    trailer: &str,
    layout: &SiteLayout,
) -> String {
    let mut out = String::from("\n");
    for image in images {
        out.push_str(&image_tile(image, &layout.index_asset_prefix, false).into_string());
        out.push('\n');
    }
    let pager = pagination(1, total_pages, &index_links(total_pages, layout)).into_string();
    if !pager.is_empty() {
        out.push_str(&pager);
        out.push('\n');
    }
    out.push_str(trailer);
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GalleryConfig;
    use crate::test_helpers::*;
    use std::path::Path;

    fn layout() -> SiteLayout {
        SiteLayout::new(Path::new("/site"), &GalleryConfig::default())
    }

    fn site() -> SiteInfo {
        SiteInfo::default()
    }

    #[test]
    fn page_document_has_doctype_and_title() {
        let images = records(&["a.jpg"]);
        let html = render_page(&images, 2, 3, &site(), &layout()).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>XING - PHOTO ALBUM - Page 2</title>"));
        assert!(html.contains("Welcome to my view of the world"));
    }

    #[test]
    fn tiles_use_page_relative_paths_and_lazy_loading() {
        let images = records(&["street/dawn.jpg"]);
        let html = render_page(&images, 2, 2, &site(), &layout()).into_string();
        assert!(html.contains(r#"href="assets/street/dawn.jpg""#));
        assert!(html.contains(r#"src="assets/street/dawn.jpg""#));
        assert!(html.contains(r#"alt="dawn""#));
        assert!(html.contains(r#"loading="lazy""#));
        assert!(html.contains(r#"data-fancybox="gallery""#));
    }

    #[test]
    fn tiles_preserve_input_order() {
        let images = records(&["z.jpg", "a.jpg", "m.jpg"]);
        let html = render_page(&images, 2, 2, &site(), &layout()).into_string();
        let z = html.find("assets/z.jpg").unwrap();
        let a = html.find("assets/a.jpg").unwrap();
        let m = html.find("assets/m.jpg").unwrap();
        assert!(z < a && a < m);
    }

    #[test]
    fn page_two_links_back_to_root_page() {
        let links = page_links(2, 3, &layout());
        assert_eq!(links.prev.as_deref(), Some("../index.html"));
        assert_eq!(links.next.as_deref(), Some("gallery_page_3.html"));
    }

    #[test]
    fn middle_page_links_to_neighbours() {
        let links = page_links(3, 5, &layout());
        assert_eq!(links.prev.as_deref(), Some("gallery_page_2.html"));
        assert_eq!(links.next.as_deref(), Some("gallery_page_4.html"));
    }

    #[test]
    fn last_page_has_no_next() {
        let links = page_links(3, 3, &layout());
        assert_eq!(links.next, None);
        let html = render_page(&records(&["a.jpg"]), 3, 3, &site(), &layout()).into_string();
        assert!(html.contains("Previous"));
        assert!(!html.contains("Next"));
        assert!(html.contains("Page 3 of 3"));
    }

    #[test]
    fn single_page_has_no_pagination() {
        let html = render_page(&records(&["a.jpg"]), 1, 1, &site(), &layout()).into_string();
        assert!(!html.contains("Page 1 of 1"));
        assert!(!html.contains("Previous"));
    }

    #[test]
    fn pagination_rendered_above_and_below_grid() {
        let html = render_page(&records(&["a.jpg"]), 2, 2, &site(), &layout()).into_string();
        assert_eq!(html.matches("Page 2 of 2").count(), 2);
    }

    #[test]
    fn filenames_are_escaped() {
        let images = records(&[r#"<b>"x"&y.jpg"#]);
        let html = render_page(&images, 2, 2, &site(), &layout()).into_string();
        assert!(!html.contains(r#"<b>"x"#));
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("&quot;x&quot;&amp;y"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let images = records(&["a.jpg", "b.png"]);
        let first = render_page(&images, 2, 4, &site(), &layout()).into_string();
        let second = render_page(&images, 2, 4, &site(), &layout()).into_string();
        assert_eq!(first, second);
    }

    #[test]
    fn footer_shows_contact_only_when_set() {
        let images = records(&["a.jpg"]);
        let html = render_page(&images, 2, 2, &site(), &layout()).into_string();
        assert!(!html.contains("mt-4 text-sm"));

        let mut with_mail = site();
        with_mail.contact_email = "me@example.com".to_string();
        let html = render_page(&images, 2, 2, &with_mail, &layout()).into_string();
        assert!(html.contains("me@example.com"));
    }

    // =========================================================================
    // Index region
    // =========================================================================

    #[test]
    fn index_region_uses_root_relative_paths_without_lazy() {
        let region = render_index_region(&records(&["a.jpg"]), 1, "", &layout());
        assert!(region.contains(r#"src="dist/assets/a.jpg""#));
        assert!(!region.contains("loading="));
    }

    #[test]
    fn index_region_links_to_page_two() {
        let region = render_index_region(&records(&["a.jpg"]), 2, "", &layout());
        assert!(region.contains(r#"href="dist/gallery_page_2.html""#));
        assert!(region.contains("Page 1 of 2"));
        assert!(!region.contains("Previous"));
    }

    #[test]
    fn index_region_single_page_has_no_pager() {
        let region = render_index_region(&records(&["a.jpg"]), 1, "", &layout());
        assert!(!region.contains("Page 1"));
    }

    #[test]
    fn index_region_ends_with_trailer() {
        let region = render_index_region(&records(&["a.jpg", "b.jpg"]), 1, "</div>\n", &layout());
        assert!(region.starts_with('\n'));
        assert!(region.ends_with("</div>\n"));
        assert_eq!(region.matches("data-fancybox").count(), 2);
    }
}

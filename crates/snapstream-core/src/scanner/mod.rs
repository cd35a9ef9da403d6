//! Page image scanner.
//!
//! Walks a parsed document and collects image URLs from:
//! - `img` `src`, `srcset` (and the lazy-loading `data-src` / `data-srcset`)
//! - SVG `image` `xlink:href` / `href`
//! - `a` `href` whose path ends in an image extension (also reported as linked)
//! - `background` / `background-image` in inline `style` attributes and `<style>` blocks
//!
//! Every URL is fragment-free and resolved against the page before it is
//! recorded. Both lists are deduplicated in document order.

mod discovery;
mod patterns;
mod resolve;
mod scroll;
mod srcset;

pub use discovery::{DiscoverySet, ImageCandidate, ScanReport};
pub use patterns::is_image_url;
pub use resolve::{strip_fragment, PageBase};
pub use scroll::{scroll_and_collect, ScanEvent, ScrollablePage};

use discovery::OrderedSet;
use dom_query::{Document, NodeRef, Selection};
use std::collections::BTreeMap;

use crate::dimensions::Dimensions;

/// Parse `html` and scan it as the document at `page_url`.
pub fn scan_html(html: &str, page_url: &str) -> ScanReport {
    let doc = Document::from(html);
    scan_document(&doc, page_url)
}

/// Scan an already parsed document.
pub fn scan_document(doc: &Document, page_url: &str) -> ScanReport {
    let base_href = doc.select("base[href]").attr("href");
    let page = PageBase::new(page_url, base_href.as_deref());

    let mut all = OrderedSet::default();
    let mut linked = OrderedSet::default();
    let mut frames = OrderedSet::default();
    let mut dimensions = BTreeMap::new();

    for node in doc.select("*").nodes() {
        let Some(tag) = node.node_name() else {
            continue;
        };
        match tag.to_ascii_lowercase().as_str() {
            "img" => {
                let src = attr(node, "src").or_else(|| attr(node, "data-src"));
                if let Some(url) = src.as_deref().and_then(|s| page.absolutize(s)) {
                    let declared =
                        Dimensions::from_attributes(attr(node, "width").as_deref(), attr(node, "height").as_deref());
                    if let Some(d) = declared {
                        dimensions.entry(url.clone()).or_insert(d);
                    }
                    all.insert(url);
                }
                for name in ["srcset", "data-srcset"] {
                    if let Some(set) = attr(node, name) {
                        for candidate in srcset::srcset_urls(&set) {
                            if let Some(url) = page.absolutize(candidate) {
                                all.insert(url);
                            }
                        }
                    }
                }
            }
            "image" => {
                if let Some(url) = attr(node, "href").as_deref().and_then(|s| page.absolutize(s)) {
                    all.insert(url);
                }
            }
            "a" => {
                let href = attr(node, "href").and_then(|s| page.absolutize(&s));
                match href {
                    // The linked image stands for the anchor; its own inline
                    // background (usually a thumbnail of the same picture) is not collected.
                    Some(url) if is_image_url(&url) => {
                        linked.insert(url.clone());
                        all.insert(url);
                    }
                    _ => collect_inline_background(node, &page, &mut all),
                }
            }
            "iframe" | "frame" => {
                if let Some(url) = attr(node, "src").as_deref().and_then(|s| page.absolutize(s)) {
                    if url.starts_with("http") {
                        frames.insert(url);
                    }
                }
            }
            _ => collect_inline_background(node, &page, &mut all),
        }
    }

    for style in doc.select("style").nodes() {
        let css = Selection::from(*style).text();
        for raw in patterns::background_urls(&css) {
            if let Some(url) = page.absolutize(&raw).filter(|u| is_image_url(u)) {
                all.insert(url);
            }
        }
    }

    let report = ScanReport {
        all_images: all.into_vec(),
        linked_images: linked.into_vec(),
        origin: page.origin().to_string(),
        frames: frames.into_vec(),
        dimensions,
    };
    tracing::debug!(
        page = page_url,
        all = report.all_images.len(),
        linked = report.linked_images.len(),
        frames = report.frames.len(),
        "scanned document"
    );
    report
}

fn collect_inline_background(node: &NodeRef<'_>, page: &PageBase, all: &mut OrderedSet) {
    let Some(style) = attr(node, "style") else {
        return;
    };
    for raw in patterns::background_urls(&style) {
        if let Some(url) = page.absolutize(&raw).filter(|u| is_image_url(u)) {
            all.insert(url);
        }
    }
}

/// Attribute by local name, so `xlink:href` is found as `href`.
fn attr(node: &NodeRef<'_>, name: &str) -> Option<String> {
    node.attrs()
        .iter()
        .find(|a| &*a.name.local == name)
        .map(|a| a.value.to_string())
}

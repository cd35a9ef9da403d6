//! Turning raw attribute values into absolute candidate URLs.

use url::Url;

/// Schemes worth reporting; `javascript:`, `about:`, `blob:` and friends are dropped.
const KEPT_SCHEMES: &[&str] = &["http", "https", "data", "file"];

/// Where the scanned document lives.
#[derive(Debug, Clone)]
pub struct PageBase {
    origin: String,
    scheme: String,
    base: Option<Url>,
}

impl PageBase {
    /// From the document URL. `base_href` (from `<base href>`) overrides the
    /// base used for document-relative paths, not the origin.
    pub fn new(page_url: &str, base_href: Option<&str>) -> Self {
        let page = Url::parse(page_url).ok();
        let origin = page
            .as_ref()
            .map(|u| u.origin().ascii_serialization())
            .unwrap_or_default();
        let scheme = page
            .as_ref()
            .map(|u| u.scheme().to_string())
            .unwrap_or_else(|| "https".to_string());
        let base = match (page.as_ref(), base_href) {
            (Some(p), Some(href)) => p.join(href.trim()).ok().or(Some(p.clone())),
            (Some(p), None) => Some(p.clone()),
            (None, Some(href)) => Url::parse(href.trim()).ok(),
            (None, None) => None,
        };
        Self {
            origin,
            scheme,
            base,
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Resolve a raw reference found in the page. Fragments are stripped.
    ///
    /// - `/path` → origin + path, verbatim
    /// - `//host/path` → page scheme + reference
    /// - absolute URLs are kept as written when their scheme is reportable
    /// - anything else is joined against the document base
    pub fn absolutize(&self, raw: &str) -> Option<String> {
        let reference = strip_fragment(raw.trim());
        if reference.is_empty() {
            return None;
        }

        if reference.starts_with("//") {
            return Some(format!("{}:{}", self.scheme, reference));
        }
        if reference.starts_with('/') {
            if self.origin.is_empty() || self.origin == "null" {
                return Some(reference.to_string());
            }
            return Some(format!("{}{}", self.origin, reference));
        }
        if let Ok(parsed) = Url::parse(reference) {
            return KEPT_SCHEMES
                .contains(&parsed.scheme())
                .then(|| reference.to_string());
        }
        match &self.base {
            Some(base) => base.join(reference).ok().map(|u| u.to_string()),
            None => Some(reference.to_string()),
        }
    }
}

/// Everything before the first `#`.
pub fn strip_fragment(url: &str) -> &str {
    match url.find('#') {
        Some(idx) => &url[..idx],
        None => url,
    }
}

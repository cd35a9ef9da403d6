//! Filter engine: narrows the discovered set to the URLs the user sees.
//!
//! Stages, in order: base set (all or linked only), text match, dimension bounds.
//! Evaluation is pure and keeps the base set's order.

mod debounce;
mod pattern;

pub use debounce::FilterDebouncer;

use serde::{Deserialize, Serialize};

use crate::dimensions::Dimensions;
use crate::scanner::{DiscoverySet, ImageCandidate};
use pattern::TextMatcher;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Whitespace terms, `-term` negates.
    #[default]
    Normal,
    /// `*` and `?` globs.
    Wildcard,
    Regex,
}

/// Optional inclusive bounds; `None` never excludes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DimensionBounds {
    pub min_width: Option<u32>,
    pub max_width: Option<u32>,
    pub min_height: Option<u32>,
    pub max_height: Option<u32>,
}

impl DimensionBounds {
    pub fn is_unbounded(&self) -> bool {
        *self == Self::default()
    }

    pub fn admits(&self, d: Dimensions) -> bool {
        self.min_width.map_or(true, |min| min <= d.width)
            && self.max_width.map_or(true, |max| d.width <= max)
            && self.min_height.map_or(true, |min| min <= d.height)
            && self.max_height.map_or(true, |max| d.height <= max)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub mode: FilterMode,
    pub text: String,
    pub only_linked: bool,
    pub bounds: DimensionBounds,
}

/// Filters a discovery set. With `only_linked` the base set is the linked
/// list in its own order, not the all-images order.
pub fn filter_set(set: &DiscoverySet, spec: &FilterSpec) -> Vec<String> {
    filter(&set.base_candidates(spec.only_linked), spec, |url| set.dimensions(url))
}

/// URLs of `candidates` that pass `spec`. A URL whose dimensions `lookup`
/// cannot provide passes the dimension stage.
pub fn filter<L>(candidates: &[ImageCandidate], spec: &FilterSpec, lookup: L) -> Vec<String>
where
    L: Fn(&str) -> Option<Dimensions>,
{
    let matcher = TextMatcher::new(spec.mode, &spec.text);
    candidates
        .iter()
        .filter(|c| !spec.only_linked || c.is_linked)
        .filter(|c| matcher.matches(&c.url))
        .filter(|c| spec.bounds.is_unbounded() || lookup(&c.url).map_or(true, |d| spec.bounds.admits(d)))
        .map(|c| c.url.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan_html;
    use std::collections::HashMap;

    fn candidates(list: &[(&str, bool)]) -> Vec<ImageCandidate> {
        list.iter()
            .map(|(url, is_linked)| ImageCandidate {
                url: url.to_string(),
                is_linked: *is_linked,
            })
            .collect()
    }

    fn text(mode: FilterMode, text: &str) -> FilterSpec {
        FilterSpec {
            mode,
            text: text.to_string(),
            ..FilterSpec::default()
        }
    }

    fn no_dims(_: &str) -> Option<Dimensions> {
        None
    }

    #[test]
    fn normal_terms_are_anded() {
        let c = candidates(&[
            ("https://x/cat.png", false),
            ("https://x/catdog.png", false),
            ("https://x/bird.png", false),
        ]);
        assert_eq!(filter(&c, &text(FilterMode::Normal, "cat -dog"), no_dims), vec!["https://x/cat.png"]);
    }

    #[test]
    fn only_linked_uses_linked_subset() {
        let c = candidates(&[("https://x/a.png", false), ("https://x/b.png", true), ("https://x/c.png", true)]);
        let spec = FilterSpec {
            only_linked: true,
            ..FilterSpec::default()
        };
        assert_eq!(filter(&c, &spec, no_dims), vec!["https://x/b.png", "https://x/c.png"]);
    }

    #[test]
    fn only_linked_follows_anchor_order() {
        let mut set = DiscoverySet::new();
        set.merge(&scan_html(
            r#"<img src="/a.png"><a href="/b.png">b</a><a href="/a.png">a</a>"#,
            "https://ex.com/",
        ));
        let spec = FilterSpec {
            only_linked: true,
            ..FilterSpec::default()
        };
        assert_eq!(filter_set(&set, &spec), vec!["https://ex.com/b.png", "https://ex.com/a.png"]);
        assert_eq!(
            filter_set(&set, &FilterSpec::default()),
            vec!["https://ex.com/a.png", "https://ex.com/b.png"]
        );
    }

    #[test]
    fn invalid_regex_yields_empty() {
        let c = candidates(&[("https://x/a.png", false)]);
        assert!(filter(&c, &text(FilterMode::Regex, "(unclosed"), no_dims).is_empty());
    }

    #[test]
    fn unknown_dimensions_pass() {
        let c = candidates(&[("https://x/big.png", false), ("https://x/small.png", false), ("https://x/unknown.png", false)]);
        let dims: HashMap<&str, Dimensions> = [
            ("https://x/big.png", Dimensions::new(1920, 1080)),
            ("https://x/small.png", Dimensions::new(16, 16)),
        ]
        .into_iter()
        .collect();
        let spec = FilterSpec {
            bounds: DimensionBounds {
                min_width: Some(100),
                ..DimensionBounds::default()
            },
            ..FilterSpec::default()
        };
        let out = filter(&c, &spec, |u| dims.get(u).copied());
        assert_eq!(out, vec!["https://x/big.png", "https://x/unknown.png"]);
    }

    #[test]
    fn each_bound_is_independent() {
        let d = Dimensions::new(300, 200);
        assert!(DimensionBounds::default().admits(d));
        assert!(DimensionBounds {
            max_height: Some(200),
            ..DimensionBounds::default()
        }
        .admits(d));
        assert!(!DimensionBounds {
            max_width: Some(299),
            ..DimensionBounds::default()
        }
        .admits(d));
        assert!(!DimensionBounds {
            min_height: Some(201),
            ..DimensionBounds::default()
        }
        .admits(d));
    }

    #[test]
    fn order_preserved_and_idempotent() {
        let c = candidates(&[
            ("https://x/3.jpg", false),
            ("https://x/1.png", false),
            ("https://x/2.jpg", false),
        ]);
        let spec = text(FilterMode::Wildcard, "*.jpg");
        let once = filter(&c, &spec, no_dims);
        assert_eq!(once, vec!["https://x/3.jpg", "https://x/2.jpg"]);

        let again: Vec<ImageCandidate> = once
            .iter()
            .map(|url| ImageCandidate {
                url: url.clone(),
                is_linked: false,
            })
            .collect();
        assert_eq!(filter(&again, &spec, no_dims), once);
    }

    #[test]
    fn mode_names_in_config() {
        assert_eq!(serde_json::to_string(&FilterMode::Wildcard).unwrap(), "\"wildcard\"");
        assert_eq!(serde_json::from_str::<FilterMode>("\"regex\"").unwrap(), FilterMode::Regex);
    }
}

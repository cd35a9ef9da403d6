//! Scan reports and the accumulated discovery set.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::dimensions::Dimensions;

/// A discovered URL and whether it came from an anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCandidate {
    pub url: String,
    pub is_linked: bool,
}

/// One scan of one frame. Serialized with the wire names hosts already expect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub all_images: Vec<String>,
    pub linked_images: Vec<String>,
    pub origin: String,
    /// `iframe`/`frame` sources to scan separately.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<String>,
    /// Declared dimensions of `img` elements, by resolved URL.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dimensions: BTreeMap<String, Dimensions>,
}

/// Insertion-ordered set of strings.
#[derive(Debug, Clone, Default)]
pub(crate) struct OrderedSet {
    items: Vec<String>,
    seen: HashSet<String>,
}

impl OrderedSet {
    pub(crate) fn insert(&mut self, value: String) -> bool {
        if self.seen.contains(&value) {
            return false;
        }
        self.seen.insert(value.clone());
        self.items.push(value);
        true
    }

    pub(crate) fn contains(&self, value: &str) -> bool {
        self.seen.contains(value)
    }

    pub(crate) fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub(crate) fn into_vec(self) -> Vec<String> {
        self.items
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}

/// Everything found in one scan session, merged across passes and frames by union.
#[derive(Debug, Clone, Default)]
pub struct DiscoverySet {
    all: OrderedSet,
    linked: OrderedSet,
    /// From `width`/`height` attributes; only a hint of the rendered size.
    declared: HashMap<String, Dimensions>,
    /// Decoded from the image bytes.
    natural: HashMap<String, Dimensions>,
    origin: Option<String>,
}

impl DiscoverySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union a report into the set. Returns how many URLs were new to either list.
    pub fn merge(&mut self, report: &ScanReport) -> usize {
        let mut added = 0;
        for url in &report.all_images {
            if self.all.insert(url.clone()) {
                added += 1;
            }
        }
        for url in &report.linked_images {
            if self.linked.insert(url.clone()) && !self.all.contains(url) {
                added += 1;
            }
        }
        for (url, dims) in &report.dimensions {
            self.declared.entry(url.clone()).or_insert(*dims);
        }
        if self.origin.is_none() && !report.origin.is_empty() {
            self.origin = Some(report.origin.clone());
        }
        added
    }

    /// Forget everything (explicit refresh).
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn all_images(&self) -> &[String] {
        self.all.as_slice()
    }

    pub fn linked_images(&self) -> &[String] {
        self.linked.as_slice()
    }

    /// Origin of the first report merged, i.e. the top-level page (used for the `Referer` header).
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn len(&self) -> usize {
        self.candidates().len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.len() == 0 && self.linked.len() == 0
    }

    /// Base set for the filter: every candidate, or with `only_linked` just
    /// the linked ones in the order anchors were found.
    pub fn base_candidates(&self, only_linked: bool) -> Vec<ImageCandidate> {
        if !only_linked {
            return self.candidates();
        }
        self.linked
            .as_slice()
            .iter()
            .map(|url| ImageCandidate {
                url: url.clone(),
                is_linked: true,
            })
            .collect()
    }

    /// All URLs in discovery order, each flagged if an anchor linked it.
    /// Linked URLs never seen as plain images come last.
    pub fn candidates(&self) -> Vec<ImageCandidate> {
        let mut out: Vec<ImageCandidate> = self
            .all
            .as_slice()
            .iter()
            .map(|url| ImageCandidate {
                url: url.clone(),
                is_linked: self.linked.contains(url),
            })
            .collect();
        out.extend(
            self.linked
                .as_slice()
                .iter()
                .filter(|url| !self.all.contains(url))
                .map(|url| ImageCandidate {
                    url: url.clone(),
                    is_linked: true,
                }),
        );
        out
    }

    /// Best known size: decoded dimensions, else the declared ones.
    pub fn dimensions(&self, url: &str) -> Option<Dimensions> {
        self.natural.get(url).or_else(|| self.declared.get(url)).copied()
    }

    pub fn has_natural_dimensions(&self, url: &str) -> bool {
        self.natural.contains_key(url)
    }

    /// Records dimensions decoded from the image itself; they replace declared ones.
    pub fn set_natural_dimensions(&mut self, url: &str, dims: Dimensions) {
        self.natural.insert(url.to_string(), dims);
    }
}

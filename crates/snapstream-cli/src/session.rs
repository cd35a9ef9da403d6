//! State of one CLI invocation: configuration plus everything discovered so far.

use anyhow::{Context, Result};
use std::collections::HashSet;
use snapstream_core::config::SnapConfig;
use snapstream_core::dimensions;
use snapstream_core::fetch::{CurlFetcher, FetchOptions};
use snapstream_core::filter::{self, FilterSpec};
use snapstream_core::page::{self, PageScan};
use snapstream_core::scanner::{DiscoverySet, ScanReport};

pub struct Session {
    pub config: SnapConfig,
    pub discovered: DiscoverySet,
}

impl Session {
    pub fn new(config: SnapConfig) -> Self {
        Self {
            config,
            discovered: DiscoverySet::new(),
        }
    }

    /// Scans `url` (and its frames if asked) into the discovery set.
    pub async fn scan(&mut self, url: &str, include_frames: bool) -> Result<PageScan> {
        let loader = CurlFetcher::new(FetchOptions::from_config(&self.config));
        page::scan_page(&loader, url, &self.config.scroll, include_frames, &mut self.discovered).await
    }

    /// Image fetcher for this session. An explicit referrer wins; otherwise the
    /// scanned page's origin is sent when `send_referrer` is on.
    pub fn image_fetcher(&self, referrer: Option<String>) -> CurlFetcher {
        let referrer = referrer.or_else(|| {
            self.config
                .send_referrer
                .then(|| self.discovered.origin().map(str::to_string))
                .flatten()
        });
        CurlFetcher::new(FetchOptions::from_config(&self.config).with_referrer(referrer))
    }

    /// Fetches candidates to learn their natural size so bounds apply to it.
    pub async fn measure_dimensions(&mut self) -> Result<usize> {
        let fetcher = self.image_fetcher(None);
        let mut set = std::mem::take(&mut self.discovered);
        let (set, found) = tokio::task::spawn_blocking(move || {
            let found = dimensions::measure_candidates(&mut set, &fetcher);
            (set, found)
        })
        .await
        .context("dimension task join")?;
        self.discovered = set;
        Ok(found)
    }

    pub fn visible(&self, spec: &FilterSpec) -> Vec<String> {
        filter::filter_set(&self.discovered, spec)
    }

    /// The visible set in scan-report shape.
    pub fn visible_report(&self, spec: &FilterSpec) -> ScanReport {
        let all_images = self.visible(spec);
        let linked: HashSet<&str> = self.discovered.linked_images().iter().map(String::as_str).collect();
        let linked_images = all_images
            .iter()
            .filter(|url| linked.contains(url.as_str()))
            .cloned()
            .collect();
        ScanReport {
            all_images,
            linked_images,
            origin: self.discovered.origin().unwrap_or_default().to_string(),
            ..ScanReport::default()
        }
    }
}

//! Loading the inspected page (and its frames) for the scanner.
//!
//! Without a renderer the fetched document is a static snapshot: it fits its
//! viewport, so scroll mode finishes after one step. Hosts that drive a real
//! browser implement [`ScrollablePage`] themselves and reuse the same merge.

use anyhow::{Context, Result};
use std::collections::{HashSet, VecDeque};
use tokio::sync::mpsc;

use crate::config::ScrollConfig;
use crate::fetch::CurlFetcher;
use crate::scanner::{scroll_and_collect, DiscoverySet, ScanEvent, ScanReport, ScrollablePage};

/// Upper bound on frames followed from one page.
pub const MAX_FRAMES: usize = 32;

/// Source of page HTML. Returns the final URL (after redirects) and the document.
pub trait PageLoader: Clone + Send + 'static {
    fn load_page(&self, url: &str) -> Result<(String, String)>;
}

impl PageLoader for CurlFetcher {
    fn load_page(&self, url: &str) -> Result<(String, String)> {
        self.get_page(url)
    }
}

/// A fetched document presented as a page that cannot grow.
#[derive(Debug, Clone)]
pub struct StaticPage {
    url: String,
    html: String,
    viewport: u64,
    y: u64,
}

impl StaticPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>, viewport_height: u64) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            viewport: viewport_height,
            y: 0,
        }
    }
}

impl ScrollablePage for StaticPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn html(&self) -> String {
        self.html.clone()
    }

    fn scroll_by(&mut self, dy: u64) {
        self.y = (self.y + dy).min(self.scroll_height().saturating_sub(self.viewport));
    }

    fn scroll_to_top(&mut self) {
        self.y = 0;
    }

    fn scroll_y(&self) -> u64 {
        self.y
    }

    fn viewport_height(&self) -> u64 {
        self.viewport
    }

    fn scroll_height(&self) -> u64 {
        self.viewport
    }
}

/// Fetches `url` off the async runtime.
pub async fn load_static_page<L: PageLoader>(loader: &L, url: &str, cfg: &ScrollConfig) -> Result<StaticPage> {
    let loader = loader.clone();
    let target = url.to_string();
    let (final_url, html) = tokio::task::spawn_blocking(move || loader.load_page(&target))
        .await
        .context("page fetch task")??;
    Ok(StaticPage::new(final_url, html, cfg.viewport_height_px))
}

/// Runs scroll mode on `page`, merging every report into `set` as it arrives.
/// Returns the final report.
pub async fn collect_into<P>(page: &mut P, cfg: &ScrollConfig, set: &mut DiscoverySet) -> ScanReport
where
    P: ScrollablePage + ?Sized,
{
    let (tx, mut rx) = mpsc::channel(16);
    let merge = async {
        while let Some(event) = rx.recv().await {
            match event {
                ScanEvent::Report(report) => {
                    set.merge(&report);
                }
                ScanEvent::Done => break,
            }
        }
    };
    let (last, ()) = tokio::join!(scroll_and_collect(page, cfg, &tx), merge);
    last
}

/// What one page scan added to the discovery set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageScan {
    /// URL of the top-level document after redirects.
    pub page_url: String,
    pub frames_scanned: usize,
    pub frames_failed: usize,
    pub new_urls: usize,
}

/// Loads and scans `url`; with `include_frames`, follows `iframe`/`frame`
/// sources breadth first and merges their reports after the top document's.
/// A frame that fails to load is logged and skipped.
pub async fn scan_page<L: PageLoader>(
    loader: &L,
    url: &str,
    cfg: &ScrollConfig,
    include_frames: bool,
    set: &mut DiscoverySet,
) -> Result<PageScan> {
    let before = set.len();
    let mut page = load_static_page(loader, url, cfg)
        .await
        .with_context(|| format!("load page {}", url))?;
    let top = collect_into(&mut page, cfg, set).await;

    let mut scan = PageScan {
        page_url: page.url().to_string(),
        ..PageScan::default()
    };

    if include_frames {
        let mut seen: HashSet<String> = HashSet::from([scan.page_url.clone()]);
        let mut queue: VecDeque<String> = top.frames.into_iter().collect();

        while let Some(frame_url) = queue.pop_front() {
            if !seen.insert(frame_url.clone()) {
                continue;
            }
            if scan.frames_scanned + scan.frames_failed >= MAX_FRAMES {
                tracing::warn!(page = %scan.page_url, "frame limit reached, skipping the rest");
                break;
            }
            match load_static_page(loader, &frame_url, cfg).await {
                Ok(mut frame) => {
                    let report = collect_into(&mut frame, cfg, set).await;
                    queue.extend(report.frames);
                    scan.frames_scanned += 1;
                }
                Err(e) => {
                    tracing::warn!(frame = %frame_url, "skipping frame: {:#}", e);
                    scan.frames_failed += 1;
                }
            }
        }
    }

    scan.new_urls = set.len() - before;
    tracing::info!(
        page = %scan.page_url,
        frames = scan.frames_scanned,
        new = scan.new_urls,
        total = set.len(),
        "page scanned"
    );
    Ok(scan)
}

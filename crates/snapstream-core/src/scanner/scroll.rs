//! Scroll-driven incremental scanning for lazily loaded images.

use tokio::sync::mpsc;

use super::{scan_html, ScanReport};
use crate::config::ScrollConfig;

/// The inspected page, as seen from the scanner. Whatever actually hosts the
/// page (a webview, a headless browser, a fetched snapshot) implements this.
pub trait ScrollablePage {
    /// Document URL, used for the origin and relative resolution.
    fn url(&self) -> &str;
    /// Current serialized DOM.
    fn html(&self) -> String;
    fn scroll_by(&mut self, dy: u64);
    fn scroll_to_top(&mut self);
    fn scroll_y(&self) -> u64;
    fn viewport_height(&self) -> u64;
    fn scroll_height(&self) -> u64;

    fn scan(&self) -> ScanReport {
        scan_html(&self.html(), self.url())
    }
}

/// Stream item of one scan request: one or more reports, then `Done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Report(ScanReport),
    Done,
}

/// Scans, then scrolls step by step and rescans, emitting a report whenever
/// either list grew. Stops once the viewport is at the bottom and the page
/// stopped growing, or after `max_iterations` steps; scrolls back to the top
/// and sends `Done`. Returns the last emitted snapshot.
///
/// If the receiver goes away, scanning stops early.
pub async fn scroll_and_collect<P>(
    page: &mut P,
    cfg: &ScrollConfig,
    events: &mpsc::Sender<ScanEvent>,
) -> ScanReport
where
    P: ScrollablePage + ?Sized,
{
    let mut last_height = page.scroll_height();
    let mut current = page.scan();
    let mut listening = events.send(ScanEvent::Report(current.clone())).await.is_ok();

    let mut steps = 0;
    while listening && steps < cfg.max_iterations {
        page.scroll_by(cfg.step_px);
        tokio::time::sleep(cfg.settle_delay()).await;

        let height = page.scroll_height();
        let at_bottom =
            page.viewport_height() + page.scroll_y() >= height.saturating_sub(cfg.bottom_slack_px);

        let next = page.scan();
        if next.all_images.len() > current.all_images.len()
            || next.linked_images.len() > current.linked_images.len()
        {
            tracing::debug!(
                page = page.url(),
                all = next.all_images.len(),
                linked = next.linked_images.len(),
                "scroll revealed new images"
            );
            current = next;
            listening = events.send(ScanEvent::Report(current.clone())).await.is_ok();
        }

        if at_bottom && height == last_height {
            break;
        }
        last_height = height;
        steps += 1;
    }

    if steps >= cfg.max_iterations {
        tracing::debug!(page = page.url(), steps, "scroll limit reached");
    }
    page.scroll_to_top();
    let _ = events.send(ScanEvent::Done).await;
    current
}

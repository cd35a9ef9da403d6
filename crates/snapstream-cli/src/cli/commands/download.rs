//! `snapstream download <page-url>` – scan, filter and download a page's images.

use anyhow::{Context, Result};
use snapstream_core::downloader::{self, BatchSummary, DownloadOptions};

use super::{scan_and_filter, Target};
use crate::cli::FilterArgs;
use crate::session::Session;

fn print_summary(summary: &BatchSummary) {
    for d in &summary.details {
        if d.success {
            let saved = d
                .saved_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("  ok    {}  ->  {}", d.url, saved);
        } else {
            println!("  FAIL  {}  ({})", d.url, d.error.as_deref().unwrap_or("unknown error"));
        }
    }
    println!(
        "{} total, {} downloaded, {} failed",
        summary.total, summary.successful, summary.failed
    );
}

pub async fn run_download(
    session: &mut Session,
    url: &str,
    frames: bool,
    filter: &FilterArgs,
    options: DownloadOptions,
    target: &Target,
    dry_run: bool,
) -> Result<()> {
    let urls = scan_and_filter(session, url, frames, filter).await?;
    if urls.is_empty() {
        println!("No images matched.");
        return Ok(());
    }
    if dry_run {
        for u in &urls {
            println!("{}", u);
        }
        println!("{} images would be downloaded.", urls.len());
        return Ok(());
    }

    let sink = target.sink(session)?;
    let fetcher = session.image_fetcher(None);
    tracing::info!(page = url, count = urls.len(), dest = %sink.root().display(), "starting batch download");

    let summary = tokio::task::spawn_blocking(move || {
        downloader::download_all(&urls, &options, &fetcher, &sink, |p| {
            println!("[{}/{}] {:>3.0}%  {}", p.index, p.total, p.fraction_done() * 100.0, p.url);
        })
    })
    .await
    .context("download task join")?;

    print_summary(&summary);
    if let Some(notice) = summary.failure_notice() {
        eprintln!("{}", notice);
    }
    Ok(())
}

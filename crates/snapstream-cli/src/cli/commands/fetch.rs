//! `snapstream fetch <image-url>` – download one image.

use anyhow::{Context, Result};
use snapstream_core::downloader::{self, DownloadRequest};

use super::Target;
use crate::session::Session;

pub async fn run_fetch(
    session: &Session,
    url: &str,
    name: Option<String>,
    target: &Target,
    referrer: Option<String>,
) -> Result<()> {
    let sink = target.sink(session)?;
    let fetcher = session.image_fetcher(referrer);
    let request = DownloadRequest::single(url, name);

    let result = tokio::task::spawn_blocking(move || {
        downloader::download_one(&request, &fetcher, &sink)
    })
    .await
    .context("download task join")?;

    match (&result.saved_path, &result.error) {
        (Some(path), _) if result.success => {
            println!("Saved {} ({})", path.display(), result.content_type.as_deref().unwrap_or("unknown type"));
            Ok(())
        }
        (_, Some(err)) => anyhow::bail!("{}: {}", url, err),
        _ => anyhow::bail!("{}: download failed", url),
    }
}

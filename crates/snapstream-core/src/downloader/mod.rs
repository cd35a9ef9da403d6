//! Batch image downloader.
//!
//! Processes URLs strictly one at a time (fetch N+1 never starts before N's
//! outcome is recorded). A failing URL produces a failure record and the batch
//! moves on; nothing is retried.

mod progress;
mod result;

pub use progress::BatchProgress;
pub use result::{BatchSummary, DownloadError, DownloadResult};

use crate::content_type::{self, FALLBACK_EXTENSION};
use crate::fetch::ImageFetcher;
use crate::filename;
use crate::storage::ImageSink;

/// Options shared by every image of a batch.
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// User file name (`vacation` → `vacation001.jpg`, ...). None = derive from URL.
    pub filename_template: Option<String>,
    /// Subfolder under the download destination.
    pub folder: Option<String>,
    pub save_as: bool,
}

/// One image queued for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub filename_template: Option<String>,
    pub folder: Option<String>,
    /// 1-based position within the batch.
    pub sequence_index: usize,
    pub total_count: usize,
    pub save_as: bool,
}

impl DownloadRequest {
    /// A single, standalone download.
    pub fn single(url: impl Into<String>, filename: Option<String>) -> Self {
        Self {
            url: url.into(),
            filename_template: filename,
            folder: None,
            sequence_index: 1,
            total_count: 1,
            save_as: false,
        }
    }
}

/// Fetch, classify, name and persist one image.
pub fn download_one<F, S>(request: &DownloadRequest, fetcher: &F, sink: &S) -> DownloadResult
where
    F: ImageFetcher + ?Sized,
    S: ImageSink + ?Sized,
{
    let url = request.url.as_str();
    let image = match fetcher.fetch(url) {
        Ok(image) => image,
        Err(e) => {
            let content_type = match &e {
                crate::fetch::FetchError::DisguisedHtml { content_type } => Some(content_type.clone()),
                _ => None,
            };
            let err = DownloadError::from(e);
            tracing::error!(url, kind = err.kind(), "download failed: {}", err);
            return DownloadResult::failed(url, &err, content_type);
        }
    };

    let extension = content_type::classify(image.content_type.as_deref())
        .extension
        .unwrap_or(FALLBACK_EXTENSION);

    let name = filename::resolve_filename(
        request.filename_template.as_deref(),
        extension,
        &filename::url_path(url),
        request.sequence_index,
        request.total_count,
    );
    let relative = filename::with_folder(request.folder.as_deref(), &name);

    match sink.save(&relative, &image.bytes, request.save_as) {
        Ok(saved_path) => {
            tracing::info!(url, file = %saved_path.display(), "downloaded image");
            DownloadResult {
                success: true,
                url: url.to_string(),
                filename: Some(relative),
                extension: Some(extension.to_string()),
                error_kind: None,
                error: None,
                content_type: image.content_type,
                saved_path: Some(saved_path),
            }
        }
        Err(e) => {
            let err = DownloadError::from(e);
            tracing::error!(url, kind = err.kind(), "download failed: {}", err);
            DownloadResult::failed(url, &err, image.content_type)
        }
    }
}

/// Downloads `urls` in order. `on_progress` is called before each item.
/// Logs one aggregate warning when anything failed.
pub fn download_all<F, S, P>(
    urls: &[String],
    options: &DownloadOptions,
    fetcher: &F,
    sink: &S,
    mut on_progress: P,
) -> BatchSummary
where
    F: ImageFetcher + ?Sized,
    S: ImageSink + ?Sized,
    P: FnMut(&BatchProgress),
{
    let total = urls.len();
    let mut summary = BatchSummary::default();

    for (i, url) in urls.iter().enumerate() {
        let request = DownloadRequest {
            url: url.clone(),
            filename_template: options.filename_template.clone(),
            folder: options.folder.clone(),
            sequence_index: i + 1,
            total_count: total,
            save_as: options.save_as,
        };
        on_progress(&BatchProgress {
            index: i + 1,
            total,
            url: url.clone(),
        });
        summary.record(download_one(&request, fetcher, sink));
    }

    if let Some(notice) = summary.failure_notice() {
        tracing::warn!("{}", notice);
    } else {
        tracing::info!(total, "batch completed");
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{CurlFetcher, FetchError, FetchedImage};
    use crate::storage::{DirectorySink, StorageError};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Canned responses keyed by URL; records the order of calls.
    #[derive(Default)]
    struct FakeFetcher {
        responses: HashMap<String, Result<(Option<&'static str>, Vec<u8>), FetchError>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        fn ok(mut self, url: &str, ct: Option<&'static str>, body: &[u8]) -> Self {
            self.responses.insert(url.to_string(), Ok((ct, body.to_vec())));
            self
        }

        fn err(mut self, url: &str, e: FetchError) -> Self {
            self.responses.insert(url.to_string(), Err(e));
            self
        }
    }

    impl ImageFetcher for FakeFetcher {
        fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError> {
            self.calls.borrow_mut().push(url.to_string());
            match self.responses.get(url) {
                Some(Ok((ct, body))) => Ok(FetchedImage {
                    bytes: body.clone(),
                    content_type: ct.map(str::to_string),
                    final_url: None,
                }),
                Some(Err(e)) => Err(e.clone()),
                None => Err(FetchError::HttpStatus(404)),
            }
        }
    }

    struct FailingSink;

    impl ImageSink for FailingSink {
        fn save(&self, _: &str, _: &[u8], _: bool) -> Result<PathBuf, StorageError> {
            Err(StorageError::InvalidPath("disk says no".to_string()))
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn middle_network_failure_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let fetcher = FakeFetcher::default()
            .ok("http://a.com/1.png", Some("image/png"), b"one")
            .err("http://a.com/2.png", FetchError::Network("connection reset".into()))
            .ok("http://a.com/3.jpg", Some("image/jpeg"), b"three");
        let list = urls(&["http://a.com/1.png", "http://a.com/2.png", "http://a.com/3.jpg"]);

        let mut progress = Vec::new();
        let summary = download_all(&list, &DownloadOptions::default(), &fetcher, &sink, |p| {
            progress.push(p.index)
        });

        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.details.len(), 3);
        let order: Vec<_> = summary.details.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(order, list.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(summary.details[1].error_kind.as_deref(), Some("network"));
        assert_eq!(progress, vec![1, 2, 3]);
        assert_eq!(*fetcher.calls.borrow(), list);
        assert_eq!(std::fs::read(dir.path().join("3.jpg")).unwrap(), b"three");
    }

    #[test]
    fn extension_comes_from_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let fetcher = FakeFetcher::default().ok("http://a.com/img/photo.jpg", Some("image/webp"), b"w");
        let r = download_one(
            &DownloadRequest::single("http://a.com/img/photo.jpg", None),
            &fetcher,
            &sink,
        );
        assert!(r.success);
        assert_eq!(r.filename.as_deref(), Some("photo.webp"));
        assert_eq!(r.extension.as_deref(), Some("webp"));
        assert_eq!(r.saved_path, Some(dir.path().join("photo.webp")));
    }

    #[test]
    fn unknown_type_falls_back_to_jpg() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let fetcher = FakeFetcher::default().ok("http://a.com/x.png", Some("application/octet-stream"), b"?");
        let r = download_one(&DownloadRequest::single("http://a.com/x.png", None), &fetcher, &sink);
        assert!(r.success);
        assert_eq!(r.extension.as_deref(), Some("jpg"));
        assert!(content_type::is_known_extension(r.extension.as_deref().unwrap()));
    }

    #[test]
    fn disguised_html_is_reported_with_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let fetcher = FakeFetcher::default().err(
            "http://a.com/x.png",
            FetchError::DisguisedHtml {
                content_type: "text/html".into(),
            },
        );
        let r = download_one(&DownloadRequest::single("http://a.com/x.png", None), &fetcher, &sink);
        assert!(!r.success);
        assert_eq!(r.error_kind.as_deref(), Some("disguised_html"));
        assert_eq!(r.content_type.as_deref(), Some("text/html"));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn storage_failure_is_recorded() {
        let fetcher = FakeFetcher::default().ok("http://a.com/x.png", Some("image/png"), b"p");
        let summary = download_all(
            &urls(&["http://a.com/x.png"]),
            &DownloadOptions::default(),
            &fetcher,
            &FailingSink,
            |_| {},
        );
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.details[0].error_kind.as_deref(), Some("storage"));
        assert_eq!(summary.details[0].content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn template_and_folder_number_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let fetcher = FakeFetcher::default()
            .ok("http://a.com/a.png", Some("image/png"), b"a")
            .ok("http://a.com/b", Some("image/gif"), b"b");
        let options = DownloadOptions {
            filename_template: Some("trip".to_string()),
            folder: Some("holiday".to_string()),
            save_as: false,
        };
        let summary = download_all(
            &urls(&["http://a.com/a.png", "http://a.com/b"]),
            &options,
            &fetcher,
            &sink,
            |_| {},
        );
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.details[0].filename.as_deref(), Some("holiday/trip001.png"));
        assert_eq!(summary.details[1].filename.as_deref(), Some("holiday/trip002.gif"));
        assert!(dir.path().join("holiday").join("trip002.gif").exists());
    }

    #[test]
    fn long_url_name_still_saves() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let url = format!("http://a.com/{}.jpg", "a".repeat(254));
        let fetcher = FakeFetcher::default().ok(&url, Some("image/png"), b"p");
        let r = download_one(&DownloadRequest::single(url.as_str(), None), &fetcher, &sink);
        assert!(r.success, "{:?}", r.error);
        let saved = r.saved_path.unwrap();
        assert_eq!(std::fs::read(&saved).unwrap(), b"p");
        assert_eq!(saved.extension().and_then(|e| e.to_str()), Some("png"));
    }

    #[test]
    fn inline_image_saves_under_generated_name() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let url = "data:image/png;base64,iVBORw0KGgo=";
        let r = download_one(&DownloadRequest::single(url, None), &CurlFetcher::default(), &sink);
        assert!(r.success, "{:?}", r.error);
        assert_eq!(r.extension.as_deref(), Some("png"));
        let name = r.filename.unwrap();
        assert!(name.starts_with("image_") && name.ends_with(".png"), "{name}");
        assert_eq!(std::fs::read(r.saved_path.unwrap()).unwrap(), b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn empty_batch() {
        let fetcher = FakeFetcher::default();
        let summary = download_all(&[], &DownloadOptions::default(), &fetcher, &FailingSink, |_| {});
        assert_eq!(summary, BatchSummary::default());
        assert!(summary.failure_notice().is_none());
    }
}

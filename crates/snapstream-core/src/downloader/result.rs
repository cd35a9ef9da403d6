//! Per-image outcomes and the batch summary.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::fetch::FetchError;
use crate::storage::StorageError;

/// Any stage of one image download failing.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl DownloadError {
    pub fn kind(&self) -> &'static str {
        match self {
            DownloadError::Fetch(e) => e.kind(),
            DownloadError::Storage(_) => "storage",
        }
    }
}

/// Terminal record for one requested URL. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadResult {
    pub success: bool,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Where the bytes landed (stands in for a browser download id).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_path: Option<PathBuf>,
}

impl DownloadResult {
    pub(crate) fn failed(url: &str, err: &DownloadError, content_type: Option<String>) -> Self {
        Self {
            success: false,
            url: url.to_string(),
            filename: None,
            extension: None,
            error_kind: Some(err.kind().to_string()),
            error: Some(err.to_string()),
            content_type,
            saved_path: None,
        }
    }
}

/// Folded from DownloadResults in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub details: Vec<DownloadResult>,
}

impl BatchSummary {
    pub fn record(&mut self, result: DownloadResult) {
        self.total += 1;
        if result.success {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
        self.details.push(result);
    }

    /// The single user-facing notice for a batch with failures.
    pub fn failure_notice(&self) -> Option<String> {
        if self.failed == 0 {
            return None;
        }
        Some(format!(
            "Downloaded {} images successfully. {} failed. URLs may not be direct image links or there may be network issues.",
            self.successful, self.failed
        ))
    }
}

impl FromIterator<DownloadResult> for BatchSummary {
    fn from_iter<I: IntoIterator<Item = DownloadResult>>(iter: I) -> Self {
        let mut summary = BatchSummary::default();
        for r in iter {
            summary.record(r);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(url: &str) -> DownloadResult {
        DownloadResult {
            success: true,
            url: url.to_string(),
            filename: Some("a.png".to_string()),
            extension: Some("png".to_string()),
            error_kind: None,
            error: None,
            content_type: Some("image/png".to_string()),
            saved_path: None,
        }
    }

    #[test]
    fn totals_always_add_up() {
        let err = DownloadError::Fetch(FetchError::HttpStatus(404));
        let summary: BatchSummary = vec![
            ok("a"),
            DownloadResult::failed("b", &err, None),
            ok("c"),
        ]
        .into_iter()
        .collect();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total, summary.successful + summary.failed);
        assert_eq!(summary.details[1].error_kind.as_deref(), Some("http_status"));
        assert_eq!(summary.details[1].error.as_deref(), Some("server returned status 404"));
    }

    #[test]
    fn notice_only_on_failure() {
        let clean: BatchSummary = vec![ok("a")].into_iter().collect();
        assert!(clean.failure_notice().is_none());

        let err = DownloadError::Fetch(FetchError::Network("reset".into()));
        let mixed: BatchSummary = vec![ok("a"), DownloadResult::failed("b", &err, None)]
            .into_iter()
            .collect();
        let notice = mixed.failure_notice().unwrap();
        assert!(notice.starts_with("Downloaded 1 images successfully. 1 failed."));
    }
}

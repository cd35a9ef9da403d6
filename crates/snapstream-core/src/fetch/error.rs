//! Fetch error type.

use thiserror::Error;

/// Why a candidate URL could not be turned into image bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failed (DNS, TLS, connection reset, invalid URL). Not retried.
    #[error("network error: {0}")]
    Network(String),
    /// Server answered with a non-2xx status.
    #[error("server returned status {0}")]
    HttpStatus(u32),
    /// Server answered 2xx with an HTML page where an image was expected.
    #[error("URL returned an HTML page, not an image (Content-Type: {content_type})")]
    DisguisedHtml { content_type: String },
    /// URL scheme the network fetcher cannot handle (e.g. inline `data:` images).
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    /// `data:` URL without a payload separator or with a bad base64 payload.
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),
}

impl FetchError {
    /// Short machine-friendly kind, used in logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network",
            FetchError::HttpStatus(_) => "http_status",
            FetchError::DisguisedHtml { .. } => "disguised_html",
            FetchError::UnsupportedScheme(_) => "unsupported_scheme",
            FetchError::InvalidDataUrl(_) => "invalid_data_url",
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Network(e.to_string())
    }
}

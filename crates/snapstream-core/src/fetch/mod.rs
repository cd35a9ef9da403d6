//! Robust HTTP fetching for image candidates and scanned pages.
//!
//! Uses the curl crate (libcurl). An image fetch only succeeds when the server
//! answered 2xx and the `Content-Type` is not HTML: sites that serve a login
//! wall or a soft 404 page under an image-looking URL are rejected here instead
//! of being saved with an image extension. Inline `data:` images are decoded
//! locally and go through the same guards.

mod data_url;
mod error;
mod parse;

pub use data_url::is_data_url;
pub use error::FetchError;

use anyhow::{Context, Result};
use std::str;
use std::time::Duration;

use crate::content_type;

/// Headers the pipeline cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}

/// Unvalidated result of a GET.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u32,
    pub headers: ResponseHeaders,
    pub body: Vec<u8>,
    /// URL after redirects, if the transport reported one.
    pub final_url: Option<String>,
}

/// Image bytes that passed the status and disguised-HTML guards.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub final_url: Option<String>,
}

/// Source of image bytes. The batch downloader only talks to this trait.
pub trait ImageFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError>;
}

/// Request options shared by page and image GETs.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub user_agent: Option<String>,
    /// Page origin sent as `Referer` and `Origin` (some hosts refuse hotlinked images otherwise).
    pub referrer: Option<String>,
    pub connect_timeout: Option<Duration>,
}

impl FetchOptions {
    pub fn from_config(cfg: &crate::config::SnapConfig) -> Self {
        Self {
            user_agent: Some(cfg.user_agent.clone()),
            referrer: None,
            connect_timeout: cfg.connect_timeout(),
        }
    }

    pub fn with_referrer(mut self, origin: Option<String>) -> Self {
        self.referrer = origin;
        self
    }

    fn header_lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(origin) = &self.referrer {
            out.push(format!("Referer: {}", origin.trim()));
            out.push(format!("Origin: {}", origin.trim()));
        }
        out
    }
}

/// Applies the image guards to a raw response.
///
/// - non-2xx: `HttpStatus`
/// - body shorter than `Content-Length`: `Network`
/// - HTML `Content-Type`: `DisguisedHtml`
/// - anything else not `image/*`: accepted with a warning
pub fn validate_image_response(url: &str, raw: RawResponse) -> Result<FetchedImage, FetchError> {
    if !(200..300).contains(&raw.status) {
        tracing::error!(url, status = raw.status, "server returned error status");
        return Err(FetchError::HttpStatus(raw.status));
    }
    if let Some(expected) = raw.headers.content_length {
        let received = raw.body.len() as u64;
        if received < expected {
            tracing::error!(url, expected, received, "response body truncated");
            return Err(FetchError::Network(format!(
                "truncated response: got {} of {} bytes",
                received, expected
            )));
        }
    }

    let content_type = raw.headers.content_type;
    let class = content_type::classify(content_type.as_deref());
    if class.is_html {
        let ct = content_type.unwrap_or_default();
        tracing::warn!(url, content_type = %ct, "aborting: URL returned an HTML page, not an image");
        return Err(FetchError::DisguisedHtml { content_type: ct });
    }
    if !class.is_image {
        tracing::warn!(
            url,
            content_type = content_type.as_deref().unwrap_or("<none>"),
            "Content-Type is not an image type; keeping payload"
        );
    }

    Ok(FetchedImage {
        bytes: raw.body,
        content_type,
        final_url: raw.final_url,
    })
}

/// Blocking libcurl fetcher. Call from `spawn_blocking` if used from async code.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    options: FetchOptions,
}

impl CurlFetcher {
    pub fn new(options: FetchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Plain GET: follows redirects, collects headers and body, no validation.
    /// `data:` URLs are refused here; [`ImageFetcher::fetch`] decodes them.
    pub fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        if let Some((scheme, _)) = url.split_once(':') {
            if scheme.eq_ignore_ascii_case("data") {
                return Err(FetchError::UnsupportedScheme("data".to_string()));
            }
        }

        let mut header_lines: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        if let Some(t) = self.options.connect_timeout {
            easy.connect_timeout(t)?;
        }
        if let Some(ua) = &self.options.user_agent {
            easy.useragent(ua)?;
        }

        let extra = self.options.header_lines();
        if !extra.is_empty() {
            let mut list = curl::easy::List::new();
            for line in &extra {
                list.append(line)?;
            }
            easy.http_headers(list)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        let final_url = easy.effective_url()?.map(str::to_string);

        Ok(RawResponse {
            status,
            headers: parse::parse_headers(&header_lines),
            body,
            final_url,
        })
    }

    /// GET an HTML page for scanning. Non-2xx is an error; the body is decoded lossily.
    pub fn get_page(&self, url: &str) -> Result<(String, String)> {
        let raw = self
            .get(url)
            .with_context(|| format!("GET page {}", url))?;
        if !(200..300).contains(&raw.status) {
            anyhow::bail!("GET {} returned HTTP {}", url, raw.status);
        }
        let final_url = raw.final_url.unwrap_or_else(|| url.to_string());
        Ok((final_url, String::from_utf8_lossy(&raw.body).into_owned()))
    }
}

impl ImageFetcher for CurlFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError> {
        let raw = if is_data_url(url) {
            data_url::decode(url)
        } else {
            self.get(url)
        };
        let raw = raw.map_err(|e| {
            tracing::error!(url, error = %e, "fetch failed");
            e
        })?;
        validate_image_response(url, raw)
    }
}

//! Content-Type classification.
//!
//! Maps a raw `Content-Type` header to a file extension and decides whether the
//! payload is HTML or an image. Parameters such as `charset` are ignored.

/// MIME type to extension. Stable contract: keys and values must not change.
const MIME_TYPE_TO_EXTENSION: &[(&str, &str)] = &[
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
    ("image/svg+xml", "svg"),
    ("image/bmp", "bmp"),
    ("image/x-icon", "ico"),
    ("image/vnd.microsoft.icon", "ico"),
    ("image/tiff", "tiff"),
    ("image/x-tiff", "tiff"),
    ("image/jfif", "jfif"),
];

/// Extension used when a response passes the HTML guard but its type is unknown.
pub const FALLBACK_EXTENSION: &str = "jpg";

/// Result of classifying one `Content-Type` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub extension: Option<&'static str>,
    pub is_html: bool,
    pub is_image: bool,
}

/// Bare, lower-cased MIME type with parameters stripped.
pub fn mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Classifies a `Content-Type` header. A missing header yields the default (all false, no extension).
pub fn classify(content_type: Option<&str>) -> Classification {
    let Some(raw) = content_type else {
        return Classification::default();
    };
    let mime = mime_type(raw);
    Classification {
        extension: extension_for_mime(&mime),
        is_html: mime == "text/html" || mime == "application/xhtml+xml",
        is_image: mime.starts_with("image/"),
    }
}

/// Extension for a bare MIME type, if it is in the table.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    MIME_TYPE_TO_EXTENSION
        .iter()
        .find(|(m, _)| *m == mime)
        .map(|(_, ext)| *ext)
}

/// True if `ext` is one of the extensions this classifier can produce.
pub fn is_known_extension(ext: &str) -> bool {
    MIME_TYPE_TO_EXTENSION.iter().any(|(_, e)| *e == ext)
}

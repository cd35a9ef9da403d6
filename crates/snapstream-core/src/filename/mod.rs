//! Filename resolution for downloaded images.
//!
//! The extension always comes from the fetched `Content-Type`, never from the
//! URL or the user's template.

mod path;
mod sanitize;

pub use path::{last_segment, url_path};
pub use sanitize::sanitize_segment;

use std::time::{SystemTime, UNIX_EPOCH};

use crate::storage::TEMP_SUFFIX;
use sanitize::{truncate_bytes, NAME_MAX};

/// Minimum width of the batch sequence number (`vacation003.jpg`).
const MIN_SEQUENCE_WIDTH: usize = 3;

/// Derives the file name for one image.
///
/// - no template: last segment of `url_path` with its extension replaced, or
///   `image_<unix-millis>.<ext>` when the segment has no extension
/// - template: its own extension (if any) is replaced by `extension`; when
///   `total_count > 1` a zero-padded `sequence_index` is inserted before it
///
/// The stem is shortened so that the name, including the staging suffix
/// added while the file is written, fits in one path segment.
///
/// Never returns an empty string.
pub fn resolve_filename(
    template: Option<&str>,
    extension: &str,
    url_path: &str,
    sequence_index: usize,
    total_count: usize,
) -> String {
    let template = template.map(str::trim).filter(|t| !t.is_empty());
    let budget = NAME_MAX.saturating_sub(extension.len() + 1 + TEMP_SUFFIX.len());

    let stem = match template {
        None => last_segment(url_path)
            .filter(|seg| seg.contains('.'))
            .map(|seg| truncate_bytes(&sanitize_segment(strip_extension(seg)), budget).to_string())
            .filter(|s| !s.is_empty()),
        Some(t) => {
            let stem = sanitize_segment(strip_extension(t));
            if stem.is_empty() {
                None
            } else if total_count > 1 {
                let seq = sequence_number(sequence_index, total_count);
                let head = truncate_bytes(&stem, budget.saturating_sub(seq.len()));
                Some(format!("{}{}", head, seq))
            } else {
                Some(truncate_bytes(&stem, budget).to_string())
            }
        }
    };

    let stem = stem.unwrap_or_else(timestamped_stem);
    format!("{}.{}", stem, extension)
}

/// Prepends an optional folder as a path segment (`folder/name`).
pub fn with_folder(folder: Option<&str>, filename: &str) -> String {
    match folder.map(|f| f.trim().trim_end_matches('/')).filter(|f| !f.is_empty()) {
        Some(f) => format!("{}/{}", f, filename),
        None => filename.to_string(),
    }
}

/// Zero-padded to the digit count of `total_count` (at least three digits).
pub fn sequence_number(sequence_index: usize, total_count: usize) -> String {
    let width = total_count.to_string().len().max(MIN_SEQUENCE_WIDTH);
    format!("{:0width$}", sequence_index, width = width)
}

/// Drops everything from the last `.`; names without a dot are returned unchanged.
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

fn timestamped_stem() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("image_{}", millis)
}

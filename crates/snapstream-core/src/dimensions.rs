//! Image dimensions for the filter's width/height bounds.
//!
//! Declared `width`/`height` attributes seen by the scanner are a hint; the
//! natural size comes from decoding just the image header of fetched bytes
//! and replaces the hint once known.

use serde::{Deserialize, Serialize};
use std::io::Cursor;

use crate::fetch::ImageFetcher;
use crate::scanner::DiscoverySet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// From HTML `width`/`height` attribute values (`"640"`, `"640px"`). Both must parse.
    pub fn from_attributes(width: Option<&str>, height: Option<&str>) -> Option<Self> {
        Some(Self {
            width: parse_pixels(width?)?,
            height: parse_pixels(height?)?,
        })
    }
}

fn parse_pixels(value: &str) -> Option<u32> {
    let v = value.trim();
    let v = v.strip_suffix("px").unwrap_or(v).trim();
    v.parse::<u32>().ok()
}

/// Reads dimensions from the image header; `None` if the format is not recognised.
pub fn decode_dimensions(bytes: &[u8]) -> Option<Dimensions> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    let (width, height) = reader.into_dimensions().ok()?;
    Some(Dimensions { width, height })
}

/// Fetches every candidate whose natural size is not yet known, including
/// those with only declared attributes, and records what decodes. On failure
/// the declared size (or unknown, which the filter treats as "passes") stays.
/// Returns how many URLs got natural dimensions.
pub fn measure_candidates<F>(set: &mut DiscoverySet, fetcher: &F) -> usize
where
    F: ImageFetcher + ?Sized,
{
    let missing: Vec<String> = set
        .candidates()
        .into_iter()
        .map(|c| c.url)
        .filter(|url| !set.has_natural_dimensions(url))
        .collect();

    let mut found = 0;
    for url in missing {
        match fetcher.fetch(&url) {
            Ok(image) => match decode_dimensions(&image.bytes) {
                Some(d) => {
                    set.set_natural_dimensions(&url, d);
                    found += 1;
                }
                None => tracing::debug!(url, "could not read image dimensions"),
            },
            Err(e) => tracing::debug!(url, "could not fetch image for its dimensions: {}", e),
        }
    }
    found
}

//! Inline `data:` URLs (`data:image/png;base64,...`), decoded without a network round trip.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use percent_encoding::percent_decode_str;

use super::{FetchError, RawResponse, ResponseHeaders};

/// Media type assumed when a `data:` URL omits it.
const DEFAULT_MEDIA_TYPE: &str = "text/plain;charset=US-ASCII";

pub fn is_data_url(url: &str) -> bool {
    url.get(..5).is_some_and(|s| s.eq_ignore_ascii_case("data:"))
}

/// Decodes a `data:` URL into a 200 response whose `Content-Type` is the
/// declared media type (`;base64` removed), so the usual guards apply.
pub(crate) fn decode(url: &str) -> Result<RawResponse, FetchError> {
    if !is_data_url(url) {
        return Err(FetchError::InvalidDataUrl("missing data: prefix".to_string()));
    }
    let (meta, payload) = url[5..]
        .split_once(',')
        .ok_or_else(|| FetchError::InvalidDataUrl("missing ',' separator".to_string()))?;

    let mut params: Vec<&str> = meta.split(';').map(str::trim).collect();
    let is_base64 = params
        .last()
        .is_some_and(|p| p.eq_ignore_ascii_case("base64"));
    if is_base64 {
        params.pop();
    }
    let media_type = params.join(";");
    let content_type = if media_type.is_empty() {
        DEFAULT_MEDIA_TYPE.to_string()
    } else {
        media_type
    };

    let raw: Vec<u8> = percent_decode_str(payload).collect();
    let body = if is_base64 {
        let compact: Vec<u8> = raw.into_iter().filter(|b| !b.is_ascii_whitespace()).collect();
        STANDARD
            .decode(&compact)
            .or_else(|_| STANDARD_NO_PAD.decode(&compact))
            .map_err(|e| FetchError::InvalidDataUrl(e.to_string()))?
    } else {
        raw
    };

    Ok(RawResponse {
        status: 200,
        headers: ResponseHeaders {
            content_type: Some(content_type),
            content_length: Some(body.len() as u64),
        },
        body,
        final_url: None,
    })
}

//! Path helpers for image URLs.

/// Path component of `url` (`https://a.com/x/y.png?q=1` → `/x/y.png`).
/// Falls back to the raw string without query/fragment when it does not parse.
/// URLs without a hierarchical path (`data:`, `blob:`) give an empty path.
pub fn url_path(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) if parsed.cannot_be_a_base() => String::new(),
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Last non-empty segment of a URL path, ignoring `.` and `..`.
pub fn last_segment(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').find(|s| !s.is_empty())?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment)
}

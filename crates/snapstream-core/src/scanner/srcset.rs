//! `srcset` attribute parsing.

/// URLs of every candidate in a `srcset` value (`a.png 1x, b.png 2x` → `[a.png, b.png]`).
/// Width/density descriptors are dropped.
pub fn srcset_urls(srcset: &str) -> Vec<&str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .filter(|url| !url.is_empty())
        .collect()
}

//! Compiled patterns used by the page scanner.

#![allow(clippy::expect_used)]

use regex::Regex;
use std::sync::LazyLock;

/// Path ending in a known image extension, optionally followed by `?query` and/or `#fragment`.
pub static IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[^?#]*\.(?:bmp|gif|ico|jfif|jpe?g|png|svg|tiff?|webp)(?:\?[^#]*)?(?:#.*)?$")
        .expect("IMAGE_URL regex")
});

/// `url(...)` references inside a CSS value, quotes optional.
pub static CSS_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(\s*(?:"([^"]*)"|'([^']*)'|([^)'"]*))\s*\)"#).expect("CSS_URL regex")
});

/// `background` / `background-image` declarations (value up to `;` or `}`).
pub static BACKGROUND_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)background(?:-image)?\s*:\s*([^;}]*)").expect("BACKGROUND_DECL regex")
});

/// True for inline image data or a URL whose path has an image extension.
pub fn is_image_url(url: &str) -> bool {
    url.starts_with("data:image") || IMAGE_URL.is_match(url)
}

/// Every `url(...)` in a `background`/`background-image` declaration of `css`.
pub fn background_urls(css: &str) -> Vec<String> {
    BACKGROUND_DECL
        .captures_iter(css)
        .filter_map(|decl| decl.get(1))
        .flat_map(|value| {
            CSS_URL
                .captures_iter(value.as_str())
                .filter_map(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
                .map(|m| m.as_str().trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|u| !u.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extensions() {
        for url in [
            "http://a.com/x.png",
            "http://a.com/x.JPG",
            "http://a.com/x.jpeg?w=100",
            "http://a.com/x.tif#frag",
            "http://a.com/x.tiff?a=b#c",
            "/rel/x.webp",
            "http://a.com/x.jfif",
            "http://a.com/x.svg",
            "http://a.com/favicon.ico",
            "http://a.com/x.bmp",
            "http://a.com/x.gif",
        ] {
            assert!(is_image_url(url), "{url}");
        }
    }

    #[test]
    fn non_image_urls() {
        for url in [
            "http://a.com/page.html",
            "http://a.com/x.php?img=a.png",
            "http://a.com/x.pngx",
            "http://a.com/",
        ] {
            assert!(!is_image_url(url), "{url}");
        }
    }

    #[test]
    fn data_images() {
        assert!(is_image_url("data:image/png;base64,AAAA"));
        assert!(!is_image_url("data:text/plain,hi"));
    }

    #[test]
    fn background_values() {
        let css = r#"background-image: url("/a.png"); color: red; background: #fff url('b.jpg') no-repeat"#;
        assert_eq!(background_urls(css), vec!["/a.png", "b.jpg"]);
        assert_eq!(background_urls("background-image:url(c.gif)"), vec!["c.gif"]);
        assert!(background_urls("color: blue; border-image: url(x.png)").is_empty());
        assert!(background_urls("background: none").is_empty());
    }

    #[test]
    fn background_multiple_layers() {
        let css = ".hero { background-image: url(a.png), url( \"b.png\" ) }";
        assert_eq!(background_urls(css), vec!["a.png", "b.png"]);
    }
}

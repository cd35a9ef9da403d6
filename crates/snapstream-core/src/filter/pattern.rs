//! Text matchers behind the three filter modes.

use regex::Regex;

use super::FilterMode;

#[derive(Debug, thiserror::Error)]
#[error("invalid filter pattern {pattern:?}: {source}")]
pub(crate) struct PatternError {
    pattern: String,
    #[source]
    source: regex::Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Term {
    needle: String,
    expected: bool,
}

/// Compiled form of the filter text, built once per evaluation.
#[derive(Debug)]
pub(crate) enum TextMatcher {
    /// Empty text: everything passes.
    Any,
    /// Normal mode: every term must hold.
    Terms(Vec<Term>),
    Pattern(Regex),
    /// The pattern did not compile: nothing passes.
    Nothing,
}

impl TextMatcher {
    pub(crate) fn new(mode: FilterMode, text: &str) -> Self {
        if text.is_empty() {
            return Self::Any;
        }
        let compiled = match mode {
            FilterMode::Normal => return Self::Terms(parse_terms(text)),
            FilterMode::Wildcard => compile(&wildcard_to_regex(text)),
            FilterMode::Regex => compile(text),
        };
        match compiled {
            Ok(re) => Self::Pattern(re),
            Err(e) => {
                tracing::debug!("{}", e);
                Self::Nothing
            }
        }
    }

    pub(crate) fn matches(&self, url: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Terms(terms) => terms.iter().all(|t| url.contains(&t.needle) == t.expected),
            Self::Pattern(re) => re.is_match(url),
            Self::Nothing => false,
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(pattern).map_err(|source| PatternError {
        pattern: pattern.to_string(),
        source,
    })
}

/// Whitespace-separated terms; `-term` must be absent. Empty terms and a lone `-` are dropped.
fn parse_terms(text: &str) -> Vec<Term> {
    text.split_whitespace()
        .filter_map(|raw| match raw.strip_prefix('-') {
            Some("") => None,
            Some(rest) => Some(Term {
                needle: rest.to_string(),
                expected: false,
            }),
            None => Some(Term {
                needle: raw.to_string(),
                expected: true,
            }),
        })
        .collect()
}

/// `*` matches any run, `?` any single character; everything else is literal.
pub(crate) fn wildcard_to_regex(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    out
}

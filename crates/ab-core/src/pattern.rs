//! URL pattern evaluation
//!
//! A trigger's `url-filter` is a regular expression evaluated against the full
//! absolute URL. Two literal forms mean "any URL" and never reach the regex
//! engine. Everything else is compiled once per rule and cached by the caller.

use regex::{Regex, RegexBuilder};

/// Patterns that match every URL.
pub const UNIVERSAL_PATTERNS: [&str; 2] = [".*", r"^[htpsw]+:\/\/"];

/// Compiled programs above this size fall back to substring matching.
const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Error produced when a url-filter cannot be compiled.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("invalid url-filter regex: {0}")]
    Regex(#[from] regex::Error),
}

/// Lowercase `text` for shortcut checks and case-insensitive substring search.
///
/// `ſ` (long s) is also mapped to `s`: case-insensitive regexes treat the two
/// as equal, and it is the only character besides the Kelvin sign that folds
/// to ASCII (the Kelvin sign already lowercases to `k`).
pub fn fold_case(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == '\u{17f}' { 's' } else { c })
        .collect()
}

/// Check whether a pattern is one of the match-everything forms.
#[inline]
pub fn is_universal(pattern: &str) -> bool {
    UNIVERSAL_PATTERNS.contains(&pattern)
}

/// Return the body of a `/.../` regex literal, or `None` for other patterns.
#[inline]
pub fn regex_literal_body(pattern: &str) -> Option<&str> {
    if pattern.len() > 2 && pattern.starts_with('/') && pattern.ends_with('/') {
        Some(&pattern[1..pattern.len() - 1])
    } else {
        None
    }
}

/// A url-filter ready for evaluation.
#[derive(Debug, Clone)]
pub enum CompiledPattern {
    /// One of [`UNIVERSAL_PATTERNS`]
    MatchAll,
    /// Compiled regular expression
    Regex(Regex),
    /// Regex compilation failed; the raw pattern text is searched as a substring.
    /// Stored lowercased unless the rule is case-sensitive.
    Substring { needle: String, case_sensitive: bool },
}

impl CompiledPattern {
    /// Compile a url-filter. Never fails: invalid regexes degrade to
    /// [`CompiledPattern::Substring`].
    pub fn compile(pattern: &str, case_sensitive: bool) -> Self {
        if is_universal(pattern) {
            return Self::MatchAll;
        }

        let source = regex_literal_body(pattern).unwrap_or(pattern);
        match compile_regex(source, case_sensitive) {
            Ok(regex) => Self::Regex(regex),
            Err(e) => {
                log::debug!("url-filter {:?} falls back to substring matching: {}", pattern, e);
                let needle = if case_sensitive {
                    source.to_string()
                } else {
                    fold_case(source)
                };
                Self::Substring {
                    needle,
                    case_sensitive,
                }
            }
        }
    }

    /// Evaluate against a URL. `lower_url` must be [`fold_case`] of `url`.
    pub fn is_match(&self, url: &str, lower_url: &str) -> bool {
        match self {
            Self::MatchAll => true,
            Self::Regex(regex) => regex.is_match(url),
            Self::Substring {
                needle,
                case_sensitive,
            } => {
                if needle.is_empty() {
                    return false;
                }
                if *case_sensitive {
                    url.contains(needle.as_str())
                } else {
                    lower_url.contains(needle.as_str())
                }
            }
        }
    }
}

fn compile_regex(source: &str, case_sensitive: bool) -> Result<Regex, PatternError> {
    let regex = RegexBuilder::new(source)
        .case_insensitive(!case_sensitive)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()?;
    Ok(regex)
}

//! Shortcut derivation
//!
//! A shortcut is the longest literal run of a url-filter. Any URL the filter
//! matches must contain it, so the index can key the rule by it and the matcher
//! can reject a URL with a substring check before running the regex.
//!
//! A literal run ends at every regex metacharacter. Groups `(...)`, classes
//! `[...]`, repetition counts `{...}` and two-character escapes are removed
//! whole. A character followed by `*`, `?` or `{` is optional and is dropped
//! from its run. Runs also end at non-ASCII characters.

use ab_core::pattern::{fold_case, is_universal, regex_literal_body};

/// Derive the lowercased shortcut of a url-filter, if it has a usable one.
pub fn derive_shortcut(pattern: &str) -> Option<String> {
    if pattern.is_empty() || is_universal(pattern) {
        return None;
    }

    let segments = match regex_literal_body(pattern) {
        Some(body) => {
            // Optional parts are too easy to get wrong in delimited regexes
            if body.contains('?') {
                return None;
            }
            literal_segments(body)?
        }
        None => literal_segments(pattern)?,
    };

    let mut longest: Option<String> = None;
    for segment in segments {
        let len = segment.chars().count();
        if longest.as_ref().map_or(true, |l| len > l.chars().count()) {
            longest = Some(segment);
        }
    }

    longest
        .filter(|s| s.chars().count() > 1)
        .map(|s| fold_case(&s))
}

/// Split a regex source into its literal runs.
///
/// Returns `None` when the source has a top-level alternation, since no single
/// run is then required.
fn literal_segments(source: &str) -> Option<Vec<String>> {
    let chars: Vec<char> = source.chars().collect();
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                flush(&mut current, &mut segments);
                i += 2;
                continue;
            }
            '(' | '[' | '{' => {
                if c == '{' {
                    current.pop();
                }
                flush(&mut current, &mut segments);
                i = skip_group(&chars, i);
                continue;
            }
            '*' | '?' => {
                current.pop();
                flush(&mut current, &mut segments);
            }
            '|' => return None,
            '.' | '+' | '^' | '$' | ')' | ']' | '}' => {
                flush(&mut current, &mut segments);
            }
            // Non-ASCII letters have case variants lowercasing does not reach
            _ if !c.is_ascii() => flush(&mut current, &mut segments),
            _ => current.push(c),
        }
        i += 1;
    }

    flush(&mut current, &mut segments);
    Some(segments)
}

fn flush(current: &mut String, segments: &mut Vec<String>) {
    if !current.is_empty() {
        segments.push(std::mem::take(current));
    }
}

/// Return the position after the bracket that closes the one at `start`.
/// Unbalanced groups run to the end of the input.
fn skip_group(chars: &[char], start: usize) -> usize {
    let open = chars[start];
    if open == '[' {
        return skip_class(chars, start);
    }
    let close = if open == '(' { ')' } else { '}' };

    let mut depth = 0usize;
    let mut i = start;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            i += 2;
            continue;
        }
        if c == '[' && open == '(' {
            i = skip_class(chars, i);
            continue;
        }
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return i + 1;
            }
        }
        i += 1;
    }

    chars.len()
}

/// Skip a character class, nested classes included. A `]` right after the
/// opening bracket (or after `[^`) is a literal member.
fn skip_class(chars: &[char], start: usize) -> usize {
    let mut depth = 0usize;
    let mut i = start;
    while i < chars.len() {
        match chars[i] {
            '\\' => {
                i += 2;
                continue;
            }
            '[' => {
                depth += 1;
                i += 1;
                if chars.get(i) == Some(&'^') {
                    i += 1;
                }
                if chars.get(i) == Some(&']') {
                    i += 1;
                }
                continue;
            }
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    chars.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universal_patterns_have_no_shortcut() {
        assert_eq!(derive_shortcut(".*"), None);
        assert_eq!(derive_shortcut(r"^[htpsw]+:\/\/"), None);
        assert_eq!(derive_shortcut(""), None);
    }

    #[test]
    fn test_plain_patterns() {
        // The character before '*' is optional
        assert_eq!(derive_shortcut("example.com/Banner*"), Some("com/banne".into()));
        assert_eq!(derive_shortcut("ads^tracker|"), None);
        assert_eq!(derive_shortcut("/ad-frame*script"), Some("/ad-fram".into()));
        assert_eq!(derive_shortcut(r"^https?:\/\/ads\.example\.com"), Some("example".into()));
    }

    #[test]
    fn test_optional_characters_are_dropped() {
        // "https" would be wrong: the 's' is optional
        assert_eq!(derive_shortcut("https?x"), Some("http".into()));
        assert_eq!(derive_shortcut("bannerz*"), Some("banner".into()));
        assert_eq!(derive_shortcut("bannerz{0,3}ab"), Some("banner".into()));
    }

    #[test]
    fn test_regex_literal_patterns() {
        assert_eq!(derive_shortcut("/banner[0-9]+/"), Some("banner".into()));
        assert_eq!(derive_shortcut(r"/ads\.(js|css)\/tracking/"), Some("tracking".into()));
        assert_eq!(derive_shortcut("/ads?tracker/"), None);
    }

    #[test]
    fn test_groups_are_removed_whole() {
        assert_eq!(derive_shortcut("(a|b)cd[xyz]e"), Some("cd".into()));
        assert_eq!(derive_shortcut("x((nested)long)yz"), Some("yz".into()));
        assert_eq!(derive_shortcut("ads(unclosed"), Some("ads".into()));
    }

    #[test]
    fn test_class_members_do_not_leak() {
        // Leading ']' is a class member, not the end of the class
        assert_eq!(derive_shortcut("[]ab]x"), None);
        assert_eq!(derive_shortcut("[^]ab]cd"), Some("cd".into()));
        assert_eq!(derive_shortcut("[[:alpha:]]track"), Some("track".into()));
        // ')' inside a class does not close the group around it
        assert_eq!(derive_shortcut("(x[)]abcd)?ef"), Some("ef".into()));
    }

    #[test]
    fn test_non_ascii_ends_runs() {
        assert_eq!(derive_shortcut("\u{17f}cript"), Some("cript".into()));
        assert_eq!(derive_shortcut("ads\u{3c3}\u{3c3}x"), Some("ads".into()));
        assert_eq!(derive_shortcut("\u{e9}t\u{e9}"), None);
    }

    #[test]
    fn test_single_char_shortcut_rejected() {
        assert_eq!(derive_shortcut("a.b.c"), None);
        assert_eq!(derive_shortcut("ab"), Some("ab".into()));
    }

    #[test]
    fn test_ties_keep_first() {
        assert_eq!(derive_shortcut("abcd.efgh"), Some("abcd".into()));
    }
}

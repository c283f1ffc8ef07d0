//! Hash function for the rule index
//!
//! A djb2-style 32-bit hash over Unicode scalar values. Domain buckets and
//! shortcut buckets are both keyed by it, so the only requirement is that build
//! and query hash identically.
//!
//! # Sentinel Handling
//!
//! The empty string hashes to `0`. The index never stores or looks up empty keys.

/// djb2 seed.
const SEED: u32 = 5381;

/// Hash a sequence of chars.
///
/// Used directly by the sliding-window lookups, which hash windows of a
/// pre-decoded URL without re-walking UTF-8.
#[inline]
pub fn fast_hash_chars(chars: &[char]) -> u32 {
    if chars.is_empty() {
        return 0;
    }

    let mut h = SEED;
    for &c in chars {
        h = h.wrapping_shl(5).wrapping_add(h) ^ (c as u32);
    }
    h
}

/// Hash a string. Returns `0` for the empty string.
#[inline]
pub fn fast_hash(s: &str) -> u32 {
    if s.is_empty() {
        return 0;
    }

    let mut h = SEED;
    for c in s.chars() {
        h = h.wrapping_shl(5).wrapping_add(h) ^ (c as u32);
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_hash_consistent() {
        assert_eq!(fast_hash("example.com"), fast_hash("example.com"));
    }

    #[test]
    fn test_fast_hash_empty_is_zero() {
        assert_eq!(fast_hash(""), 0);
        assert_eq!(fast_hash_chars(&[]), 0);
    }

    #[test]
    fn test_fast_hash_order_sensitive() {
        assert_ne!(fast_hash("abcde"), fast_hash("edcba"));
        assert_ne!(fast_hash("ab"), fast_hash("ba"));
    }

    #[test]
    fn test_fast_hash_matches_char_slice() {
        for s in ["a", "banner", "ads.example.com", "пример.рф"] {
            let chars: Vec<char> = s.chars().collect();
            assert_eq!(fast_hash(s), fast_hash_chars(&chars));
        }
    }

    #[test]
    fn test_fast_hash_different_strings() {
        assert_ne!(fast_hash("example.com"), fast_hash("example.org"));
    }
}

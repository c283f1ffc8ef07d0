//! Rule index
//!
//! Three lookup structures over rule positions:
//!
//! 1. shortcut hash -> rule indices (one bucket per rule, chosen at build time)
//! 2. domain hash -> rule indices (one bucket per permitted domain)
//! 3. fallback list of rules that fit neither and are checked on every query
//!
//! The index only narrows the candidate set. Every candidate is still
//! evaluated precisely by the matcher.

use std::collections::HashMap;

use crate::hash::{fast_hash, fast_hash_chars};
use crate::types::domain_key;
use crate::url::walk_host_suffixes;

/// Shingle length used when none is configured.
pub const DEFAULT_SHORTCUT_LENGTH: usize = 5;

/// Lookup tables keyed by [`fast_hash`].
#[derive(Debug, Clone)]
pub struct RuleIndex {
    shortcut_length: usize,
    shortcuts: HashMap<u32, Vec<u32>>,
    domains: HashMap<u32, Vec<u32>>,
    fallback: Vec<u32>,
}

impl Default for RuleIndex {
    fn default() -> Self {
        Self::new(DEFAULT_SHORTCUT_LENGTH)
    }
}

/// Bucket statistics, for tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub shortcut_buckets: usize,
    pub shortcut_rules: usize,
    pub domain_buckets: usize,
    pub domain_entries: usize,
    pub fallback_rules: usize,
    pub largest_bucket: usize,
}

impl RuleIndex {
    /// Create an empty index. A zero length is bumped to 1.
    pub fn new(shortcut_length: usize) -> Self {
        Self {
            shortcut_length: shortcut_length.max(1),
            shortcuts: HashMap::new(),
            domains: HashMap::new(),
            fallback: Vec::new(),
        }
    }

    pub fn shortcut_length(&self) -> usize {
        self.shortcut_length
    }

    /// Append a rule to a shortcut bucket.
    pub fn add_shortcut(&mut self, hash: u32, rule_idx: u32) {
        self.shortcuts.entry(hash).or_default().push(rule_idx);
    }

    /// Register a rule under a permitted domain. A leading wildcard marker is
    /// stripped so `*example.com` lands in the `example.com` bucket.
    pub fn add_domain(&mut self, domain: &str, rule_idx: u32) {
        let key = domain_key(domain);
        if key.is_empty() {
            return;
        }
        self.domains.entry(fast_hash(key)).or_default().push(rule_idx);
    }

    /// Append a rule to the fallback list unless already present.
    pub fn add_fallback(&mut self, rule_idx: u32) {
        if !self.fallback.contains(&rule_idx) {
            self.fallback.push(rule_idx);
        }
    }

    /// Collect candidate rule indices for a URL.
    ///
    /// `lower_url` must be case-folded, `host` is the lowercased host (may be
    /// empty). The result is sorted ascending and free of duplicates.
    pub fn lookup(&self, lower_url: &str, host: &str) -> Vec<usize> {
        let mut result = Vec::new();

        self.lookup_shortcuts(lower_url, &mut result);
        self.lookup_domains(host, &mut result);
        result.extend(self.fallback.iter().map(|&idx| idx as usize));

        result.sort_unstable();
        result.dedup();
        result
    }

    fn lookup_shortcuts(&self, lower_url: &str, result: &mut Vec<usize>) {
        if self.shortcuts.is_empty() {
            return;
        }

        let chars: Vec<char> = lower_url.chars().collect();
        if chars.len() < self.shortcut_length {
            return;
        }

        for window in chars.windows(self.shortcut_length) {
            let hash = fast_hash_chars(window);
            if let Some(rules) = self.shortcuts.get(&hash) {
                result.extend(rules.iter().map(|&idx| idx as usize));
            }
        }
    }

    fn lookup_domains(&self, host: &str, result: &mut Vec<usize>) {
        if self.domains.is_empty() {
            return;
        }

        for domain in walk_host_suffixes(host) {
            if let Some(rules) = self.domains.get(&fast_hash(domain)) {
                result.extend(rules.iter().map(|&idx| idx as usize));
            }
        }
    }

    pub fn fallback(&self) -> &[u32] {
        &self.fallback
    }

    pub fn stats(&self) -> IndexStats {
        let largest = self
            .shortcuts
            .values()
            .chain(self.domains.values())
            .map(Vec::len)
            .chain(std::iter::once(self.fallback.len()))
            .max()
            .unwrap_or(0);

        IndexStats {
            shortcut_buckets: self.shortcuts.len(),
            shortcut_rules: self.shortcuts.values().map(Vec::len).sum(),
            domain_buckets: self.domains.len(),
            domain_entries: self.domains.values().map(Vec::len).sum(),
            fallback_rules: self.fallback.len(),
            largest_bucket: largest,
        }
    }
}

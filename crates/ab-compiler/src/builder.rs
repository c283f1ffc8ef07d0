use std::collections::HashMap;

use ab_core::hash::fast_hash;
use ab_core::index::RuleIndex;
use ab_core::ruleset::RuleSet;
use ab_core::types::{domain_key, Rule};

use crate::options::CompileOptions;

/// How many rules went down each indexing path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub shortcut: usize,
    pub domain: usize,
    pub fallback: usize,
}

/// Build the rule set for already parsed rules.
pub fn build_rule_set(rules: Vec<Rule>, options: &CompileOptions) -> RuleSet {
    let (index, stats) = build_index(&rules, options.shortcut_length);
    log::debug!(
        "indexed {} rules: {} by shortcut, {} by domain, {} fallback",
        rules.len(),
        stats.shortcut,
        stats.domain,
        stats.fallback
    );

    let rule_set = RuleSet::new(rules, index);
    if options.eager_patterns {
        let compiled = rule_set.precompile_patterns();
        log::debug!("precompiled {} url patterns", compiled);
    }
    rule_set
}

/// Build the lookup tables. Rule identity is the position in `rules`.
pub fn build_index(rules: &[Rule], shortcut_length: usize) -> (RuleIndex, BuildStats) {
    let mut builder = IndexBuilder::new(shortcut_length);
    for (rule_idx, rule) in rules.iter().enumerate() {
        builder.add_rule(rule, rule_idx as u32);
    }
    (builder.index, builder.stats)
}

struct IndexBuilder {
    index: RuleIndex,
    /// Rules assigned to each shortcut hash so far
    histogram: HashMap<u32, usize>,
    stats: BuildStats,
}

impl IndexBuilder {
    fn new(shortcut_length: usize) -> Self {
        Self {
            index: RuleIndex::new(shortcut_length),
            histogram: HashMap::new(),
            stats: BuildStats::default(),
        }
    }

    fn add_rule(&mut self, rule: &Rule, rule_idx: u32) {
        if self.add_to_shortcuts(rule, rule_idx) {
            self.stats.shortcut += 1;
        } else if self.add_to_domains(rule, rule_idx) {
            self.stats.domain += 1;
        } else {
            self.index.add_fallback(rule_idx);
            self.stats.fallback += 1;
        }
    }

    fn add_to_shortcuts(&mut self, rule: &Rule, rule_idx: u32) -> bool {
        let shingles = match rule_shingles(rule, self.index.shortcut_length()) {
            Some(shingles) => shingles,
            None => return false,
        };

        // Least used shingle wins; ties go to the first one
        let mut best: Option<(u32, usize)> = None;
        for shingle in &shingles {
            let hash = fast_hash(shingle);
            let count = self.histogram.get(&hash).copied().unwrap_or(0);
            if best.map_or(true, |(_, min)| count < min) {
                best = Some((hash, count));
            }
        }

        let (hash, count) = match best {
            Some(best) => best,
            None => return false,
        };

        self.histogram.insert(hash, count + 1);
        self.index.add_shortcut(hash, rule_idx);
        true
    }

    fn add_to_domains(&mut self, rule: &Rule, rule_idx: u32) -> bool {
        let domains = rule.trigger.permitted_domains();
        if domains.is_empty() {
            return false;
        }

        // A bare wildcard has no bucket to live in
        if domains.iter().any(|d| domain_key(d).is_empty()) {
            return false;
        }

        for domain in domains {
            self.index.add_domain(domain, rule_idx);
        }
        true
    }
}

/// All `length`-char substrings of a rule's shortcut, if it is worth indexing.
fn rule_shingles(rule: &Rule, length: usize) -> Option<Vec<String>> {
    let shortcut = rule.trigger.shortcut()?;
    let chars: Vec<char> = shortcut.chars().collect();

    if chars.len() < length {
        return None;
    }

    if is_any_url_shortcut(shortcut, chars.len()) {
        return None;
    }

    Some(
        chars
            .windows(length)
            .map(|window| window.iter().collect())
            .collect(),
    )
}

/// Scheme-like shortcuts that occur in nearly every URL.
///
/// The thresholds are the scheme prefix length plus one.
fn is_any_url_shortcut(shortcut: &str, len: usize) -> bool {
    (len < 6 && shortcut.starts_with("ws:"))
        || (len < 7 && shortcut.starts_with("|ws"))
        || (len < 9 && shortcut.starts_with("http"))
        || (len < 10 && shortcut.starts_with("|http"))
}

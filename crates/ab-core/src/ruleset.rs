//! Compiled engine state
//!
//! A [`RuleSet`] owns the rule vector and the index built over it. It is never
//! mutated after construction; reloading produces a new one and
//! [`ContentBlocker`] swaps it in atomically.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::index::{IndexStats, RuleIndex};
use crate::matcher::{MatchOutcome, Matcher};
use crate::result::BlockerData;
use crate::types::Rule;

/// Rules plus the index over their positions.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    index: RuleIndex,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>, index: RuleIndex) -> Self {
        Self { rules, index }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn index(&self) -> &RuleIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn matcher(&self) -> Matcher<'_> {
        Matcher::new(&self.rules, &self.index)
    }

    pub fn get_data(&self, url: &str) -> BlockerData {
        self.matcher().match_url(url)
    }

    pub fn get_data_detailed(&self, url: &str) -> MatchOutcome {
        self.matcher().match_url_detailed(url)
    }

    /// Compile every url pattern now instead of on first use.
    /// Returns the number of patterns compiled.
    pub fn precompile_patterns(&self) -> usize {
        self.rules
            .iter()
            .filter_map(|rule| rule.trigger.compiled_pattern())
            .count()
    }

    pub fn stats(&self) -> IndexStats {
        self.index.stats()
    }
}

// =============================================================================
// Container
// =============================================================================

/// Holds the current [`RuleSet`] behind an atomic pointer.
///
/// Queries load a snapshot and run against it to completion; a concurrent
/// [`ContentBlocker::replace`] only affects queries that start afterwards.
#[derive(Debug)]
pub struct ContentBlocker {
    current: ArcSwap<RuleSet>,
}

impl Default for ContentBlocker {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentBlocker {
    /// Create a container with an empty rule set.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(RuleSet::default()),
        }
    }

    pub fn with_rules(rules: RuleSet) -> Self {
        Self {
            current: ArcSwap::from_pointee(rules),
        }
    }

    /// Swap in a new rule set, returning the previous one.
    pub fn replace(&self, rules: RuleSet) -> Arc<RuleSet> {
        let previous = self.current.swap(Arc::new(rules));
        log::debug!(
            "rule set replaced: {} -> {} rules",
            previous.len(),
            self.current.load().len()
        );
        previous
    }

    /// The rule set queries currently run against.
    pub fn snapshot(&self) -> Arc<RuleSet> {
        self.current.load_full()
    }

    /// Select scripts and styles for a page URL.
    pub fn get_data(&self, url: &str) -> BlockerData {
        self.current.load().get_data(url)
    }

    pub fn rule_count(&self) -> usize {
        self.current.load().len()
    }
}

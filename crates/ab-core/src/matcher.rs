//! Core Matching Engine
//!
//! Every content-script request goes through here: candidate retrieval from the
//! [`RuleIndex`], precise trigger evaluation and precedence resolution.
//!
//! # Precedence
//!
//! Candidates are scanned from the highest rule index down. Content actions
//! accumulate. A triggered `ignore-previous-rules` stops the scan, so every rule
//! listed before it is dropped while rules listed after it (already visited)
//! keep their contributions.

use crate::index::RuleIndex;
use crate::pattern::fold_case;
use crate::result::BlockerData;
use crate::types::{Action, Rule};
use crate::url::normalized_host;

// =============================================================================
// Scan State
// =============================================================================

/// How a scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// All candidates were visited
    Done,
    /// An `ignore-previous-rules` rule stopped the scan at this rule index
    Cancelled { rule_idx: usize },
}

/// Result of matching a URL, with scan details for logging and tooling.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub data: BlockerData,
    pub outcome: ScanOutcome,
    pub candidates: usize,
    /// Indices of rules that contributed, in scan order
    pub contributed: Vec<usize>,
}

// =============================================================================
// Matcher
// =============================================================================

/// Borrowing view over a rule list and its index.
pub struct Matcher<'a> {
    rules: &'a [Rule],
    index: &'a RuleIndex,
}

impl<'a> Matcher<'a> {
    pub fn new(rules: &'a [Rule], index: &'a RuleIndex) -> Self {
        Self { rules, index }
    }

    /// Select scripts and styles for a page URL.
    pub fn match_url(&self, url: &str) -> BlockerData {
        self.match_url_detailed(url).data
    }

    /// Like [`Matcher::match_url`], also reporting how the scan ended.
    pub fn match_url_detailed(&self, url: &str) -> MatchOutcome {
        let host = normalized_host(url);
        let lower_url = fold_case(url);

        let candidates = self.index.lookup(&lower_url, &host);
        log::trace!("{} candidate rules for {}", candidates.len(), url);

        let mut data = BlockerData::new();
        let mut contributed = Vec::new();
        let mut outcome = ScanOutcome::Done;

        for &rule_idx in candidates.iter().rev() {
            let rule = match self.rules.get(rule_idx) {
                Some(rule) => rule,
                None => continue,
            };

            if !rule.trigger.is_triggered(url, &lower_url, &host) {
                continue;
            }

            if rule.action == Action::IgnorePreviousRules {
                outcome = ScanOutcome::Cancelled { rule_idx };
                break;
            }

            let before = data.len();
            data.add_action(&rule.action);
            if data.len() > before {
                contributed.push(rule_idx);
            }
        }

        MatchOutcome {
            data,
            outcome,
            candidates: candidates.len(),
            contributed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::fast_hash;
    use crate::types::Trigger;

    fn any_url(action: Action) -> Rule {
        Rule::new(Trigger::new(Some(".*".into())), action)
    }

    fn on_domain(domain: &str, action: Action) -> Rule {
        Rule::new(
            Trigger::new(Some(".*".into())).with_permitted_domains(vec![domain.to_string()]),
            action,
        )
    }

    /// Index with every rule in the fallback list.
    fn fallback_index(rules: &[Rule]) -> RuleIndex {
        let mut index = RuleIndex::default();
        for idx in 0..rules.len() {
            index.add_fallback(idx as u32);
        }
        index
    }

    #[test]
    fn test_universal_rule_matches_everything() {
        let rules = vec![any_url(Action::Script("A".into()))];
        let index = fallback_index(&rules);
        let matcher = Matcher::new(&rules, &index);

        for url in ["http://example.com", "https://a.b.c/d?e#f", "about:blank"] {
            assert_eq!(matcher.match_url(url).scripts, vec!["A"]);
        }
    }

    #[test]
    fn test_ignore_previous_rules_keeps_later_rules() {
        let rules = vec![
            any_url(Action::Script("A".into())),
            on_domain("x.com", Action::IgnorePreviousRules),
            any_url(Action::Script("C".into())),
        ];
        let index = fallback_index(&rules);
        let matcher = Matcher::new(&rules, &index);

        let outcome = matcher.match_url_detailed("https://x.com/page");
        assert_eq!(outcome.data.scripts, vec!["C"]);
        assert_eq!(outcome.outcome, ScanOutcome::Cancelled { rule_idx: 1 });
        assert_eq!(outcome.contributed, vec![2]);

        // Not on x.com: the cancel rule does not trigger
        let outcome = matcher.match_url_detailed("https://y.com/page");
        assert_eq!(outcome.data.scripts, vec!["C", "A"]);
        assert_eq!(outcome.outcome, ScanOutcome::Done);
    }

    #[test]
    fn test_ignore_as_last_rule_empties_result() {
        let rules = vec![
            any_url(Action::Css("a".into())),
            any_url(Action::CssExtended("b".into())),
            any_url(Action::IgnorePreviousRules),
        ];
        let index = fallback_index(&rules);
        let matcher = Matcher::new(&rules, &index);
        assert!(matcher.match_url("https://example.com").is_empty());
    }

    #[test]
    fn test_concrete_scenario() {
        let rules = vec![
            any_url(Action::Script("A".into())),
            any_url(Action::CssExtended("B".into())),
            Rule::new(Trigger::new(Some("test.com".into())), Action::Css("C".into())),
        ];
        let index = fallback_index(&rules);
        let matcher = Matcher::new(&rules, &index);

        let data = matcher.match_url("http://example.com");
        assert_eq!(data.scripts, vec!["A"]);
        assert_eq!(data.css_extended, vec!["B"]);
        assert!(data.css.is_empty());
    }

    #[test]
    fn test_rules_outside_candidates_are_not_evaluated() {
        let rules = vec![
            on_domain("example.com", Action::Script("domain".into())),
            Rule::new(
                Trigger::new(Some("banner".into())).with_shortcut(Some("banner".into())),
                Action::Css("shortcut".into()),
            ),
        ];
        let mut index = RuleIndex::new(5);
        index.add_domain("example.com", 0);
        index.add_shortcut(fast_hash("banne"), 1);
        let matcher = Matcher::new(&rules, &index);

        let data = matcher.match_url("https://example.com/banner.gif");
        assert_eq!(data.scripts, vec!["domain"]);
        assert_eq!(data.css, vec!["shortcut"]);

        let data = matcher.match_url("https://other.com/index.html");
        assert!(data.is_empty());
    }

    #[test]
    fn test_unsupported_actions_are_inert() {
        let rules = vec![
            any_url(Action::Script("A".into())),
            any_url(Action::Unsupported { kind: "block".into() }),
        ];
        let index = fallback_index(&rules);
        let outcome = Matcher::new(&rules, &index).match_url_detailed("https://example.com");
        assert_eq!(outcome.data.scripts, vec!["A"]);
        assert_eq!(outcome.contributed, vec![0]);
        assert_eq!(outcome.candidates, 2);
    }

    #[test]
    fn test_stale_index_entries_are_skipped() {
        let rules = vec![any_url(Action::Script("A".into()))];
        let mut index = fallback_index(&rules);
        index.add_fallback(42);
        let data = Matcher::new(&rules, &index).match_url("https://example.com");
        assert_eq!(data.scripts, vec!["A"]);
    }
}

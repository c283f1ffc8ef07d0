//! Advanced Blocking Rule Compiler
//!
//! This crate turns a JSON rule list (trigger/action objects) into the
//! [`RuleSet`] the core matcher queries: parsing, shortcut derivation and index
//! construction.

pub mod builder;
pub mod options;
pub mod parser;
pub mod shortcut;

use ab_core::index::IndexStats;
use ab_core::ruleset::{ContentBlocker, RuleSet};
use ab_core::types::Rule;

pub use builder::{build_index, build_rule_set, BuildStats};
pub use options::{CompileOptions, Strictness};
pub use parser::{parse_rules, Diagnostic, DiagnosticKind, EntryError, ParseError, ParsedRules};
pub use shortcut::derive_shortcut;

/// Summary of a compiled rule list.
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Rules in the compiled list, inert ones included
    pub rules: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub index: IndexStats,
}

impl LoadReport {
    pub fn skipped(&self) -> usize {
        self.count(DiagnosticKind::Skipped)
    }

    pub fn unsupported(&self) -> usize {
        self.count(DiagnosticKind::Unsupported)
    }

    fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }
}

/// Convert a JSON rule list into rules, skipping invalid entries.
pub fn compile(json: &str) -> Result<Vec<Rule>, ParseError> {
    Ok(parse_rules(json, Strictness::Lenient)?.rules)
}

/// Parse and index a JSON rule list.
pub fn compile_rule_set(
    json: &str,
    options: &CompileOptions,
) -> Result<(RuleSet, LoadReport), ParseError> {
    let parsed = parse_rules(json, options.strictness)?;
    let rule_set = build_rule_set(parsed.rules, options);

    let report = LoadReport {
        rules: rule_set.len(),
        diagnostics: parsed.diagnostics,
        index: rule_set.stats(),
    };

    Ok((rule_set, report))
}

/// Compile a rule list and swap it into `blocker`.
///
/// On error the blocker keeps serving its previous rules.
pub fn load_into(
    blocker: &ContentBlocker,
    json: &str,
    options: &CompileOptions,
) -> Result<LoadReport, ParseError> {
    let (rule_set, report) = compile_rule_set(json, options)?;
    blocker.replace(rule_set);
    log::info!(
        "loaded {} rules ({} skipped, {} unsupported)",
        report.rules,
        report.skipped(),
        report.unsupported()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = r##"[
        {"trigger": {"url-filter": ".*", "if-domain": ["example.com"]}, "action": {"type": "script", "script": "included-script"}},
        {"trigger": {"url-filter": ".*", "if-domain": ["webkit.org"]}, "action": {"type": "css", "css": "#included-css:has(div) { height: 5px; }"}}
    ]"##;

    #[test]
    fn compile_returns_rules_in_order() {
        let rules = compile(RULES).expect("should compile");
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].action.kind(), "script");
        assert_eq!(rules[1].action.kind(), "css");
    }

    #[test]
    fn load_into_replaces_rules() {
        let blocker = ContentBlocker::new();
        let report = load_into(&blocker, RULES, &CompileOptions::default()).expect("should load");
        assert_eq!(report.rules, 2);
        assert_eq!(report.skipped(), 0);
        assert_eq!(report.index.domain_buckets, 2);

        let data = blocker.get_data("https://example.com/");
        assert_eq!(data.scripts, vec!["included-script"]);
        let data = blocker.get_data("https://webkit.org/blog");
        assert_eq!(data.css, vec!["#included-css:has(div) { height: 5px; }"]);
    }

    #[test]
    fn failed_load_keeps_previous_rules() {
        let blocker = ContentBlocker::new();
        load_into(&blocker, RULES, &CompileOptions::default()).expect("should load");

        assert!(load_into(&blocker, "not json", &CompileOptions::default()).is_err());
        let strict = CompileOptions::strict();
        assert!(load_into(&blocker, r#"[{"action": {"type": "css"}}]"#, &strict).is_err());

        assert_eq!(blocker.rule_count(), 2);
        assert_eq!(blocker.get_data("https://example.com/").scripts, vec!["included-script"]);
    }

    #[test]
    fn report_counts_diagnostics() {
        let json = r#"[
            {"trigger": {"url-filter": ".*"}, "action": {"type": "script"}},
            {"trigger": {"url-filter": ".*"}, "action": {"type": "block"}},
            {"trigger": {"url-filter": ".*"}, "action": {"type": "css", "css": "x"}}
        ]"#;
        let (rule_set, report) = compile_rule_set(json, &CompileOptions::default()).expect("should compile");
        assert_eq!(rule_set.len(), 2);
        assert_eq!(report.rules, 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.unsupported(), 1);
    }
}

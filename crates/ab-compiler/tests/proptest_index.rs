use ab_compiler::{compile_rule_set, derive_shortcut, CompileOptions};
use ab_core::types::Trigger;
use ab_core::url::normalized_host;
use ab_core::{fold_case, Matcher, RuleIndex};
use proptest::prelude::*;

/// url-filters over a tiny alphabet so that matches are common. The second
/// alphabet mixes in characters whose case variants lowercasing misses
/// (long s, Kelvin sign, final sigma).
fn arb_pattern() -> impl Strategy<Value = String> {
    prop_oneof![
        "[abc]{2,8}",
        "[sS\u{17f}crKk\u{212a}\u{3c3}\u{3c2}]{2,8}",
        "[abcAB.*?+^$]{1,10}",
        "[abc(|)\\[\\]{}0-2,]{1,10}",
        "/[abc.*+\\[\\]]{1,8}/",
        Just(".*".to_owned()),
    ]
}

fn arb_url() -> impl Strategy<Value = String> {
    ("[abc]{1,3}", "[abcABC./sS\u{17f}crKk\u{212a}\u{3c3}\u{3c2}]{0,16}").prop_map(|(host, path)| format!("https://{host}.com/{path}"))
}

fn arb_domains() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![
            Just("a.com".to_owned()),
            Just("b.com".to_owned()),
            Just("*a.com".to_owned()),
            Just("*com".to_owned()),
        ],
        0..3,
    )
}

fn rules_json(rules: &[(String, Vec<String>, Vec<String>, u8)]) -> String {
    let entries: Vec<serde_json::Value> = rules
        .iter()
        .enumerate()
        .map(|(i, (pattern, permitted, forbidden, kind))| {
            let action = match kind % 4 {
                0 => serde_json::json!({"type": "script", "script": format!("s{i}")}),
                1 => serde_json::json!({"type": "css", "css": format!("c{i}")}),
                2 => serde_json::json!({"type": "css-extended", "css": format!("e{i}")}),
                _ => serde_json::json!({"type": "ignore-previous-rules"}),
            };
            serde_json::json!({
                "trigger": {
                    "url-filter": pattern,
                    "if-domain": permitted,
                    "unless-domain": forbidden,
                },
                "action": action,
            })
        })
        .collect();
    serde_json::Value::Array(entries).to_string()
}

proptest! {
    /// A shortcut never rejects a URL the pattern itself would match.
    #[test]
    fn shortcut_is_sound(pattern in arb_pattern(), url in arb_url()) {
        if let Some(shortcut) = derive_shortcut(&pattern) {
            let trigger = Trigger::new(Some(pattern.clone()));
            let host = normalized_host(&url);
            let folded = fold_case(&url);
            if trigger.is_triggered(&url, &folded, &host) {
                prop_assert!(
                    folded.contains(&shortcut),
                    "pattern {:?} matched {:?} without shortcut {:?}",
                    pattern,
                    url,
                    shortcut
                );
            }
        }
    }

    /// The index only narrows candidates: results equal a scan of every rule.
    #[test]
    fn index_matches_full_scan(
        rules in prop::collection::vec((arb_pattern(), arb_domains(), arb_domains(), any::<u8>()), 1..12),
        urls in prop::collection::vec(arb_url(), 1..6),
    ) {
        let json = rules_json(&rules);
        let (rule_set, _) = compile_rule_set(&json, &CompileOptions::default()).unwrap();

        let mut full = RuleIndex::default();
        for idx in 0..rule_set.len() {
            full.add_fallback(idx as u32);
        }
        let reference = Matcher::new(rule_set.rules(), &full);

        for url in &urls {
            prop_assert_eq!(rule_set.get_data(url), reference.match_url(url));
        }
    }

    /// Compiling the same list twice yields identical results.
    #[test]
    fn reload_is_idempotent(
        rules in prop::collection::vec((arb_pattern(), arb_domains(), arb_domains(), any::<u8>()), 1..12),
        url in arb_url(),
    ) {
        let json = rules_json(&rules);
        let (first, _) = compile_rule_set(&json, &CompileOptions::default()).unwrap();
        let (second, _) = compile_rule_set(&json, &CompileOptions::default()).unwrap();
        prop_assert_eq!(first.get_data(&url), second.get_data(&url));
        prop_assert_eq!(first.stats(), second.stats());
    }
}

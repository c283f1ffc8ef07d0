use serde::Deserialize;

use ab_core::types::{Action, Rule, Trigger};

use crate::options::Strictness;
use crate::shortcut::derive_shortcut;

/// Error for a rule list that cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid rule list JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid rule at index {index}: {source}")]
    InvalidEntry {
        index: usize,
        #[source]
        source: EntryError,
    },
}

/// Why a single entry could not be converted.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error("malformed entry: {0}")]
    Malformed(serde_json::Error),
    #[error("missing action")]
    MissingAction,
    #[error("missing action type")]
    MissingType,
    #[error("action '{kind}' requires '{field}'")]
    MissingPayload { kind: String, field: &'static str },
}

/// Non-fatal finding about one entry of the rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Position of the entry in the input array
    pub index: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Entry was dropped from the rule list
    Skipped,
    /// Entry was kept but its action is unknown and never produces output
    Unsupported,
}

/// Rules converted from a rule list, in input order.
#[derive(Debug, Clone, Default)]
pub struct ParsedRules {
    pub rules: Vec<Rule>,
    pub diagnostics: Vec<Diagnostic>,
}

// =============================================================================
// Raw JSON Model
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    trigger: Option<RawTrigger>,
    #[serde(default)]
    action: Option<RawAction>,
}

#[derive(Debug, Default, Deserialize)]
struct RawTrigger {
    #[serde(rename = "url-filter", default)]
    url_filter: Option<String>,
    #[serde(rename = "url-filter-is-case-sensitive", default)]
    case_sensitive: bool,
    #[serde(rename = "if-domain", default)]
    if_domain: Option<DomainList>,
    #[serde(rename = "unless-domain", default)]
    unless_domain: Option<DomainList>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DomainList {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawAction {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    css: Option<String>,
    #[serde(default)]
    script: Option<String>,
    #[serde(default)]
    scriptlet: Option<String>,
    #[serde(rename = "scriptletParam", default)]
    scriptlet_param: Option<String>,
}

// =============================================================================
// Parsing
// =============================================================================

/// Convert a JSON rule list into rules.
///
/// The payload must be a JSON array. Entries that cannot be converted are
/// skipped (lenient) or fail the whole list (strict); unknown action types are
/// kept as inert [`Action::Unsupported`] rules either way.
pub fn parse_rules(json: &str, strictness: Strictness) -> Result<ParsedRules, ParseError> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let mut parsed = ParsedRules {
        rules: Vec::with_capacity(entries.len()),
        diagnostics: Vec::new(),
    };

    for (index, value) in entries.into_iter().enumerate() {
        match parse_entry(value) {
            Ok(rule) => {
                if let Action::Unsupported { kind } = &rule.action {
                    log::warn!("rule {} has unsupported action type '{}'", index, kind);
                    parsed.diagnostics.push(Diagnostic {
                        index,
                        kind: DiagnosticKind::Unsupported,
                        message: format!("unsupported action type '{}'", kind),
                    });
                }
                parsed.rules.push(rule);
            }
            Err(source) => {
                if strictness == Strictness::Strict {
                    return Err(ParseError::InvalidEntry { index, source });
                }
                log::warn!("skipping rule {}: {}", index, source);
                parsed.diagnostics.push(Diagnostic {
                    index,
                    kind: DiagnosticKind::Skipped,
                    message: source.to_string(),
                });
            }
        }
    }

    Ok(parsed)
}

fn parse_entry(value: serde_json::Value) -> Result<Rule, EntryError> {
    let raw: RawEntry = serde_json::from_value(value).map_err(EntryError::Malformed)?;
    let action = parse_action(raw.action.ok_or(EntryError::MissingAction)?)?;
    let trigger = parse_trigger(raw.trigger.unwrap_or_default());
    Ok(Rule::new(trigger, action))
}

fn parse_action(raw: RawAction) -> Result<Action, EntryError> {
    let kind = raw.kind.ok_or(EntryError::MissingType)?;

    let action = match kind.as_str() {
        "script" => Action::Script(require(raw.script, &kind, "script")?),
        "css" => Action::Css(require(raw.css, &kind, "css")?),
        "css-extended" => Action::CssExtended(require(raw.css, &kind, "css")?),
        "css-inject" => Action::CssInject(require(raw.css, &kind, "css")?),
        "scriptlet" => Action::Scriptlet {
            name: require(raw.scriptlet, &kind, "scriptlet")?,
            param: raw.scriptlet_param,
        },
        "ignore-previous-rules" => Action::IgnorePreviousRules,
        _ => Action::Unsupported { kind },
    };

    Ok(action)
}

fn require(value: Option<String>, kind: &str, field: &'static str) -> Result<String, EntryError> {
    value.ok_or_else(|| EntryError::MissingPayload {
        kind: kind.to_string(),
        field,
    })
}

fn parse_trigger(raw: RawTrigger) -> Trigger {
    let shortcut = raw.url_filter.as_deref().and_then(derive_shortcut);

    Trigger::new(raw.url_filter)
        .with_case_sensitive(raw.case_sensitive)
        .with_permitted_domains(normalize_domains(raw.if_domain))
        .with_forbidden_domains(normalize_domains(raw.unless_domain))
        .with_shortcut(shortcut)
}

fn normalize_domains(list: Option<DomainList>) -> Vec<String> {
    let list = match list {
        Some(DomainList::One(domain)) => vec![domain],
        Some(DomainList::Many(domains)) => domains,
        None => return Vec::new(),
    };

    list.into_iter()
        .map(|domain| domain.trim().to_lowercase())
        .filter(|domain| !domain.is_empty())
        .collect()
}

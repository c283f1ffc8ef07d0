//! Rule model
//!
//! One compiled rule is a [`Trigger`] (when it applies) plus an [`Action`] (what
//! it contributes). Rules are stored in a single vector; every index structure
//! refers to a rule by its position in that vector.

use std::sync::OnceLock;

use crate::pattern::{fold_case, CompiledPattern};

// =============================================================================
// Actions
// =============================================================================

/// Effect of a triggered rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// JavaScript to execute in the page context
    Script(String),
    /// Plain CSS stylesheet
    Css(String),
    /// Extended CSS (pseudo-classes such as `:has()` evaluated by the content script)
    CssExtended(String),
    /// CSS injected as-is
    CssInject(String),
    /// Scriptlet invocation
    Scriptlet {
        name: String,
        /// Serialized invocation parameters, passed through untouched
        param: Option<String>,
    },
    /// Discards every rule with a lower index for the current query
    IgnorePreviousRules,
    /// Action kind this engine does not know; never contributes output
    Unsupported { kind: String },
}

impl Action {
    /// The `type` string this action is written as in a rule list.
    pub fn kind(&self) -> &str {
        match self {
            Self::Script(_) => "script",
            Self::Css(_) => "css",
            Self::CssExtended(_) => "css-extended",
            Self::CssInject(_) => "css-inject",
            Self::Scriptlet { .. } => "scriptlet",
            Self::IgnorePreviousRules => "ignore-previous-rules",
            Self::Unsupported { kind } => kind,
        }
    }
}

// =============================================================================
// Domain Constraints
// =============================================================================

/// Leading marker that turns a domain entry into a suffix match.
pub const WILDCARD_MARKER: char = '*';

/// Bucket key of a domain entry: the entry without its wildcard marker and
/// without a leading dot.
#[inline]
pub fn domain_key(pattern: &str) -> &str {
    match pattern.strip_prefix(WILDCARD_MARKER) {
        Some(suffix) => suffix.trim_start_matches('.'),
        None => pattern,
    }
}

/// Check a host against one `if-domain` / `unless-domain` entry.
///
/// `*example.com` matches `example.com` and any subdomain of it; other
/// entries must equal the host. A bare `*` matches every host.
///
/// The suffix must start on a label boundary, which is stricter than a plain
/// `ends_with`: `*example.com` does not match `notexample.com`, neither in
/// `if-domain` nor in `unless-domain`. Domain buckets are reached by walking
/// the host's label suffixes, so lookup and this check agree.
#[inline]
pub fn domain_matches(host: &str, pattern: &str) -> bool {
    if !pattern.starts_with(WILDCARD_MARKER) {
        return host == pattern;
    }

    let suffix = domain_key(pattern);
    if suffix.is_empty() || host == suffix {
        return true;
    }

    host.len() > suffix.len()
        && host.ends_with(suffix)
        && host.as_bytes()[host.len() - suffix.len() - 1] == b'.'
}

// =============================================================================
// Trigger
// =============================================================================

/// Condition half of a rule.
#[derive(Debug, Clone, Default)]
pub struct Trigger {
    url_pattern: Option<String>,
    case_sensitive: bool,
    permitted_domains: Vec<String>,
    forbidden_domains: Vec<String>,
    shortcut: Option<String>,
    compiled: OnceLock<CompiledPattern>,
}

impl Trigger {
    /// Create a trigger. A trigger without a url pattern never fires.
    pub fn new(url_pattern: Option<String>) -> Self {
        Self {
            url_pattern,
            ..Self::default()
        }
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_permitted_domains(mut self, domains: Vec<String>) -> Self {
        self.permitted_domains = domains;
        self
    }

    pub fn with_forbidden_domains(mut self, domains: Vec<String>) -> Self {
        self.forbidden_domains = domains;
        self
    }

    /// Attach the pre-filter literal. Empty shortcuts are dropped and the value is
    /// stored case-folded.
    pub fn with_shortcut(mut self, shortcut: Option<String>) -> Self {
        self.shortcut = shortcut
            .filter(|s| !s.is_empty())
            .map(|s| fold_case(&s));
        self
    }

    pub fn url_pattern(&self) -> Option<&str> {
        self.url_pattern.as_deref()
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn permitted_domains(&self) -> &[String] {
        &self.permitted_domains
    }

    pub fn forbidden_domains(&self) -> &[String] {
        &self.forbidden_domains
    }

    pub fn shortcut(&self) -> Option<&str> {
        self.shortcut.as_deref()
    }

    /// The compiled url pattern, built on first use.
    pub fn compiled_pattern(&self) -> Option<&CompiledPattern> {
        let pattern = self.url_pattern.as_deref()?;
        Some(
            self.compiled
                .get_or_init(|| CompiledPattern::compile(pattern, self.case_sensitive)),
        )
    }

    /// Check the domain constraints against a lowercased host.
    pub fn matches_domain(&self, host: &str) -> bool {
        let permitted = &self.permitted_domains;
        let forbidden = &self.forbidden_domains;

        if !forbidden.is_empty() && forbidden.iter().any(|d| domain_matches(host, d)) {
            return false;
        }

        permitted.is_empty() || permitted.iter().any(|d| domain_matches(host, d))
    }

    /// Full trigger evaluation.
    ///
    /// `lower_url` must be [`fold_case`] of `url` and `host` the lowercased host of `url`.
    pub fn is_triggered(&self, url: &str, lower_url: &str, host: &str) -> bool {
        if self.url_pattern.is_none() {
            return false;
        }

        if let Some(shortcut) = self.shortcut.as_deref() {
            if !lower_url.contains(shortcut) {
                return false;
            }
        }

        if !self.matches_domain(host) {
            return false;
        }

        match self.compiled_pattern() {
            Some(pattern) => pattern.is_match(url, lower_url),
            None => false,
        }
    }
}

// =============================================================================
// Rule
// =============================================================================

/// One entry of the compiled rule list.
#[derive(Debug, Clone)]
pub struct Rule {
    pub trigger: Trigger,
    pub action: Action,
}

impl Rule {
    pub fn new(trigger: Trigger, action: Action) -> Self {
        Self { trigger, action }
    }
}

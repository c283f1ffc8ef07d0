//! Per-query output aggregate

use serde::Serialize;

use crate::types::Action;

/// Scripts, stylesheets and scriptlets selected for one page.
///
/// Created fresh for each query. All five lists are serialized even when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockerData {
    pub scripts: Vec<String>,
    pub css: Vec<String>,
    pub css_extended: Vec<String>,
    pub css_inject: Vec<String>,
    pub scriptlets: Vec<String>,
}

impl BlockerData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the payload of a content action. Empty payloads and
    /// non-content actions add nothing.
    pub fn add_action(&mut self, action: &Action) {
        match action {
            Action::Script(script) => push_non_empty(&mut self.scripts, script),
            Action::Css(css) => push_non_empty(&mut self.css, css),
            Action::CssExtended(css) => push_non_empty(&mut self.css_extended, css),
            Action::CssInject(css) => push_non_empty(&mut self.css_inject, css),
            Action::Scriptlet { name, param } => {
                match param.as_deref().filter(|p| !p.is_empty()) {
                    Some(param) => self.scriptlets.push(param.to_string()),
                    None => {
                        if !name.is_empty() {
                            let invocation = serde_json::json!({ "name": name, "args": [] });
                            self.scriptlets.push(invocation.to_string());
                        }
                    }
                }
            }
            Action::IgnorePreviousRules | Action::Unsupported { .. } => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
            && self.css.is_empty()
            && self.css_extended.is_empty()
            && self.css_inject.is_empty()
            && self.scriptlets.is_empty()
    }

    /// Total number of entries across all lists.
    pub fn len(&self) -> usize {
        self.scripts.len()
            + self.css.len()
            + self.css_extended.len()
            + self.css_inject.len()
            + self.scriptlets.len()
    }

    /// Serialize for transport to the content script.
    pub fn to_json(&self) -> String {
        // Plain string vectors cannot fail to serialize
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

fn push_non_empty(target: &mut Vec<String>, value: &str) {
    if !value.is_empty() {
        target.push(value.to_string());
    }
}

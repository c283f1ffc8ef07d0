//! Advanced Blocking Core Library
//!
//! This crate provides the rule index and matching engine that decides which
//! scripts, stylesheets and scriptlets are injected into a page.
//!
//! # Architecture
//!
//! A rule list is compiled once (see the `ab-compiler` crate) into a [`RuleSet`]:
//! the rules in their original order plus a [`RuleIndex`] that maps shortcut
//! hashes, domain hashes and a fallback list to rule positions. Each query walks
//! the candidates from the highest position down and accumulates a
//! [`BlockerData`].
//!
//! # Modules
//!
//! - `hash`: djb2-style hash used for every index key
//! - `url`: host extraction and suffix walking
//! - `pattern`: url-filter evaluation
//! - `types`: rule model (trigger, action)
//! - `index`: lookup tables and candidate retrieval
//! - `matcher`: precedence resolution
//! - `result`: per-query output aggregate
//! - `ruleset`: compiled state and the atomically swappable container

pub mod hash;
pub mod index;
pub mod matcher;
pub mod pattern;
pub mod result;
pub mod ruleset;
pub mod types;
pub mod url;

// Re-export commonly used types
pub use hash::fast_hash;
pub use index::{IndexStats, RuleIndex, DEFAULT_SHORTCUT_LENGTH};
pub use matcher::{MatchOutcome, Matcher, ScanOutcome};
pub use pattern::{fold_case, CompiledPattern, PatternError};
pub use result::BlockerData;
pub use ruleset::{ContentBlocker, RuleSet};
pub use types::{Action, Rule, Trigger};

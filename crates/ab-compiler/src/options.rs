//! Compile options

use ab_core::DEFAULT_SHORTCUT_LENGTH;

/// What to do with a rule entry that cannot be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Skip the entry and record a diagnostic
    #[default]
    Lenient,
    /// Reject the whole rule list
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub strictness: Strictness,
    /// Compile every url-filter during the build instead of on first match.
    pub eager_patterns: bool,
    /// Shingle length for the shortcut index.
    pub shortcut_length: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            strictness: Strictness::Lenient,
            eager_patterns: false,
            shortcut_length: DEFAULT_SHORTCUT_LENGTH,
        }
    }
}

impl CompileOptions {
    pub fn strict() -> Self {
        Self {
            strictness: Strictness::Strict,
            ..Self::default()
        }
    }
}

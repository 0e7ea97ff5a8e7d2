//! Title-cleaning rules
//!
//! Every rule maps a filename stem to a cleaned title and, for
//! [`RuleId::ExtractArtist`] only, an artist. Rules are pure and stateless;
//! [`RuleChain`] composes an ordered list of them.
//!
//! [`RuleId::ALL`] is the fixed display order of the selection surface. The
//! enabled subset is always applied in that order, never in toggle order.

mod chain;
pub mod transforms;

pub use chain::RuleChain;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result of applying a rule (or a whole chain) to a stem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    /// New title
    pub title: String,
    /// Extracted artist, `None` when the rule does not produce one
    pub artist: Option<String>,
}

impl Transformed {
    /// Title with no artist
    pub fn title_only(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: None,
        }
    }
}

/// Signature shared by every rule
pub type TransformFn = fn(&str) -> Transformed;

/// Identifier of one title-cleaning rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    ExtractArtist = 0,
    FixCasing = 1,
    RemoveNumbers = 2,
    RemoveUrls = 3,
    ReplaceUnderscores = 4,
    RemoveEncoded = 5,
    RemoveSymbols = 6,
}

impl RuleId {
    /// Number of rules
    pub const COUNT: usize = 7;

    /// All rules in display order
    pub const ALL: [RuleId; RuleId::COUNT] = [
        RuleId::ExtractArtist,
        RuleId::FixCasing,
        RuleId::RemoveNumbers,
        RuleId::RemoveUrls,
        RuleId::ReplaceUnderscores,
        RuleId::RemoveEncoded,
        RuleId::RemoveSymbols,
    ];

    /// Position in display order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable kebab-case identifier used on the command line
    pub fn id(self) -> &'static str {
        match self {
            RuleId::ExtractArtist => "extract-artist",
            RuleId::FixCasing => "fix-casing",
            RuleId::RemoveNumbers => "remove-numbers",
            RuleId::RemoveUrls => "remove-urls",
            RuleId::ReplaceUnderscores => "replace-underscores",
            RuleId::RemoveEncoded => "remove-encoded",
            RuleId::RemoveSymbols => "remove-symbols",
        }
    }

    /// Menu label
    pub fn label(self) -> &'static str {
        match self {
            RuleId::ExtractArtist => "Extract Artist from title",
            RuleId::FixCasing => "Fix Casing",
            RuleId::RemoveNumbers => "Remove numbers from titles",
            RuleId::RemoveUrls => "Remove URLs from titles",
            RuleId::ReplaceUnderscores => "Replace underscores with spaces",
            RuleId::RemoveEncoded => "Remove encoded characters",
            RuleId::RemoveSymbols => "Remove symbols",
        }
    }

    /// The pure function implementing this rule
    pub fn transform(self) -> TransformFn {
        match self {
            RuleId::ExtractArtist => transforms::extract_artist,
            RuleId::FixCasing => transforms::fix_casing,
            RuleId::RemoveNumbers => transforms::remove_numbers,
            RuleId::RemoveUrls => transforms::remove_urls,
            RuleId::ReplaceUnderscores => transforms::replace_underscores,
            RuleId::RemoveEncoded => transforms::remove_encoded_chars,
            RuleId::RemoveSymbols => transforms::remove_symbols,
        }
    }

    /// Apply this rule to a stem
    pub fn apply(self, stem: &str) -> Transformed {
        (self.transform())(stem)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Unknown rule identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown rule '{0}' (expected one of: extract-artist, fix-casing, remove-numbers, remove-urls, replace-underscores, remove-encoded, remove-symbols)")]
pub struct UnknownRule(pub String);

impl FromStr for RuleId {
    type Err = UnknownRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        RuleId::ALL
            .into_iter()
            .find(|rule| rule.id() == wanted)
            .ok_or_else(|| UnknownRule(s.to_string()))
    }
}

/// The seven independently toggleable rule flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleSelection {
    enabled: [bool; RuleId::COUNT],
}

impl RuleSelection {
    /// Nothing enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable every rule in `rules`
    pub fn from_rules(rules: impl IntoIterator<Item = RuleId>) -> Self {
        let mut selection = Self::new();
        for rule in rules {
            selection.set(rule, true);
        }
        selection
    }

    /// Flip one flag, returning its new state
    pub fn toggle(&mut self, rule: RuleId) -> bool {
        let flag = &mut self.enabled[rule.index()];
        *flag = !*flag;
        *flag
    }

    pub fn set(&mut self, rule: RuleId, on: bool) {
        self.enabled[rule.index()] = on;
    }

    pub fn is_enabled(&self, rule: RuleId) -> bool {
        self.enabled[rule.index()]
    }

    /// Enabled rules in display order
    pub fn enabled(&self) -> Vec<RuleId> {
        RuleId::ALL
            .into_iter()
            .filter(|rule| self.is_enabled(*rule))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        !self.enabled.iter().any(|on| *on)
    }
}

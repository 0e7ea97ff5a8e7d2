//! Ordered composition of rules

use super::{RuleId, RuleSelection, Transformed};

/// Rules applied left to right, each one seeing the previous rule's title.
///
/// The artist is only overwritten by a rule that returns one, so a later
/// title-only rule never clears an artist an earlier rule extracted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleChain {
    rules: Vec<RuleId>,
}

impl RuleChain {
    /// Chain in exactly the given order
    pub fn new(rules: impl IntoIterator<Item = RuleId>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// Chain of the enabled rules, in display order
    pub fn from_selection(selection: &RuleSelection) -> Self {
        Self::new(selection.enabled())
    }

    /// Chain holding one rule (one pass per rule)
    pub fn single(rule: RuleId) -> Self {
        Self { rules: vec![rule] }
    }

    pub fn rules(&self) -> &[RuleId] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run the chain over a stem. An empty chain returns `(stem, None)`.
    pub fn apply(&self, stem: &str) -> Transformed {
        let mut title = stem.to_string();
        let mut artist = None;

        for rule in &self.rules {
            let out = rule.apply(&title);
            title = out.title;
            if out.artist.is_some() {
                artist = out.artist;
            }
        }

        Transformed { title, artist }
    }
}

//! Run lifecycle state
//!
//! A run moves through:
//! IDLE → FILES_SELECTED → (BACKED_UP) → PROCESSING → DONE
//!
//! Re-selecting files is the only way back to PROCESSING after DONE.

use crate::error::OrganizerError;
use crate::models::FileSet;
use crate::rules::RuleSelection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Run lifecycle phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunPhase {
    /// Nothing selected yet
    #[default]
    Idle,
    /// A file set has been captured
    FilesSelected,
    /// Originals copied to the backup root
    BackedUp,
    /// Apply passes running
    Processing,
    /// All passes finished
    Done,
}

impl RunPhase {
    /// Whether `self → next` is a legal transition
    pub fn can_transition_to(self, next: RunPhase) -> bool {
        use RunPhase::*;
        matches!(
            (self, next),
            (Idle, FilesSelected)
                | (FilesSelected, FilesSelected)
                | (FilesSelected, BackedUp)
                | (FilesSelected, Processing)
                | (BackedUp, FilesSelected)
                | (BackedUp, Processing)
                | (Processing, Done)
                | (Done, FilesSelected)
        )
    }
}

/// How enabled rules are turned into passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PassMode {
    /// One composed chain, one pass over the file set
    #[default]
    Chained,
    /// One full pass per enabled rule, in display order
    PerRule,
}

impl fmt::Display for PassMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassMode::Chained => f.write_str("chained"),
            PassMode::PerRule => f.write_str("per-rule"),
        }
    }
}

impl FromStr for PassMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chained" | "chain" => Ok(PassMode::Chained),
            "per-rule" | "per_rule" | "perrule" => Ok(PassMode::PerRule),
            other => Err(format!(
                "Unknown pass mode '{}' (expected 'chained' or 'per-rule')",
                other
            )),
        }
    }
}

/// Shared count of files whose tag was saved.
///
/// Cloning shares the underlying counter; increments from concurrent workers
/// are atomic.
#[derive(Debug, Clone, Default)]
pub struct ProcessedCounter(Arc<AtomicUsize>);

impl ProcessedCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one, returning the new total
    pub fn increment(&self) -> usize {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// In-memory state of the current process.
///
/// Never persisted; discarded at exit.
#[derive(Debug, Default)]
pub struct RunState {
    pub music_root: Option<PathBuf>,
    pub backup_root: Option<PathBuf>,
    pub selection: RuleSelection,
    pub files: FileSet,
    pub processed: ProcessedCounter,
    phase: RunPhase,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Move to `next`, rejecting illegal transitions
    pub fn transition_to(&mut self, next: RunPhase) -> Result<(), OrganizerError> {
        if !self.phase.can_transition_to(next) {
            return Err(OrganizerError::InvalidPhase {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!(from = ?self.phase, to = ?next, "Run phase transition");
        self.phase = next;
        Ok(())
    }
}

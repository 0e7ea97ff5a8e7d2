//! Run results and per-file failures
//!
//! Per-file failures never abort a pass; they are collected here so the front
//! end can decide whether to itemise them.

use crate::models::PassMode;
use crate::rules::RuleId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Kind of per-file failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Tag could not be loaded; file not processed
    TagRead,
    /// Tag could not be saved; file not processed
    TagWrite,
    /// Rename target already taken; file keeps its name
    RenameCollision,
    /// New title cannot be a filename
    RenameInvalid,
    /// Filesystem refused the rename
    RenameIo,
    /// Copy to the backup root failed
    Backup,
}

/// One file that did not make it through cleanly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    /// File path at the time of failure
    pub path: String,

    pub kind: FailureKind,

    /// Human-readable error message
    pub message: String,

    /// When the failure occurred
    pub occurred_at: DateTime<Utc>,
}

impl FileFailure {
    pub fn new(path: &Path, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            path: path.display().to_string(),
            kind,
            message: message.into(),
            occurred_at: Utc::now(),
        }
    }
}

/// Outcome of one concurrent pass over the file set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassReport {
    /// Rules applied in this pass, in order
    pub rules: Vec<RuleId>,

    /// Files in the set
    pub files: usize,

    /// Files whose tag was saved
    pub processed: usize,

    /// Files moved to a new name
    pub renamed: usize,

    /// Files whose name already matched the new title
    pub unchanged: usize,

    pub failures: Vec<FileFailure>,

    pub duration_ms: u64,
}

/// Outcome of the backup stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackupReport {
    pub backup_root: String,
    pub copied: usize,
    pub failures: Vec<FileFailure>,
}

/// Summary of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub pass_mode: PassMode,

    /// Enabled rules, in display order
    pub rules: Vec<RuleId>,

    /// Files in the set
    pub files_total: usize,

    /// Cumulative processed counter after the run
    pub files_processed: usize,

    pub passes: Vec<PassReport>,

    pub backup: Option<BackupReport>,
}

impl RunReport {
    pub fn renamed(&self) -> usize {
        self.passes.iter().map(|p| p.renamed).sum()
    }

    pub fn unchanged(&self) -> usize {
        self.passes.iter().map(|p| p.unchanged).sum()
    }

    /// Every failure, backup failures first
    pub fn failures(&self) -> impl Iterator<Item = &FileFailure> {
        self.backup
            .iter()
            .flat_map(|b| b.failures.iter())
            .chain(self.passes.iter().flat_map(|p| p.failures.iter()))
    }

    pub fn count_by_kind(&self, kind: FailureKind) -> usize {
        self.failures().filter(|f| f.kind == kind).count()
    }
}

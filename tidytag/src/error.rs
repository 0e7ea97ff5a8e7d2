//! Error types for tidytag
//!
//! Per-file failures (tag, rename, backup copy) never appear here; they are
//! values inside the run report. These are the errors that stop a run.

use crate::models::RunPhase;
use crate::services::{ApplyError, BackupError, ScanError};
use thiserror::Error;

/// Run-blocking error
#[derive(Debug, Error)]
pub enum OrganizerError {
    /// Run requested before a music root was selected
    #[error("No music folder selected")]
    NoMusicRoot,

    /// Backup requested without a backup root
    #[error("No backup folder selected")]
    NoBackupRoot,

    /// Music root could not be scanned
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    /// Backup root could not be prepared
    #[error("Backup failed: {0}")]
    Backup(#[from] BackupError),

    /// Apply engine could not start
    #[error("Apply failed: {0}")]
    Apply(#[from] ApplyError),

    /// Operation not allowed in the current run phase
    #[error("Cannot move from {from:?} to {to:?}")]
    InvalidPhase { from: RunPhase, to: RunPhase },
}

/// Result type alias for organizer operations
pub type Result<T> = std::result::Result<T, OrganizerError>;

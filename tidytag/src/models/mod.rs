//! Data models for a tidy-up run

pub mod audio_file;
pub mod run_report;
pub mod run_state;

pub use audio_file::{AudioFile, FileSet};
pub use run_report::{BackupReport, FailureKind, FileFailure, PassReport, RunReport};
pub use run_state::{PassMode, ProcessedCounter, RunPhase, RunState};

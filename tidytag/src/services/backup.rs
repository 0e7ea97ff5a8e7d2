//! Pre-run backup of the file set
//!
//! Copies every file flat into the backup root. A failed copy is recorded and
//! the rest carry on; only an unusable backup root stops the stage.

use crate::models::{BackupReport, FailureKind, FileFailure, FileSet};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Backup stage errors
#[derive(Debug, Error)]
pub enum BackupError {
    /// Backup root missing and could not be created
    #[error("Cannot create backup folder {path}: {message}")]
    CreateDir { path: PathBuf, message: String },
}

/// Copy every file in `files` into `backup_root`, keeping file names.
///
/// Files with the same name from different directories overwrite each other;
/// the later copy wins and a warning is logged.
pub fn backup_files(files: &FileSet, backup_root: &Path) -> Result<BackupReport, BackupError> {
    fs::create_dir_all(backup_root).map_err(|e| BackupError::CreateDir {
        path: backup_root.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut report = BackupReport {
        backup_root: backup_root.display().to_string(),
        ..BackupReport::default()
    };
    let mut seen_names = HashSet::new();

    for file in files.iter() {
        let Some(name) = file.path().file_name() else {
            report.failures.push(FileFailure::new(
                file.path(),
                FailureKind::Backup,
                "path has no file name",
            ));
            continue;
        };
        let dest = backup_root.join(name);

        if !seen_names.insert(name.to_os_string()) {
            tracing::warn!(
                file = %file.path().display(),
                dest = %dest.display(),
                "Backup name clash, overwriting earlier copy"
            );
        }

        match fs::copy(file.path(), &dest) {
            Ok(_) => report.copied += 1,
            Err(e) => {
                tracing::warn!(
                    file = %file.path().display(),
                    error = %e,
                    "Backup copy failed"
                );
                report
                    .failures
                    .push(FileFailure::new(file.path(), FailureKind::Backup, e.to_string()));
            }
        }
    }

    tracing::info!(
        backup_root = %backup_root.display(),
        copied = report.copied,
        failed = report.failures.len(),
        "Backup complete"
    );

    Ok(report)
}

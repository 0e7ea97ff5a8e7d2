//! Audio file scanner
//!
//! Recursive discovery of `.mp3` files (extension match, case-insensitive)
//! under one root. The result is a sorted snapshot; nothing re-scans during
//! a run.
//!
//! Symlinks are never followed, to files or to directories. Each physical
//! file is reached through exactly one path, so it becomes exactly one
//! member of the file set.

use crate::models::FileSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Extension of the one supported audio type
pub const AUDIO_EXTENSION: &str = "mp3";

/// Audio file scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Permission denied when accessing path
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// General I/O error
    #[error("I/O error on {0}: {1}")]
    Io(PathBuf, String),
}

/// Audio file scanner
pub struct FileScanner {
    ignore_names: Vec<String>,
    max_depth: Option<usize>,
}

impl FileScanner {
    /// Create new file scanner with default ignore list
    ///
    /// Skips system entries like .DS_Store, Thumbs.db, .git, .svn.
    pub fn new() -> Self {
        Self {
            ignore_names: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
                ".svn".to_string(),
            ],
            max_depth: None,
        }
    }

    /// Limit recursion depth (root itself is depth 0)
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Scan directory for audio files, sorted by path
    pub fn scan(&self, root_path: &Path) -> Result<Vec<PathBuf>, ScanError> {
        check_root(root_path)?;

        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .max_depth(self.max_depth.unwrap_or(usize::MAX))
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e));

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.path_is_symlink() {
                        tracing::debug!(path = %entry.path().display(), "Skipping symlink");
                    } else if entry.file_type().is_file() && is_audio_file(entry.path()) {
                        files.push(entry.path().to_path_buf());
                    }
                }
                Err(e) => {
                    // Unreadable sub-directories are skipped
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        files.sort();

        tracing::debug!(
            root = %root_path.display(),
            files = files.len(),
            "Scan complete"
        );

        Ok(files)
    }

    /// Scan and capture the result as a [`FileSet`]
    pub fn scan_file_set(&self, root_path: &Path) -> Result<FileSet, ScanError> {
        let files = self.scan(root_path)?;
        Ok(FileSet::new(root_path, files))
    }

    fn should_process_entry(&self, entry: &DirEntry) -> bool {
        // The root is always walked, whatever its name
        if entry.depth() == 0 {
            return true;
        }
        let file_name = entry.file_name().to_string_lossy();
        !self.ignore_names.iter().any(|name| file_name == name.as_str())
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Root must exist, be a directory and be listable
fn check_root(root_path: &Path) -> Result<(), ScanError> {
    if !root_path.exists() {
        return Err(ScanError::PathNotFound(root_path.to_path_buf()));
    }

    if !root_path.is_dir() {
        return Err(ScanError::NotADirectory(root_path.to_path_buf()));
    }

    match std::fs::read_dir(root_path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            Err(ScanError::PermissionDenied(root_path.to_path_buf()))
        }
        Err(e) => Err(ScanError::Io(root_path.to_path_buf(), e.to_string())),
    }
}

/// Extension check only; file contents are never sniffed
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(AUDIO_EXTENSION))
        .unwrap_or(false)
}

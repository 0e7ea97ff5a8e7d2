//! Apply engine
//!
//! One pass runs a [`RuleChain`] over every file of a [`FileSet`] on a
//! bounded worker pool. Per file, in order:
//!
//! 1. load the tag (or start an empty one)
//! 2. compute `(title, artist)` from the current stem
//! 3. set the title, and the artist only when the chain produced one
//! 4. save the tag and bump the processed counter
//! 5. rename the file to `<title>.<ext>` in its own directory
//!
//! A failure in any step ends that file's unit and lands in the
//! [`PassReport`]; the pass always runs to completion.
//!
//! Each unit owns its `AudioFile` entry for the duration of the pass. The
//! only state shared between units is the processed counter and the set of
//! claimed rename targets.

use crate::models::{
    AudioFile, FailureKind, FileFailure, FileSet, PassReport, ProcessedCounter,
};
use crate::rules::RuleChain;
use crate::services::tag_store::{AudioTag, TagStore};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use thiserror::Error;

/// What to do when a rename target is already taken
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionPolicy {
    /// Leave both files alone and report a collision
    #[default]
    Refuse,
    /// Rename anyway; the existing file is replaced
    Overwrite,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionPolicy::Refuse => f.write_str("refuse"),
            CollisionPolicy::Overwrite => f.write_str("overwrite"),
        }
    }
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "refuse" => Ok(CollisionPolicy::Refuse),
            "overwrite" => Ok(CollisionPolicy::Overwrite),
            other => Err(format!(
                "Unknown collision policy '{}' (expected 'refuse' or 'overwrite')",
                other
            )),
        }
    }
}

/// Worker count when none is configured: CPU count, min 4, max 16
pub fn default_workers() -> usize {
    num_cpus::get().clamp(4, 16)
}

/// Apply engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOptions {
    pub workers: usize,
    pub collision_policy: CollisionPolicy,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            collision_policy: CollisionPolicy::default(),
        }
    }
}

/// Apply engine errors
#[derive(Debug, Error)]
pub enum ApplyError {
    /// Worker pool could not be built
    #[error("Failed to build worker pool: {0}")]
    Pool(String),
}

/// Why a file kept its old name
#[derive(Debug, Error)]
pub enum RenameError {
    /// Title cannot be used as a file name
    #[error("Invalid target name '{title}': {reason}")]
    InvalidTarget { title: String, reason: &'static str },

    /// Target already exists or was claimed by another file in this pass
    #[error("Rename target {to} already taken (from {from})")]
    Collision { from: PathBuf, to: PathBuf },

    /// Filesystem refused the rename
    #[error("Failed to rename {from} to {to}: {message}")]
    Io {
        from: PathBuf,
        to: PathBuf,
        message: String,
    },
}

impl RenameError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            RenameError::InvalidTarget { .. } => FailureKind::RenameInvalid,
            RenameError::Collision { .. } => FailureKind::RenameCollision,
            RenameError::Io { .. } => FailureKind::RenameIo,
        }
    }
}

/// Successful end of one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Renamed,
    Unchanged,
}

/// Runs passes of a rule chain over a file set
pub struct ApplyEngine<S: TagStore> {
    store: Arc<S>,
    counter: ProcessedCounter,
    options: ApplyOptions,
    pool: rayon::ThreadPool,
}

impl<S: TagStore> ApplyEngine<S> {
    /// Build an engine with its own worker pool.
    ///
    /// `counter` is shared with the caller and accumulates across passes.
    pub fn new(
        store: Arc<S>,
        counter: ProcessedCounter,
        options: ApplyOptions,
    ) -> Result<Self, ApplyError> {
        let workers = options.workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("tidytag-apply-{}", i))
            .build()
            .map_err(|e| ApplyError::Pool(e.to_string()))?;

        Ok(Self {
            store,
            counter,
            options: ApplyOptions { workers, ..options },
            pool,
        })
    }

    pub fn options(&self) -> ApplyOptions {
        self.options
    }

    /// Run one full pass of `chain` over `files`.
    ///
    /// Returns once every file's unit has finished. Renamed entries in
    /// `files` carry their new path afterwards.
    pub fn process_files(&self, files: &mut FileSet, chain: &RuleChain) -> PassReport {
        let start = Instant::now();
        let total = files.len();

        tracing::info!(
            files = total,
            rules = ?chain.rules(),
            workers = self.options.workers,
            collision_policy = %self.options.collision_policy,
            "Starting apply pass"
        );

        // Every current path starts out claimed, so a file can never be
        // renamed onto another member regardless of scheduling.
        let claims: Mutex<HashSet<PathBuf>> = Mutex::new(files.paths().into_iter().collect());

        let results: Vec<Result<FileOutcome, FileFailure>> = self.pool.install(|| {
            files
                .entries_mut()
                .par_iter_mut()
                .map(|file| self.process_file(file, chain, &claims))
                .collect()
        });

        let mut report = PassReport {
            rules: chain.rules().to_vec(),
            files: total,
            ..PassReport::default()
        };

        for result in results {
            match result {
                Ok(FileOutcome::Renamed) => {
                    report.processed += 1;
                    report.renamed += 1;
                }
                Ok(FileOutcome::Unchanged) => {
                    report.processed += 1;
                    report.unchanged += 1;
                }
                Err(failure) => {
                    if !matches!(failure.kind, FailureKind::TagRead | FailureKind::TagWrite) {
                        report.processed += 1;
                    }
                    report.failures.push(failure);
                }
            }
        }
        report.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            files = total,
            processed = report.processed,
            renamed = report.renamed,
            unchanged = report.unchanged,
            failed = report.failures.len(),
            duration_ms = report.duration_ms,
            "Apply pass complete"
        );

        report
    }

    fn process_file(
        &self,
        file: &mut AudioFile,
        chain: &RuleChain,
        claims: &Mutex<HashSet<PathBuf>>,
    ) -> Result<FileOutcome, FileFailure> {
        let path = file.path().to_path_buf();

        let mut tag = match self.store.load(&path) {
            Ok(Some(tag)) => tag,
            Ok(None) => self.store.init_tag(),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Tag load failed");
                return Err(FileFailure::new(&path, FailureKind::TagRead, e.to_string()));
            }
        };

        let out = chain.apply(&file.stem());
        tag.set_title(&out.title);
        if let Some(artist) = &out.artist {
            tag.set_artist(artist);
        }

        if let Err(e) = self.store.save(&path, &tag) {
            tracing::warn!(file = %path.display(), error = %e, "Tag save failed");
            return Err(FileFailure::new(&path, FailureKind::TagWrite, e.to_string()));
        }
        self.counter.increment();

        match self.rename(file, &out.title, claims) {
            Ok(outcome) => {
                tracing::debug!(
                    from = %path.display(),
                    to = %file.path().display(),
                    title = %out.title,
                    artist = ?out.artist,
                    outcome = ?outcome,
                    "File processed"
                );
                Ok(outcome)
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Rename failed");
                Err(FileFailure::new(&path, e.failure_kind(), e.to_string()))
            }
        }
    }

    fn rename(
        &self,
        file: &mut AudioFile,
        title: &str,
        claims: &Mutex<HashSet<PathBuf>>,
    ) -> Result<FileOutcome, RenameError> {
        validate_title(title)?;

        let source = file.path().to_path_buf();
        let target = file.target_for(title);
        if target == source {
            return Ok(FileOutcome::Unchanged);
        }

        if self.options.collision_policy == CollisionPolicy::Refuse {
            let newly_claimed = claims
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(target.clone());
            if !newly_claimed || (target.exists() && !is_same_file(&source, &target)) {
                return Err(RenameError::Collision {
                    from: source,
                    to: target,
                });
            }
        }

        fs::rename(&source, &target).map_err(|e| RenameError::Io {
            from: source.clone(),
            to: target.clone(),
            message: e.to_string(),
        })?;

        self.store.relocate(&source, &target);
        file.set_path(target);
        Ok(FileOutcome::Renamed)
    }
}

/// Reject titles that cannot be a single file name
pub fn validate_title(title: &str) -> Result<(), RenameError> {
    let reason = if title.trim().is_empty() {
        Some("title is empty")
    } else if title == "." || title == ".." {
        Some("title is a relative path component")
    } else if title.chars().any(std::path::is_separator) {
        Some("title contains a path separator")
    } else if title.contains('\0') {
        Some("title contains a NUL character")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(RenameError::InvalidTarget {
            title: title.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Case-only renames on case-insensitive filesystems hit the source itself
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

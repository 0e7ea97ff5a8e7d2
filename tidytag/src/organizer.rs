//! Organizer facade
//!
//! Holds the in-memory run state and exposes the operations a front end
//! needs: pick folders, toggle rules, back up, preview and run. The front end
//! keeps no state of its own beyond what it reads back from here.

use crate::error::{OrganizerError, Result};
use crate::models::{BackupReport, FileSet, PassMode, RunPhase, RunReport, RunState};
use crate::rules::{RuleChain, RuleId, RuleSelection};
use crate::models::AudioFile;
use crate::services::{
    backup, default_workers, validate_title, ApplyEngine, ApplyOptions, CollisionPolicy,
    FileScanner, TagStore,
};
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Run settings chosen by the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrganizerOptions {
    pub pass_mode: PassMode,
    pub collision_policy: CollisionPolicy,
    pub workers: usize,
}

impl Default for OrganizerOptions {
    fn default() -> Self {
        Self {
            pass_mode: PassMode::default(),
            collision_policy: CollisionPolicy::default(),
            workers: default_workers(),
        }
    }
}

/// What a run would do to one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewEntry {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub target: PathBuf,
}

impl PreviewEntry {
    pub fn renames(&self) -> bool {
        self.path != self.target
    }

    /// One chain applied to the current stem
    fn chained(file: &AudioFile, chain: &RuleChain) -> Self {
        let out = chain.apply(&file.stem());
        Self {
            path: file.path().to_path_buf(),
            target: preview_target(file, &out.title),
            title: out.title,
            artist: out.artist,
        }
    }

    /// One rule at a time. A title that cannot become a file name leaves
    /// the old name in place, and the next rule starts from that name.
    fn per_rule(file: &AudioFile, rules: &[RuleId]) -> Self {
        let mut stem = file.stem();
        let mut title = stem.clone();
        let mut artist = None;
        let mut target = file.path().to_path_buf();

        for rule in rules {
            let out = rule.apply(&stem);
            if out.artist.is_some() {
                artist = out.artist;
            }
            if validate_title(&out.title).is_ok() {
                target = file.target_for(&out.title);
                stem = out.title.clone();
            }
            title = out.title;
        }

        Self {
            path: file.path().to_path_buf(),
            title,
            artist,
            target,
        }
    }
}

fn preview_target(file: &AudioFile, title: &str) -> PathBuf {
    match validate_title(title) {
        Ok(()) => file.target_for(title),
        Err(_) => file.path().to_path_buf(),
    }
}

/// Music organizer bound to one tag store
pub struct Organizer<S: TagStore> {
    state: RunState,
    store: Arc<S>,
    options: OrganizerOptions,
    scanner: FileScanner,
    backup: Option<BackupReport>,
}

impl<S: TagStore> Organizer<S> {
    pub fn new(store: Arc<S>, options: OrganizerOptions) -> Self {
        Self {
            state: RunState::new(),
            store,
            options,
            scanner: FileScanner::new(),
            backup: None,
        }
    }

    pub fn options(&self) -> OrganizerOptions {
        self.options
    }

    pub fn phase(&self) -> RunPhase {
        self.state.phase()
    }

    pub fn music_root(&self) -> Option<&Path> {
        self.state.music_root.as_deref()
    }

    pub fn backup_root(&self) -> Option<&Path> {
        self.state.backup_root.as_deref()
    }

    pub fn files(&self) -> &FileSet {
        &self.state.files
    }

    pub fn selection(&self) -> &RuleSelection {
        &self.state.selection
    }

    /// Files whose tag was saved, across every run of this process
    pub fn processed_count(&self) -> usize {
        self.state.processed.get()
    }

    /// Select the music folder and capture its file set.
    ///
    /// On a scan error the previous selection is kept.
    pub fn set_music_root(&mut self, path: impl Into<PathBuf>) -> Result<usize> {
        let path = path.into();
        let files = self.scanner.scan_file_set(&path)?;
        self.state.transition_to(RunPhase::FilesSelected)?;

        tracing::info!(
            music_root = %path.display(),
            files = files.len(),
            "Music folder selected"
        );

        let count = files.len();
        self.state.music_root = Some(path);
        self.state.files = files;
        self.backup = None;
        Ok(count)
    }

    /// Configure the backup folder. Nothing is scanned or copied here.
    pub fn set_backup_root(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        tracing::info!(backup_root = %path.display(), "Backup folder selected");
        self.state.backup_root = Some(path);
    }

    /// Flip one rule, returning its new state
    pub fn toggle_rule(&mut self, rule: RuleId) -> bool {
        let on = self.state.selection.toggle(rule);
        tracing::debug!(rule = %rule, enabled = on, "Rule toggled");
        on
    }

    pub fn set_rule(&mut self, rule: RuleId, on: bool) {
        self.state.selection.set(rule, on);
    }

    /// Copy every selected file into the backup folder
    pub fn backup_files(&mut self) -> Result<BackupReport> {
        let backup_root = self
            .state
            .backup_root
            .clone()
            .ok_or(OrganizerError::NoBackupRoot)?;

        if !self.state.phase().can_transition_to(RunPhase::BackedUp) {
            return Err(OrganizerError::InvalidPhase {
                from: self.state.phase(),
                to: RunPhase::BackedUp,
            });
        }

        let report = backup::backup_files(&self.state.files, &backup_root)?;
        self.state.transition_to(RunPhase::BackedUp)?;
        self.backup = Some(report.clone());
        Ok(report)
    }

    /// What a run in the configured pass mode would produce, without
    /// touching tags or files.
    ///
    /// Rename collisions depend on the rest of the folder and are not
    /// predicted.
    pub fn preview(&self) -> Vec<PreviewEntry> {
        let files = self.state.files.iter();
        match self.options.pass_mode {
            PassMode::Chained => {
                let chain = RuleChain::from_selection(&self.state.selection);
                files.map(|file| PreviewEntry::chained(file, &chain)).collect()
            }
            PassMode::PerRule => {
                let rules = self.state.selection.enabled();
                files.map(|file| PreviewEntry::per_rule(file, &rules)).collect()
            }
        }
    }

    /// Apply the enabled rules to the selected files.
    ///
    /// Backs up first when a backup folder is set and no backup was taken
    /// for this selection. Chained mode runs one pass with the composed
    /// chain; per-rule mode runs one full pass per enabled rule in display
    /// order, each starting after the previous one has finished.
    pub fn run(&mut self) -> Result<RunReport> {
        if self.state.music_root.is_none() {
            return Err(OrganizerError::NoMusicRoot);
        }

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let rules = self.state.selection.enabled();

        if self.state.backup_root.is_some() && self.state.phase() == RunPhase::FilesSelected {
            self.backup_files()?;
        }

        let engine = ApplyEngine::new(
            Arc::clone(&self.store),
            self.state.processed.clone(),
            ApplyOptions {
                workers: self.options.workers,
                collision_policy: self.options.collision_policy,
            },
        )?;

        self.state.transition_to(RunPhase::Processing)?;

        tracing::info!(
            run_id = %run_id,
            files = self.state.files.len(),
            rules = ?rules,
            pass_mode = %self.options.pass_mode,
            "Run started"
        );

        let chains: Vec<RuleChain> = match self.options.pass_mode {
            PassMode::Chained if rules.is_empty() => Vec::new(),
            PassMode::Chained => vec![RuleChain::new(rules.iter().copied())],
            PassMode::PerRule => rules.iter().copied().map(RuleChain::single).collect(),
        };

        let mut passes = Vec::with_capacity(chains.len());
        for chain in &chains {
            passes.push(engine.process_files(&mut self.state.files, chain));
        }

        self.state.transition_to(RunPhase::Done)?;

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            pass_mode: self.options.pass_mode,
            rules,
            files_total: self.state.files.len(),
            files_processed: self.state.processed.get(),
            passes,
            backup: self.backup.clone(),
        };

        tracing::info!(
            run_id = %run_id,
            files_processed = report.files_processed,
            renamed = report.renamed(),
            failed = report.failures().count(),
            "Processing complete"
        );

        Ok(report)
    }
}

//! Audio files and the per-run file set

use std::path::{Path, PathBuf};

/// One discovered audio file.
///
/// Identity is the path, which changes in place when the file is renamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    path: PathBuf,
}

impl AudioFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Current path on disk
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Containing directory
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Filename without its last extension, decoded lossily
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extension exactly as found on disk (`MP3` stays `MP3`)
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Path this file would have after taking `title` as its name
    pub fn target_for(&self, title: &str) -> PathBuf {
        let ext = self.extension();
        let name = if ext.is_empty() {
            title.to_string()
        } else {
            format!("{}.{}", title, ext)
        };
        self.directory().join(name)
    }

    pub(crate) fn set_path(&mut self, path: PathBuf) {
        self.path = path;
    }
}

/// Snapshot of the audio files under one root.
///
/// Membership is fixed once captured: callers can reach the entries mutably
/// only as a slice, so a run can rename files but never add or drop any.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    root: PathBuf,
    files: Vec<AudioFile>,
}

impl FileSet {
    pub fn new(root: impl Into<PathBuf>, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: paths.into_iter().map(AudioFile::new).collect(),
        }
    }

    /// Root directory the snapshot was taken from
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AudioFile> {
        self.files.iter()
    }

    /// Current paths of every member
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [AudioFile] {
        &mut self.files
    }
}

//! Tag store abstraction
//!
//! The apply engine only needs three things from a tag codec: load a tag if
//! the file has one, create an empty one, and save it back. [`Id3TagStore`]
//! does this against real files with the `id3` crate; [`MemoryTagStore`]
//! keeps tags in memory and can be told to fail for specific paths.

use id3::{ErrorKind, TagLike, Version};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Tag store errors. Both are fatal for one file only.
#[derive(Debug, Error)]
pub enum TagError {
    /// Tag exists but could not be read or parsed
    #[error("Failed to read tag from {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Tag could not be written back
    #[error("Failed to write tag to {path}: {message}")]
    Write { path: PathBuf, message: String },
}

/// Title and artist fields of a tag
pub trait AudioTag {
    fn title(&self) -> Option<&str>;
    fn set_title(&mut self, title: &str);
    fn artist(&self) -> Option<&str>;
    fn set_artist(&mut self, artist: &str);
}

/// Per-file tag persistence
pub trait TagStore: Send + Sync {
    type Tag: AudioTag + Send;

    /// Load the tag of `path`. `Ok(None)` means the file has no tag yet.
    fn load(&self, path: &Path) -> Result<Option<Self::Tag>, TagError>;

    /// Empty tag for a file that has none
    fn init_tag(&self) -> Self::Tag;

    /// Persist `tag` to `path`. Must be flushed before returning.
    fn save(&self, path: &Path, tag: &Self::Tag) -> Result<(), TagError>;

    /// Called after `from` was renamed to `to`. File-backed stores need
    /// nothing here since the tag travels with the file.
    fn relocate(&self, _from: &Path, _to: &Path) {}
}

// ============================================================================
// ID3
// ============================================================================

impl AudioTag for id3::Tag {
    fn title(&self) -> Option<&str> {
        TagLike::title(self)
    }

    fn set_title(&mut self, title: &str) {
        TagLike::set_title(self, title);
    }

    fn artist(&self) -> Option<&str> {
        TagLike::artist(self)
    }

    fn set_artist(&mut self, artist: &str) {
        TagLike::set_artist(self, artist);
    }
}

/// ID3v2 tags embedded in MP3 files
#[derive(Debug, Clone, Copy, Default)]
pub struct Id3TagStore;

impl Id3TagStore {
    pub fn new() -> Self {
        Self
    }
}

impl TagStore for Id3TagStore {
    type Tag = id3::Tag;

    fn load(&self, path: &Path) -> Result<Option<id3::Tag>, TagError> {
        match id3::Tag::read_from_path(path) {
            Ok(tag) => Ok(Some(tag)),
            Err(e) if matches!(e.kind, ErrorKind::NoTag) => Ok(None),
            Err(e) => Err(TagError::Read {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    fn init_tag(&self) -> id3::Tag {
        id3::Tag::new()
    }

    fn save(&self, path: &Path, tag: &id3::Tag) -> Result<(), TagError> {
        tag.write_to_path(path, Version::Id3v24)
            .map_err(|e| TagError::Write {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Plain title/artist pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTag {
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl AudioTag for MemoryTag {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    fn artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    fn set_artist(&mut self, artist: &str) {
        self.artist = Some(artist.to_string());
    }
}

/// Tags held in memory, keyed by current path
#[derive(Debug, Default)]
pub struct MemoryTagStore {
    tags: Mutex<HashMap<PathBuf, MemoryTag>>,
    fail_on_load: Mutex<HashSet<PathBuf>>,
    fail_on_save: Mutex<HashSet<PathBuf>>,
    saves: Mutex<usize>,
}

/// Poisoning only means another worker panicked mid-update; the map is still usable.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl MemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a tag for `path`
    pub fn insert(&self, path: impl Into<PathBuf>, tag: MemoryTag) {
        lock(&self.tags).insert(path.into(), tag);
    }

    /// Current tag of `path`, if any
    pub fn get(&self, path: &Path) -> Option<MemoryTag> {
        lock(&self.tags).get(path).cloned()
    }

    /// Make every load of `path` fail
    pub fn fail_on_load(&self, path: impl Into<PathBuf>) {
        lock(&self.fail_on_load).insert(path.into());
    }

    /// Make every save to `path` fail
    pub fn fail_on_save(&self, path: impl Into<PathBuf>) {
        lock(&self.fail_on_save).insert(path.into());
    }

    /// Successful saves so far
    pub fn save_count(&self) -> usize {
        *lock(&self.saves)
    }
}

impl TagStore for MemoryTagStore {
    type Tag = MemoryTag;

    fn load(&self, path: &Path) -> Result<Option<MemoryTag>, TagError> {
        if lock(&self.fail_on_load).contains(path) {
            return Err(TagError::Read {
                path: path.to_path_buf(),
                message: "injected load failure".to_string(),
            });
        }
        Ok(self.get(path))
    }

    fn init_tag(&self) -> MemoryTag {
        MemoryTag::default()
    }

    fn save(&self, path: &Path, tag: &MemoryTag) -> Result<(), TagError> {
        if lock(&self.fail_on_save).contains(path) {
            return Err(TagError::Write {
                path: path.to_path_buf(),
                message: "injected save failure".to_string(),
            });
        }
        lock(&self.tags).insert(path.to_path_buf(), tag.clone());
        *lock(&self.saves) += 1;
        Ok(())
    }

    fn relocate(&self, from: &Path, to: &Path) {
        let mut tags = lock(&self.tags);
        if let Some(tag) = tags.remove(from) {
            tags.insert(to.to_path_buf(), tag);
        }
    }
}

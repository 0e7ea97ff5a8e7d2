//! Service modules: discovery, tag persistence, backup and the apply engine

pub mod apply_engine;
pub mod backup;
pub mod file_scanner;
pub mod tag_store;

pub use apply_engine::{
    default_workers, validate_title, ApplyEngine, ApplyError, ApplyOptions, CollisionPolicy,
    RenameError,
};
pub use backup::{backup_files, BackupError};
pub use file_scanner::{FileScanner, ScanError};
pub use tag_store::{AudioTag, Id3TagStore, MemoryTag, MemoryTagStore, TagError, TagStore};

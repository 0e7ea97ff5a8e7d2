//! tidytag library interface
//!
//! Cleans MP3 titles derived from file names, writes them into the ID3 tag
//! and renames the files to match. Exposed as a library for the CLI and for
//! integration testing.

pub mod error;
pub mod models;
pub mod organizer;
pub mod rules;
pub mod services;

pub use crate::error::{OrganizerError, Result};
pub use crate::organizer::{Organizer, OrganizerOptions, PreviewEntry};

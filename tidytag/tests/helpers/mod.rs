//! Test Helper Utilities
//!
//! Shared utilities for testing tidytag

#![allow(dead_code)]

pub mod log_capture;
pub mod mp3_fixtures;

pub use log_capture::{capture_logs, LogCapture};
pub use mp3_fixtures::{music_dir, read_tag, write_mp3, write_tagged_mp3};

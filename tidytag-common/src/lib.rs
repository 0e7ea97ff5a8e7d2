//! # tidytag Common Library
//!
//! Shared code for the tidytag crates:
//! - Error and Result types
//! - Bootstrap configuration loading (read-only TOML)
//! - Music/backup root resolution

pub mod config;
pub mod error;

pub use config::{LoggingConfig, TomlConfig};
pub use error::{Error, Result};

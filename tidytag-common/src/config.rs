//! Bootstrap configuration loading and root folder resolution
//!
//! The configuration file is optional and read-only. Nothing a run does is
//! ever written back; rule selection is deliberately absent from the file.
//!
//! Root folder resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Unset (caller decides whether that is an error)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TIDYTAG_CONFIG";

/// Environment variable naming the music root
pub const MUSIC_ROOT_ENV_VAR: &str = "TIDYTAG_MUSIC_ROOT";

/// Environment variable naming the backup root
pub const BACKUP_ROOT_ENV_VAR: &str = "TIDYTAG_BACKUP_ROOT";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Directory scanned for audio files
    #[serde(default)]
    pub music_root: Option<PathBuf>,

    /// Directory receiving pre-run copies of the original files
    #[serde(default)]
    pub backup_root: Option<PathBuf>,

    /// Worker pool size (defaults to CPU count clamped to 4..=16)
    #[serde(default)]
    pub workers: Option<usize>,

    /// "refuse" or "overwrite"
    #[serde(default)]
    pub collision_policy: Option<String>,

    /// "chained" or "per-rule"
    #[serde(default)]
    pub pass_mode: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Range checks serde cannot express
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(Error::InvalidInput("workers must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Locate the config file.
///
/// Explicit path wins, then `TIDYTAG_CONFIG`, then
/// `<config_dir>/tidytag/config.toml`. Returns `None` when the platform has no
/// config directory.
pub fn config_file_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir().map(|d| d.join("tidytag").join("config.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Load the bootstrap configuration.
///
/// A missing file at the default location yields defaults. A missing file the
/// user asked for explicitly is an error, as is a malformed file anywhere.
pub fn load_bootstrap_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = config_file_path(explicit) else {
        debug!("No config directory on this platform, using defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        if explicit.is_some() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(TomlConfig::default());
    }

    let config = load_toml_config(&path)?;
    info!(path = %path.display(), "Loaded TOML configuration");
    Ok(config)
}

/// Resolve the music root: CLI > `TIDYTAG_MUSIC_ROOT` > TOML
pub fn resolve_music_root(cli_arg: Option<&Path>, config: &TomlConfig) -> Option<PathBuf> {
    resolve_root(cli_arg, MUSIC_ROOT_ENV_VAR, config.music_root.as_deref())
}

/// Resolve the backup root: CLI > `TIDYTAG_BACKUP_ROOT` > TOML
pub fn resolve_backup_root(cli_arg: Option<&Path>, config: &TomlConfig) -> Option<PathBuf> {
    resolve_root(cli_arg, BACKUP_ROOT_ENV_VAR, config.backup_root.as_deref())
}

fn resolve_root(cli_arg: Option<&Path>, env_var_name: &str, toml_value: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: TOML config file
    toml_value.map(Path::to_path_buf)
}

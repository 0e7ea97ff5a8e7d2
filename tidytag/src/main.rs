//! tidytag - MP3 title cleaner
//!
//! Derives a clean title (and optionally an artist) from each file name under
//! a music folder, writes it into the ID3 tag and renames the file to match.
//!
//! Subcommands:
//! - `run`: back up (when a backup folder is set), tag and rename
//! - `preview`: show what `run` would do without touching anything
//! - `rules`: list rule identifiers

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tidytag::models::{PassMode, RunReport};
use tidytag::rules::RuleId;
use tidytag::services::{default_workers, CollisionPolicy, Id3TagStore};
use tidytag::{Organizer, OrganizerError, OrganizerOptions, PreviewEntry};
use tidytag_common::config::{load_bootstrap_config, resolve_backup_root, resolve_music_root};
use tidytag_common::TomlConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for tidytag
#[derive(Parser, Debug)]
#[command(name = "tidytag")]
#[command(about = "Clean MP3 titles from file names, write them to tags and rename files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: $TIDYTAG_CONFIG, then <config dir>/tidytag/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overrides RUST_LOG and the config file)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tag and rename every MP3 under the music folder
    Run(RunArgs),
    /// Show titles and target names without changing anything
    Preview(RunArgs),
    /// List the available rules in application order
    Rules {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Folder scanned recursively for .mp3 files
    #[arg(short, long, env = "TIDYTAG_MUSIC_ROOT")]
    music_root: Option<PathBuf>,

    /// Folder receiving copies of the originals before anything changes
    #[arg(short, long, env = "TIDYTAG_BACKUP_ROOT")]
    backup_root: Option<PathBuf>,

    /// Enable a rule (repeatable; see `tidytag rules`)
    #[arg(short, long = "rule", value_name = "RULE")]
    rules: Vec<RuleId>,

    /// Enable all seven rules
    #[arg(long)]
    all_rules: bool,

    /// chained (one pass) or per-rule (one pass per rule)
    #[arg(long)]
    pass_mode: Option<PassMode>,

    /// refuse or overwrite when a target name is taken
    #[arg(long)]
    collision: Option<CollisionPolicy>,

    /// Worker threads (default: CPU count, min 4, max 16)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_bootstrap_config(cli.config.as_deref())
        .context("Failed to load configuration")?;

    init_tracing(&config.logging.level, cli.verbose);

    info!(
        "Starting tidytag v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match cli.command {
        Command::Rules { json } => print_rules(json),
        Command::Preview(args) => {
            let json = args.json;
            let entries = tokio::task::spawn_blocking(move || -> Result<Vec<PreviewEntry>> {
                let organizer = prepare(&args, &config)?;
                Ok(organizer.preview())
            })
            .await
            .context("Preview task panicked")??;
            print_preview(&entries, json)
        }
        Command::Run(args) => {
            let json = args.json;
            let report = tokio::task::spawn_blocking(move || -> Result<RunReport> {
                let mut organizer = prepare(&args, &config)?;
                organizer.run().context("Run failed")
            })
            .await
            .context("Run task panicked")??;
            print_report(&report, json)
        }
    }
}

/// RUST_LOG wins, then the config file level; `--verbose` forces debug
fn init_tracing(config_level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build an organizer with its folder scanned and rules enabled
fn prepare(args: &RunArgs, config: &TomlConfig) -> Result<Organizer<Id3TagStore>> {
    let pass_mode = match args.pass_mode {
        Some(mode) => mode,
        None => config
            .pass_mode
            .as_deref()
            .map(str::parse::<PassMode>)
            .transpose()
            .map_err(anyhow::Error::msg)
            .context("Invalid pass_mode in config file")?
            .unwrap_or_default(),
    };

    let collision_policy = match args.collision {
        Some(policy) => policy,
        None => config
            .collision_policy
            .as_deref()
            .map(str::parse::<CollisionPolicy>)
            .transpose()
            .map_err(anyhow::Error::msg)
            .context("Invalid collision_policy in config file")?
            .unwrap_or_default(),
    };

    let workers = args.workers.or(config.workers).unwrap_or_else(default_workers);

    let mut organizer = Organizer::new(
        Arc::new(Id3TagStore::new()),
        OrganizerOptions {
            pass_mode,
            collision_policy,
            workers,
        },
    );

    let music_root = resolve_music_root(args.music_root.as_deref(), config)
        .ok_or(OrganizerError::NoMusicRoot)?;
    organizer
        .set_music_root(&music_root)
        .with_context(|| format!("Failed to scan {}", music_root.display()))?;

    if let Some(backup_root) = resolve_backup_root(args.backup_root.as_deref(), config) {
        organizer.set_backup_root(backup_root);
    }

    let rules: Vec<RuleId> = if args.all_rules {
        RuleId::ALL.to_vec()
    } else {
        args.rules.clone()
    };
    for rule in rules {
        organizer.set_rule(rule, true);
    }

    Ok(organizer)
}

fn print_rules(json: bool) -> Result<()> {
    if json {
        let rules: Vec<_> = RuleId::ALL
            .iter()
            .map(|r| serde_json::json!({ "id": r.id(), "label": r.label() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rules)?);
    } else {
        for rule in RuleId::ALL {
            println!("{:<20} {}", rule.id(), rule.label());
        }
    }
    Ok(())
}

fn print_preview(entries: &[PreviewEntry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    for entry in entries {
        let artist = entry
            .artist
            .as_deref()
            .map(|a| format!(" [artist: {}]", a))
            .unwrap_or_default();
        if entry.renames() {
            println!(
                "{} -> {}{}",
                entry.path.display(),
                entry.target.display(),
                artist
            );
        } else {
            println!("{} (unchanged){}", entry.path.display(), artist);
        }
    }
    println!("{} files", entries.len());
    Ok(())
}

fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "Processing complete. {} files processed.",
        report.files_processed
    );
    println!(
        "  files: {}  passes: {}  renamed: {}  unchanged: {}",
        report.files_total,
        report.passes.len(),
        report.renamed(),
        report.unchanged()
    );
    if let Some(backup) = &report.backup {
        println!(
            "  backup: {} copied to {} ({} failed)",
            backup.copied,
            backup.backup_root,
            backup.failures.len()
        );
    }
    for failure in report.failures() {
        println!("  {:?}: {}: {}", failure.kind, failure.path, failure.message);
    }
    Ok(())
}

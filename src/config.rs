//! Configuration for podium paths and league settings.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (PODIUM_HOME, PODIUM_LEDGER)
//! 2. Config file (.podium/config.yaml)
//! 3. Defaults (~/.podium)
//!
//! Config file discovery:
//! - Searches current directory and parents for .podium/config.yaml
//! - `paths.home` is relative to the .podium/ directory
//! - `paths.ledger` is relative to the project root (parent of .podium/)

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Deserialize;

use crate::core::alias::{AliasPair, AliasTable};
use crate::core::teams::DEFAULT_MIN_TOTALS_ROW;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// League local time: medals are dated in UTC-6
pub const DEFAULT_CAPTURE_UTC_OFFSET_HOURS: i32 = -6;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    /// Extra (common, formal) pairs; same common name overrides a built-in
    #[serde(default)]
    pub aliases: Vec<AliasPair>,
    #[serde(default)]
    pub ledger: Option<LedgerConfig>,
    #[serde(default)]
    pub draft: Option<DraftConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .podium/)
    pub home: Option<String>,
    /// Ledger file (relative to project root)
    pub ledger: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    pub capture_utc_offset_hours: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftConfig {
    pub min_totals_row: Option<usize>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to podium home
    pub home: PathBuf,
    /// Ledger JSONL file
    pub ledger: PathBuf,
    /// Alias pairs layered over the built-in table
    pub aliases: Vec<AliasPair>,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub capture_offset: FixedOffset,
    pub min_totals_row: usize,
}

impl ResolvedConfig {
    /// Built-in aliases plus configured overrides
    pub fn alias_table(&self) -> AliasTable {
        AliasTable::with_overrides(&self.aliases)
    }

    /// Today's date in the capture timezone
    pub fn capture_date(&self) -> NaiveDate {
        capture_date_at(Utc::now(), self.capture_offset)
    }
}

/// Calendar date of `now` in a fixed-offset timezone
pub fn capture_date_at(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

fn offset_from_hours(hours: i32) -> Result<FixedOffset> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .with_context(|| format!("Invalid capture_utc_offset_hours: {}", hours))
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".podium").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Combine config file (if any), environment and defaults
fn resolve(config_file: Option<PathBuf>) -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".podium");

    let env_home = std::env::var("PODIUM_HOME").ok().map(PathBuf::from);
    let env_ledger = std::env::var("PODIUM_LEDGER").ok().map(PathBuf::from);

    let Some(ref config_path) = config_file else {
        let home = env_home.unwrap_or(default_home);
        let ledger = env_ledger.unwrap_or_else(|| home.join("ledger.jsonl"));

        return Ok(ResolvedConfig {
            home,
            ledger,
            aliases: Vec::new(),
            config_file: None,
            capture_offset: offset_from_hours(DEFAULT_CAPTURE_UTC_OFFSET_HOURS)?,
            min_totals_row: DEFAULT_MIN_TOTALS_ROW,
        });
    };

    let config = load_config_file(config_path)?;

    // .podium/ and the project root above it
    let podium_dir = config_path.parent().unwrap_or(Path::new("."));
    let base_dir = podium_dir.parent().unwrap_or(Path::new("."));

    let home = match (env_home, &config.paths.home) {
        (Some(home), _) => home,
        (None, Some(home_path)) => resolve_path(podium_dir, home_path),
        (None, None) => default_home,
    };

    let ledger = match (env_ledger, &config.paths.ledger) {
        (Some(ledger), _) => ledger,
        (None, Some(ledger_path)) => resolve_path(base_dir, ledger_path),
        (None, None) => home.join("ledger.jsonl"),
    };

    let hours = config
        .ledger
        .as_ref()
        .and_then(|l| l.capture_utc_offset_hours)
        .unwrap_or(DEFAULT_CAPTURE_UTC_OFFSET_HOURS);

    let min_totals_row = config
        .draft
        .as_ref()
        .and_then(|d| d.min_totals_row)
        .unwrap_or(DEFAULT_MIN_TOTALS_ROW);

    Ok(ResolvedConfig {
        home,
        ledger,
        aliases: config.aliases,
        config_file: config_file.clone(),
        capture_offset: offset_from_hours(hours)?,
        min_totals_row,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    resolve(find_config_file())
}

/// Load configuration from an explicit config file (skips discovery and cache)
pub fn load_config_from(path: &Path) -> Result<ResolvedConfig> {
    resolve(Some(path.to_path_buf()))
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// Get the podium home directory
pub fn podium_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Get the ledger file path
pub fn ledger_path() -> Result<PathBuf> {
    Ok(config()?.ledger.clone())
}

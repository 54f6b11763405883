//! Configuration loader
//!
//! Every field has a sensible default, so the loader layers sources instead
//! of requiring any of them:
//! 1. Start from `Config::default()` or, when found, a config file.
//! 2. Apply `KINTAI_*` environment overrides on top.
//!
//! ## Environment Variables
//! - `KINTAI_CONFIG`: Explicit config file path (skips probing)
//! - `KINTAI_DB_PATH` / `KINTAI_DB_POOL_SIZE`: SQLite location and pool size
//! - `KINTAI_VAULT_KEY`: Hex-encoded 32-byte credential vault key
//! - `KINTAI_GITHUB_API_URL`: GitHub API base URL
//! - `KINTAI_OPENAI_API_KEY` / `KINTAI_AI_MODEL`: AI summarization settings
//! - `KINTAI_AI_MONTHLY_LIMIT`: Monthly AI request quota
//! - `KINTAI_UTC_OFFSET_HOURS`: Local offset for the 30-hour workday clock
//! - `KINTAI_FALLBACK_START` / `KINTAI_FALLBACK_END`: Fallback window minutes
//!
//! ## File Locations
//! Probed in order: `./config.toml|json`, `./kintai.toml|json`, the same
//! names one and two directories up, then next to the executable.

use std::path::{Path, PathBuf};

use kintai_domain::{Config, KintaiError, Result};
use tracing::{debug, info};

/// Load configuration with the layered fallback strategy.
pub fn load() -> Result<Config> {
    let mut config = match explicit_config_path() {
        Some(path) => load_from_file(Some(path))?,
        None => match probe_config_paths() {
            Some(path) => load_from_file(Some(path))?,
            None => {
                debug!("no config file found, starting from defaults");
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a file.
///
/// If `path` is `None`, probes the standard locations. Format is detected by
/// extension (`.toml` or `.json`).
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(KintaiError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            KintaiError::Config("no config file found in any of the standard locations".to_string())
        })?,
    };

    info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| KintaiError::Config(format!("failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn explicit_config_path() -> Option<PathBuf> {
    std::env::var("KINTAI_CONFIG").ok().map(PathBuf::from)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| KintaiError::Config(format!("invalid TOML config: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| KintaiError::Config(format!("invalid JSON config: {e}"))),
        _ => Err(KintaiError::Config(format!("unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file.
pub fn probe_config_paths() -> Option<PathBuf> {
    let names = ["config.toml", "config.json", "kintai.toml", "kintai.json"];
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        for prefix in ["", "../", "../../"] {
            for name in names {
                candidates.push(cwd.join(format!("{prefix}{name}")));
            }
        }
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            for name in names {
                candidates.push(exe_dir.join(name));
            }
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Ok(path) = std::env::var("KINTAI_DB_PATH") {
        config.database.path = path;
    }
    if let Some(size) = env_parse::<u32>("KINTAI_DB_POOL_SIZE")? {
        config.database.pool_size = size;
    }
    if let Ok(key) = std::env::var("KINTAI_VAULT_KEY") {
        config.database.vault_key = Some(key);
    }
    if let Ok(url) = std::env::var("KINTAI_GITHUB_API_URL") {
        config.github.api_url = url;
    }
    if let Ok(key) = std::env::var("KINTAI_OPENAI_API_KEY") {
        config.ai.api_key = Some(key);
    }
    if let Ok(model) = std::env::var("KINTAI_AI_MODEL") {
        config.ai.model = model;
    }
    if let Some(limit) = env_parse::<u32>("KINTAI_AI_MONTHLY_LIMIT")? {
        config.ai.monthly_request_limit = limit;
    }
    if let Some(offset) = env_parse::<i32>("KINTAI_UTC_OFFSET_HOURS")? {
        config.workday.utc_offset_hours = offset;
    }
    if let Some(start) = env_parse::<u32>("KINTAI_FALLBACK_START")? {
        config.workday.fallback_start_minutes = start;
    }
    if let Some(end) = env_parse::<u32>("KINTAI_FALLBACK_END")? {
        config.workday.fallback_end_minutes = end;
    }
    Ok(())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| KintaiError::Config(format!("invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

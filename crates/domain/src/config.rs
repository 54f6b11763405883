//! Configuration structures

use chrono::{FixedOffset, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FALLBACK_END_MINUTES, DEFAULT_FALLBACK_START_MINUTES, DEFAULT_MONTHLY_REQUEST_LIMIT,
    DEFAULT_UTC_OFFSET_HOURS,
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub workday: WorkdayConfig,
}

/// SQLite database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
    /// Hex-encoded 32-byte key for the credential vault.
    pub vault_key: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "kintai.db".to_string(), pool_size: 4, vault_key: None }
    }
}

/// GitHub API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    pub api_url: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self { api_url: "https://api.github.com".to_string() }
    }
}

/// AI summarization settings. `api_key: None` disables the AI path entirely;
/// the deterministic fallback is always available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub monthly_request_limit: u32,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            monthly_request_limit: DEFAULT_MONTHLY_REQUEST_LIMIT,
            timeout_secs: 30,
        }
    }
}

/// Workday clock settings.
///
/// The fallback window is a product heuristic, so it is configuration rather
/// than a hard-coded rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkdayConfig {
    /// Local offset from UTC in whole hours (JST is +9).
    pub utc_offset_hours: i32,
    /// Window start used when a day has only metadata-only records.
    pub fallback_start_minutes: u32,
    /// Window end used when a day has only metadata-only records.
    pub fallback_end_minutes: u32,
}

impl Default for WorkdayConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            fallback_start_minutes: DEFAULT_FALLBACK_START_MINUTES,
            fallback_end_minutes: DEFAULT_FALLBACK_END_MINUTES,
        }
    }
}

impl WorkdayConfig {
    /// Fixed offset for local-time conversion. Out-of-range values fall back
    /// to UTC rather than panicking.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours.clamp(-23, 23) * 3600)
            .unwrap_or_else(|| Utc.offset_from_utc_datetime(&Utc::now().naive_utc()).fix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_workday_offset_is_jst() {
        let config = WorkdayConfig::default();
        assert_eq!(config.offset().local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn out_of_range_offset_falls_back() {
        let config = WorkdayConfig { utc_offset_hours: 99, ..WorkdayConfig::default() };
        assert_eq!(config.offset().local_minus_utc(), 23 * 3600);
    }

    #[test]
    fn default_fallback_window_is_nine_to_eighteen() {
        let config = WorkdayConfig::default();
        assert_eq!(config.fallback_start_minutes, 9 * 60);
        assert_eq!(config.fallback_end_minutes, 18 * 60);
    }
}

//! Configuration management for the FarmHub engine
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FARMHUB_ prefix

use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Major market locations scanned when a fleet alert scan has no filter
pub const DEFAULT_MAJOR_LOCATIONS: [&str; 6] =
    ["110001", "400001", "700001", "600001", "500001", "560001"];

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Log output configuration
    pub log: LogConfig,

    /// Which persistence collaborators to use
    pub storage: StorageConfig,

    /// Database configuration (postgres storage only)
    pub database: DatabaseConfig,

    /// Weather/market source configuration
    pub sources: SourcesConfig,

    /// Alert aggregation configuration
    pub alerts: AlertsConfig,

    /// Notification channel configuration
    pub sms: SmsConfig,

    /// Daily tip job schedule
    pub tip_job: TipJobConfig,

    /// Admin statistics configuration
    pub statistics: StatisticsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// JSON file of subjects loaded into the in-memory store at startup
    pub seed_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    /// Upper bound on any single weather or market lookup
    pub timeout_ms: u64,

    /// Seed for the generated weather; random when absent
    pub weather_seed: Option<u64>,

    /// JSON market dataset replacing the built-in tables
    pub market_dataset_path: Option<String>,
}

impl SourcesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlertsConfig {
    /// Locations scanned by an unfiltered fleet scan, in scan order
    pub major_locations: Vec<String>,

    /// Dispatch a given warning set at most once per subject per day
    pub dedupe_dispatch: bool,

    /// Offset used to decide which day a dashboard view falls on
    pub utc_offset_minutes: i32,
}

impl AlertsConfig {
    pub fn local_offset(&self) -> FixedOffset {
        offset_from_minutes(self.utc_offset_minutes)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SmsMode {
    /// Record every message as logged without contacting a provider
    Log,
    /// Post messages to an HTTP SMS gateway
    Gateway,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmsConfig {
    pub mode: SmsMode,

    /// Gateway endpoint receiving `{to, message, sender}`
    pub gateway_url: Option<String>,

    /// Bearer token for the gateway
    pub api_token: Option<String>,

    /// Sender id shown to recipients
    pub sender_id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TipJobConfig {
    pub enabled: bool,
    pub hour: u32,
    pub minute: u32,
    pub utc_offset_minutes: i32,
}

impl TipJobConfig {
    pub fn local_offset(&self) -> FixedOffset {
        offset_from_minutes(self.utc_offset_minutes)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatisticsConfig {
    /// Number of recent notifications included in statistics
    pub recent_limit: i64,
}

fn offset_from_minutes(minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(minutes * 60).unwrap_or_else(|| Utc.fix())
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("FARMHUB_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5001)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("log.format", "pretty")?
            .set_default("storage.backend", "memory")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("sources.timeout_ms", 5000)?
            .set_default(
                "alerts.major_locations",
                DEFAULT_MAJOR_LOCATIONS.to_vec(),
            )?
            .set_default("alerts.dedupe_dispatch", true)?
            .set_default("alerts.utc_offset_minutes", 330)?
            .set_default("sms.mode", "log")?
            .set_default("sms.sender_id", "FARMHB")?
            .set_default("tip_job.enabled", true)?
            .set_default("tip_job.hour", 8)?
            .set_default("tip_job.minute", 0)?
            .set_default("tip_job.utc_offset_minutes", 330)?
            .set_default("statistics.recent_limit", 10)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FARMHUB_ prefix)
            .add_source(
                Environment::with_prefix("FARMHUB")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("alerts.major_locations")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5001,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            major_locations: DEFAULT_MAJOR_LOCATIONS.iter().map(|s| s.to_string()).collect(),
            dedupe_dispatch: true,
            utc_offset_minutes: 330,
        }
    }
}

impl Default for TipJobConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hour: 8,
            minute: 0,
            utc_offset_minutes: 330,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            seed_path: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            min_connections: 2,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            weather_seed: None,
            market_dataset_path: None,
        }
    }
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            mode: SmsMode::Log,
            gateway_url: None,
            api_token: None,
            sender_id: "FARMHB".to_string(),
        }
    }
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self { recent_limit: 10 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();

        assert_eq!(config.alerts.major_locations.len(), 6);
        assert_eq!(config.alerts.major_locations[0], "110001");
        assert_eq!(config.tip_job.hour, 8);
        assert_eq!(config.statistics.recent_limit, 10);
        assert_eq!(config.sources.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_offset_from_minutes() {
        let ist = TipJobConfig::default().local_offset();
        assert_eq!(ist.local_minus_utc(), 330 * 60);

        // Out-of-range offsets fall back to UTC
        assert_eq!(offset_from_minutes(100_000).local_minus_utc(), 0);
    }
}

use crate::model::ConfigError;
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub watchlist: Vec<String>,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
    #[serde(default = "default_scan_interval")]
    pub scan_interval_seconds: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeframe() -> String {
    "5m".to_string()
}

fn default_scan_interval() -> u64 {
    15
}

fn default_request_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) MomentumScanner/0.1".to_string()
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates config JSON. Blank watchlist entries are dropped.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let mut config: AppConfig = serde_json::from_str(content)?;
    config.watchlist = config
        .watchlist
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if config.watchlist.is_empty() {
        return Err(ConfigError::Invalid("watchlist is empty".into()));
    }
    if config.scan_interval_seconds == 0 {
        return Err(ConfigError::Invalid("scan_interval_seconds must be positive".into()));
    }
    Ok(config)
}

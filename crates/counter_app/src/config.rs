//! Process configuration, read from a RON file.
//!
//! Every field has a default, so a config file only needs the credentials:
//!
//! ```ron
//! (
//!     app: (port: 3010, update_interval_secs: 30),
//!     api: (username: "me", password: "pw", client_id: "id", client_secret: "secret"),
//! )
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use counter_core::PassPolicy;
use counter_engine::ApiSettings;
use counter_logging::LogDestination;
use log::LevelFilter;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub api: ApiSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub host: String,
    pub port: u16,
    pub update_interval_secs: u64,
    pub static_dir: PathBuf,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
    pub log_level: String,
    pub pass_policy: PassPolicy,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3010,
            update_interval_secs: 30,
            static_dir: PathBuf::from("./static"),
            log_destination: LogDestination::Terminal,
            log_file: PathBuf::from("./counter.log"),
            log_level: "info".to_string(),
            pass_policy: PassPolicy::Incremental,
        }
    }
}

impl AppSection {
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::Invalid(format!("unknown log level {:?}", self.log_level)))
    }
}

pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}

pub fn parse_config(text: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = ron::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.app.update_interval_secs == 0 {
        return Err(ConfigError::Invalid(
            "update_interval_secs must be at least 1".to_string(),
        ));
    }
    config.app.level_filter()?;
    Ok(())
}

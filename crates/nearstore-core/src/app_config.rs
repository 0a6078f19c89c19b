use std::path::PathBuf;

use crate::geo::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub api_base_url: String,
    pub geocoder_url: String,
    pub preferences_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Where the app centers itself when no location can be obtained.
    pub default_location: Coordinate,
    pub high_accuracy_timeout_ms: u64,
    pub low_accuracy_timeout_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

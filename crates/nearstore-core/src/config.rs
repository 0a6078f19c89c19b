use crate::app_config::{AppConfig, Environment};
use crate::geo::Coordinate;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but has an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but has an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can feed a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let env = parse_environment(&or_default("NEARSTORE_ENV", "development"));
    let log_level = or_default("NEARSTORE_LOG_LEVEL", "info");

    let api_base_url = or_default("NEARSTORE_API_BASE_URL", "http://localhost:5000");
    let geocoder_url = or_default(
        "NEARSTORE_GEOCODER_URL",
        "https://nominatim.openstreetmap.org",
    );
    let preferences_path = PathBuf::from(or_default(
        "NEARSTORE_PREFERENCES_PATH",
        "./.nearstore/preferences.json",
    ));

    let request_timeout_secs: u64 = parse_as(
        "NEARSTORE_REQUEST_TIMEOUT_SECS",
        &or_default("NEARSTORE_REQUEST_TIMEOUT_SECS", "30"),
    )?;
    let user_agent = or_default("NEARSTORE_USER_AGENT", "nearstore/0.1 (store-locator)");

    let default_latitude: f64 = parse_as(
        "NEARSTORE_DEFAULT_LATITUDE",
        &or_default("NEARSTORE_DEFAULT_LATITUDE", "40.7128"),
    )?;
    let default_longitude: f64 = parse_as(
        "NEARSTORE_DEFAULT_LONGITUDE",
        &or_default("NEARSTORE_DEFAULT_LONGITUDE", "-74.0060"),
    )?;
    let default_location = Coordinate::new(default_latitude, default_longitude).map_err(|e| {
        ConfigError::InvalidEnvVar {
            var: "NEARSTORE_DEFAULT_LATITUDE/NEARSTORE_DEFAULT_LONGITUDE".to_string(),
            reason: e.to_string(),
        }
    })?;

    let high_accuracy_timeout_ms: u64 = parse_as(
        "NEARSTORE_HIGH_ACCURACY_TIMEOUT_MS",
        &or_default("NEARSTORE_HIGH_ACCURACY_TIMEOUT_MS", "10000"),
    )?;
    let low_accuracy_timeout_ms: u64 = parse_as(
        "NEARSTORE_LOW_ACCURACY_TIMEOUT_MS",
        &or_default("NEARSTORE_LOW_ACCURACY_TIMEOUT_MS", "15000"),
    )?;
    let max_retries: u32 = parse_as(
        "NEARSTORE_MAX_RETRIES",
        &or_default("NEARSTORE_MAX_RETRIES", "3"),
    )?;
    let retry_backoff_base_ms: u64 = parse_as(
        "NEARSTORE_RETRY_BACKOFF_BASE_MS",
        &or_default("NEARSTORE_RETRY_BACKOFF_BASE_MS", "500"),
    )?;

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        geocoder_url,
        preferences_path,
        request_timeout_secs,
        user_agent,
        default_location,
        high_accuracy_timeout_ms,
        low_accuracy_timeout_ms,
        max_retries,
        retry_backoff_base_ms,
    })
}

fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

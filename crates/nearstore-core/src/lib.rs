pub mod app_config;
pub mod config;
pub mod geo;
pub mod location;
pub mod preferences;
pub mod stores;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_miles, Coordinate, EARTH_RADIUS_MILES};
pub use location::{LocationSource, UserLocation};
pub use preferences::{AppPreferences, SavedLocation, Theme};
pub use stores::{
    load_stores_file, DeliveryQuote, ResolvedStore, SkipReason, SkippedStore, Store, StoresFile,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read stores file {path}: {source}")]
    StoresFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stores file: {0}")]
    StoresFileParse(#[from] serde_yaml::Error),

    #[error("invalid stores file: {0}")]
    StoresFileValidation(String),

    #[error("failed to access preferences file {path}: {source}")]
    PreferencesIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse preferences file {path}: {source}")]
    PreferencesParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

//! Persisted user preferences (saved location, theme).
//!
//! Backed by a single JSON file. The file is read once on start-up and
//! rewritten whenever a preference changes; concurrent writers are not
//! coordinated, so the last write wins.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::location::UserLocation;
use crate::ConfigError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// The persisted shape of the user's saved location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
}

impl SavedLocation {
    /// Convert to an active [`UserLocation`]. Returns `None` if the stored
    /// coordinate is out of range (hand-edited or corrupted file).
    #[must_use]
    pub fn to_user_location(&self) -> Option<UserLocation> {
        let coordinate = Coordinate::new(self.latitude, self.longitude).ok()?;
        Some(UserLocation::saved(coordinate, self.address.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreferencesFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_location: Option<SavedLocation>,
    #[serde(default)]
    theme: Theme,
}

/// Process-wide preference store. Construct once and pass it where needed.
#[derive(Debug)]
pub struct AppPreferences {
    path: PathBuf,
    data: PreferencesFile,
}

impl AppPreferences {
    /// Read preferences from `path`. A missing file yields empty preferences.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PreferencesIo`] if the file exists but cannot be
    /// read, or [`ConfigError::PreferencesParse`] if it is not valid JSON.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| ConfigError::PreferencesParse {
                    path: path.display().to_string(),
                    source: e,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PreferencesFile::default(),
            Err(e) => {
                return Err(ConfigError::PreferencesIo {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };
        Ok(Self { path, data })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn saved_location(&self) -> Option<&SavedLocation> {
        self.data.user_location.as_ref()
    }

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.data.theme
    }

    /// Persist `location` as the saved location, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PreferencesIo`] if the file cannot be written.
    pub fn save_location(&mut self, location: &UserLocation) -> Result<(), ConfigError> {
        let coordinate = location.coordinate();
        self.data.user_location = Some(SavedLocation {
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            address: location.address().map(str::to_owned),
        });
        self.persist()
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::PreferencesIo`] if the file cannot be written.
    pub fn clear_location(&mut self) -> Result<(), ConfigError> {
        if self.data.user_location.take().is_none() {
            return Ok(());
        }
        self.persist()
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::PreferencesIo`] if the file cannot be written.
    pub fn set_theme(&mut self, theme: Theme) -> Result<(), ConfigError> {
        self.data.theme = theme;
        self.persist()
    }

    fn persist(&self) -> Result<(), ConfigError> {
        let io_err = |e: std::io::Error| ConfigError::PreferencesIo {
            path: self.path.display().to_string(),
            source: e,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let body = serde_json::to_string_pretty(&self.data).map_err(|e| {
            ConfigError::PreferencesParse {
                path: self.path.display().to_string(),
                source: e,
            }
        })?;
        std::fs::write(&self.path, body).map_err(io_err)?;
        tracing::debug!(path = %self.path.display(), "preferences saved");
        Ok(())
    }
}

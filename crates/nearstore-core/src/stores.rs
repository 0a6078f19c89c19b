use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::geo::{distance_miles, Coordinate};
use crate::ConfigError;

/// A store record as served by the backend.
///
/// Decoding is lenient per field so one bad record cannot sink a whole list:
/// numeric ids are stringified, coordinates and radius accept numbers or
/// numeric strings, and an unreadable coordinate decodes as absent. Such
/// records are legal here and get filtered during resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    #[serde(deserialize_with = "loose_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, deserialize_with = "loose_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "loose_coordinate")]
    pub longitude: Option<f64>,
    /// Delivery radius in miles. Zero means pickup only, as does an
    /// unreadable value.
    #[serde(default, deserialize_with = "loose_radius")]
    pub delivery_radius_miles: f64,
    #[serde(default)]
    pub minimum_order: Decimal,
    #[serde(default)]
    pub delivery_fee: Decimal,
}

impl Store {
    /// The store's coordinate, if both parts are present and in range.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng).ok(),
            _ => None,
        }
    }

    fn skip_reason(&self) -> SkipReason {
        match (self.latitude, self.longitude) {
            (Some(_), Some(_)) => SkipReason::InvalidCoordinates,
            _ => SkipReason::MissingCoordinates,
        }
    }
}

/// A value that should be numeric but may arrive as text or something else.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl LooseNumber {
    fn value(self) -> Option<f64> {
        match self {
            LooseNumber::Number(n) => Some(n),
            LooseNumber::Text(s) => s.trim().parse().ok(),
            LooseNumber::Other(_) => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

fn loose_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match LooseId::deserialize(deserializer)? {
        LooseId::Text(id) => id,
        LooseId::Signed(id) => id.to_string(),
        LooseId::Unsigned(id) => id.to_string(),
    })
}

fn loose_coordinate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<LooseNumber>::deserialize(deserializer)?.and_then(LooseNumber::value))
}

fn loose_radius<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(loose_coordinate(deserializer)?.unwrap_or(0.0))
}

/// Why a store was left out of a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    MissingCoordinates,
    InvalidCoordinates,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingCoordinates => write!(f, "missing coordinates"),
            SkipReason::InvalidCoordinates => write!(f, "invalid coordinates"),
        }
    }
}

/// A malformed store record that was excluded from a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedStore {
    pub id: String,
    pub reason: SkipReason,
}

/// A store annotated with its distance from the user and whether it delivers
/// there. Derived values are read-only; build a new one when the user moves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStore {
    store: Store,
    coordinate: Coordinate,
    distance_miles: f64,
    is_deliverable: bool,
}

impl ResolvedStore {
    /// Annotate `store` relative to `origin`.
    ///
    /// # Errors
    ///
    /// Returns the [`SkippedStore`] record when the store has missing or
    /// invalid coordinates.
    pub fn new(store: Store, origin: &Coordinate) -> Result<Self, SkippedStore> {
        let Some(coordinate) = store.coordinate() else {
            return Err(SkippedStore {
                reason: store.skip_reason(),
                id: store.id,
            });
        };
        let distance = distance_miles(origin, &coordinate);
        Ok(Self {
            is_deliverable: distance <= store.delivery_radius_miles,
            distance_miles: distance,
            coordinate,
            store,
        })
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.store.id
    }

    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    #[must_use]
    pub fn distance_miles(&self) -> f64 {
        self.distance_miles
    }

    #[must_use]
    pub fn is_deliverable(&self) -> bool {
        self.is_deliverable
    }

    /// Price a delivery of a cart worth `subtotal` from this store.
    #[must_use]
    pub fn delivery_quote(&self, subtotal: Decimal) -> DeliveryQuote {
        if !self.is_deliverable {
            return DeliveryQuote::OutOfRange {
                distance_miles: self.distance_miles,
                radius_miles: self.store.delivery_radius_miles,
            };
        }
        if subtotal < self.store.minimum_order {
            return DeliveryQuote::BelowMinimum {
                minimum: self.store.minimum_order,
                shortfall: self.store.minimum_order - subtotal,
            };
        }
        DeliveryQuote::Deliverable {
            fee: self.store.delivery_fee,
            total: subtotal + self.store.delivery_fee,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum DeliveryQuote {
    OutOfRange {
        distance_miles: f64,
        radius_miles: f64,
    },
    BelowMinimum {
        minimum: Decimal,
        shortfall: Decimal,
    },
    Deliverable {
        fee: Decimal,
        total: Decimal,
    },
}

#[derive(Debug, Deserialize)]
pub struct StoresFile {
    pub stores: Vec<Store>,
}

/// Load and validate a YAML store list, for running without the backend.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_stores_file(path: &Path) -> Result<StoresFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoresFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let stores_file: StoresFile = serde_yaml::from_str(&content)?;

    validate_stores(&stores_file)?;

    tracing::debug!(
        path = %path.display(),
        count = stores_file.stores.len(),
        "loaded stores file"
    );
    Ok(stores_file)
}

fn validate_stores(stores_file: &StoresFile) -> Result<(), ConfigError> {
    let mut seen_ids = HashSet::new();

    for store in &stores_file.stores {
        if store.id.trim().is_empty() {
            return Err(ConfigError::StoresFileValidation(format!(
                "store '{}' has an empty id",
                store.name
            )));
        }

        if store.name.trim().is_empty() {
            return Err(ConfigError::StoresFileValidation(format!(
                "store '{}' has an empty name",
                store.id
            )));
        }

        if !seen_ids.insert(store.id.as_str()) {
            return Err(ConfigError::StoresFileValidation(format!(
                "duplicate store id: '{}'",
                store.id
            )));
        }

        if store.delivery_radius_miles.is_nan() || store.delivery_radius_miles < 0.0 {
            return Err(ConfigError::StoresFileValidation(format!(
                "store '{}' has invalid delivery radius {}",
                store.id, store.delivery_radius_miles
            )));
        }

        if store.minimum_order.is_sign_negative() || store.delivery_fee.is_sign_negative() {
            return Err(ConfigError::StoresFileValidation(format!(
                "store '{}' has a negative minimum order or delivery fee",
                store.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "stores_test.rs"]
mod tests;

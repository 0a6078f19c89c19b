//! Free-text address search against a Nominatim-compatible geocoder.

use std::time::Duration;

use nearstore_core::{Coordinate, UserLocation};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::error::GeocodeError;

/// A single place returned by the geocoder. Nominatim encodes coordinates as
/// strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeMatch {
    pub coordinate: Coordinate,
    pub display_name: String,
}

impl GeocodeMatch {
    #[must_use]
    pub fn into_user_location(self) -> UserLocation {
        UserLocation::manual_search(self.coordinate, self.display_name)
    }
}

pub struct GeocodeClient {
    client: Client,
    base_url: Url,
}

impl GeocodeClient {
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the `reqwest::Client` cannot be built,
    /// or [`GeocodeError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `join("search")` appends rather than
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeocodeError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Resolve `query` to the geocoder's best match.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::NotFound`] if the query is blank, nothing matched,
    ///   or the match had unusable coordinates.
    /// - [`GeocodeError::Http`] / [`GeocodeError::UnexpectedStatus`] on
    ///   transport failure or a non-2xx status.
    /// - [`GeocodeError::Deserialize`] if the body is not the expected JSON.
    pub async fn search(&self, query: &str) -> Result<GeocodeMatch, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::NotFound {
                query: String::new(),
            });
        }

        let url = self.search_url(query)?;
        tracing::debug!(query, "geocoding address");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GeocodeError::NotFound {
                query: query.to_owned(),
            });
        }
        if !status.is_success() {
            return Err(GeocodeError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let places: Vec<Place> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("geocode search for \"{query}\""),
                source: e,
            })?;

        let not_found = || GeocodeError::NotFound {
            query: query.to_owned(),
        };
        let place = places.into_iter().next().ok_or_else(not_found)?;
        let latitude = place.lat.trim().parse::<f64>().map_err(|_| not_found())?;
        let longitude = place.lon.trim().parse::<f64>().map_err(|_| not_found())?;
        let coordinate = Coordinate::new(latitude, longitude).map_err(|_| not_found())?;

        let display_name = if place.display_name.trim().is_empty() {
            query.to_owned()
        } else {
            place.display_name
        };
        Ok(GeocodeMatch {
            coordinate,
            display_name,
        })
    }

    fn search_url(&self, query: &str) -> Result<Url, GeocodeError> {
        let mut url = self
            .base_url
            .join("search")
            .map_err(|e| GeocodeError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("limit", "1");
        Ok(url)
    }
}

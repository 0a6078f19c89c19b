//! Address search and saved-location command handlers.

use anyhow::Context;
use clap::Subcommand;
use nearstore_core::{AppConfig, AppPreferences, Coordinate, UserLocation};
use nearstore_locator::{GeocodeClient, GeocodeError, GeocodeFailure};

/// Sub-commands available under `location`.
#[derive(Debug, Subcommand)]
pub(crate) enum LocationCommands {
    /// Print the saved location, or the default if none is saved
    Show,
    /// Forget the saved location
    Clear,
    /// Save explicit coordinates as your location
    Set {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Optional label shown alongside the coordinates
        #[arg(long)]
        address: Option<String>,
    },
}

pub(crate) fn build_geocoder(config: &AppConfig) -> anyhow::Result<GeocodeClient> {
    GeocodeClient::new(
        &config.geocoder_url,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build geocoding client: {e}"))
}

/// Turn a geocoding failure into the message the user sees.
pub(crate) fn describe_geocode_error(query: &str, err: &GeocodeError) -> String {
    match err.kind() {
        GeocodeFailure::NotFound => format!("no location found for \"{query}\""),
        GeocodeFailure::NetworkError => {
            format!("could not reach the geocoding service ({err}); check your connection")
        }
    }
}

/// Look up `query` and print the match, optionally saving it.
///
/// # Errors
///
/// Returns an error if the address cannot be geocoded or the preferences file
/// cannot be written.
pub(crate) async fn run_geocode(
    config: &AppConfig,
    preferences: &mut AppPreferences,
    query: &str,
    save: bool,
) -> anyhow::Result<()> {
    let geocoder = build_geocoder(config)?;
    let found = geocoder
        .search(query)
        .await
        .map_err(|e| anyhow::anyhow!(describe_geocode_error(query, &e)))?;

    println!("{}  {}", found.coordinate, found.display_name);

    if save {
        let location = found.into_user_location();
        preferences
            .save_location(&location)
            .context("failed to save location")?;
        println!("saved to {}", preferences.path().display());
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if coordinates are out of range or the preferences file
/// cannot be written.
pub(crate) fn run_location(
    config: &AppConfig,
    preferences: &mut AppPreferences,
    command: &LocationCommands,
) -> anyhow::Result<()> {
    match command {
        LocationCommands::Show => match saved_location(preferences) {
            Some(location) => println!("{}  {}", location.coordinate(), location.describe()),
            None => println!(
                "no saved location; using default {}",
                config.default_location
            ),
        },
        LocationCommands::Clear => {
            preferences
                .clear_location()
                .context("failed to clear saved location")?;
            println!("saved location cleared");
        }
        LocationCommands::Set { lat, lng, address } => {
            let coordinate = Coordinate::new(*lat, *lng)?;
            let location = UserLocation::saved(coordinate, address.clone());
            preferences
                .save_location(&location)
                .context("failed to save location")?;
            println!("saved {}", location.describe());
        }
    }
    Ok(())
}

/// The saved location, if one exists and is still a valid coordinate.
pub(crate) fn saved_location(preferences: &AppPreferences) -> Option<UserLocation> {
    let saved = preferences.saved_location()?;
    let location = saved.to_user_location();
    if location.is_none() {
        tracing::warn!(
            latitude = saved.latitude,
            longitude = saved.longitude,
            path = %preferences.path().display(),
            "ignoring saved location with out-of-range coordinates"
        );
    }
    location
}

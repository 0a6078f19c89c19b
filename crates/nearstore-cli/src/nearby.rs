//! `nearstore nearby`: pick a location, load stores, and print them
//! nearest-first.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use nearstore_core::{
    AppConfig, AppPreferences, Coordinate, DeliveryQuote, ResolvedStore, Store, UserLocation,
};
use nearstore_locator::{resolve, Freshness, GeolocationAcquirer, Resolution, StoreApiClient};
use rust_decimal::Decimal;

use crate::device::HostPositionSource;
use crate::location::{build_geocoder, describe_geocode_error, saved_location};

#[derive(Debug, Args)]
pub(crate) struct NearbyArgs {
    /// Latitude to search from (requires --lng)
    #[arg(
        long,
        requires = "lng",
        conflicts_with = "address",
        allow_negative_numbers = true
    )]
    pub lat: Option<f64>,
    /// Longitude to search from (requires --lat)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,
    /// Address to search from, resolved through the geocoder
    #[arg(long)]
    pub address: Option<String>,
    /// Read stores from a YAML file instead of the store API
    #[arg(long)]
    pub stores_file: Option<PathBuf>,
    /// Only list stores that deliver to the location
    #[arg(long)]
    pub deliverable_only: bool,
    /// Only list stores within this many miles
    #[arg(long)]
    pub within: Option<f64>,
    /// Maximum number of stores to print
    #[arg(long, default_value = "10")]
    pub limit: usize,
    /// Order subtotal to quote delivery for, e.g. 24.50
    #[arg(long)]
    pub subtotal: Option<Decimal>,
}

/// How the search origin will be obtained, in precedence order.
#[derive(Debug, PartialEq)]
pub(crate) enum LocationChoice {
    Explicit(Coordinate),
    Search(String),
    Saved(UserLocation),
    Device,
}

/// Explicit coordinates win over an address search, which wins over the
/// saved location. With none of those the device chain runs.
///
/// # Errors
///
/// Returns an error if explicit coordinates are out of range.
pub(crate) fn choose_location(
    args: &NearbyArgs,
    preferences: &AppPreferences,
) -> anyhow::Result<LocationChoice> {
    if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        return Ok(LocationChoice::Explicit(Coordinate::new(lat, lng)?));
    }
    if let Some(address) = args.address.as_deref().map(str::trim) {
        if !address.is_empty() {
            return Ok(LocationChoice::Search(address.to_owned()));
        }
    }
    Ok(saved_location(preferences).map_or(LocationChoice::Device, LocationChoice::Saved))
}

async fn establish_location(
    config: &AppConfig,
    choice: LocationChoice,
) -> anyhow::Result<UserLocation> {
    match choice {
        LocationChoice::Explicit(coordinate) => Ok(UserLocation::manual_search(
            coordinate,
            coordinate.to_string(),
        )),
        LocationChoice::Search(query) => {
            let geocoder = build_geocoder(config)?;
            let found = geocoder
                .search(&query)
                .await
                .map_err(|e| anyhow::anyhow!(describe_geocode_error(&query, &e)))?;
            Ok(found.into_user_location())
        }
        LocationChoice::Saved(location) => Ok(location),
        LocationChoice::Device => {
            let acquirer = GeolocationAcquirer::new(HostPositionSource).with_timeouts(
                Duration::from_millis(config.high_accuracy_timeout_ms),
                Duration::from_millis(config.low_accuracy_timeout_ms),
            );
            let located = acquirer
                .locate(Freshness::AllowCached, config.default_location)
                .await;
            if let Some(failure) = located.failure {
                eprintln!("note: {}", failure.user_message());
            }
            Ok(located.location)
        }
    }
}

async fn load_stores(config: &AppConfig, stores_file: Option<&Path>) -> anyhow::Result<Vec<Store>> {
    if let Some(path) = stores_file {
        let file = nearstore_core::load_stores_file(path)
            .with_context(|| format!("failed to load stores from {}", path.display()))?;
        return Ok(file.stores);
    }

    let client = StoreApiClient::new(
        &config.api_base_url,
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_ms,
    )
    .map_err(|e| anyhow::anyhow!("failed to build store API client: {e}"))?;
    client
        .list_stores()
        .await
        .with_context(|| format!("failed to fetch stores from {}", config.api_base_url))
}

/// Apply the display filters to an already-sorted resolution.
pub(crate) fn select_rows<'a>(
    resolution: &'a Resolution,
    args: &NearbyArgs,
) -> Vec<&'a ResolvedStore> {
    let within = args.within.unwrap_or(f64::INFINITY);
    resolution
        .within(within)
        .filter(|s| !args.deliverable_only || s.is_deliverable())
        .take(args.limit)
        .collect()
}

/// One-line summary of a delivery quote.
pub(crate) fn format_quote(quote: &DeliveryQuote) -> String {
    match quote {
        DeliveryQuote::OutOfRange {
            distance_miles,
            radius_miles,
        } => format!("out of range ({distance_miles:.1} mi > {radius_miles:.1} mi)"),
        DeliveryQuote::BelowMinimum { minimum, shortfall } => {
            format!("below ${minimum} minimum (add ${shortfall})")
        }
        DeliveryQuote::Deliverable { fee, total } => format!("fee ${fee}, total ${total}"),
    }
}

/// # Errors
///
/// Returns an error if the location cannot be established or the store list
/// cannot be loaded.
pub(crate) async fn run_nearby(
    config: &AppConfig,
    preferences: &AppPreferences,
    args: &NearbyArgs,
) -> anyhow::Result<()> {
    let choice = choose_location(args, preferences)?;
    let location = establish_location(config, choice).await?;
    let stores = load_stores(config, args.stores_file.as_deref()).await?;
    let resolution = resolve(&location, &stores);

    println!("from {}  {}", location.coordinate(), location.describe());
    if resolution.skipped_count() > 0 {
        println!(
            "{} store(s) skipped: missing or invalid coordinates",
            resolution.skipped_count()
        );
    }

    let rows = select_rows(&resolution, args);
    if rows.is_empty() {
        println!("no stores match");
        return Ok(());
    }

    println!(
        "{:<4}{:<32}{:>10}  {:<10}{}",
        "#",
        "STORE",
        "DISTANCE",
        "DELIVERS",
        if args.subtotal.is_some() { "QUOTE" } else { "ADDRESS" }
    );
    for (rank, store) in rows.iter().enumerate() {
        let name = if store.store().name.chars().count() > 30 {
            format!("{}...", store.store().name.chars().take(27).collect::<String>())
        } else {
            store.store().name.clone()
        };
        let last = match args.subtotal {
            Some(subtotal) => format_quote(&store.delivery_quote(subtotal)),
            None => store.store().address.clone(),
        };
        println!(
            "{:<4}{:<32}{:>7.1} mi  {:<10}{}",
            rank + 1,
            name,
            store.distance_miles(),
            if store.is_deliverable() { "yes" } else { "no" },
            last
        );
    }

    Ok(())
}

mod device;
mod location;
mod nearby;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::location::LocationCommands;
use crate::nearby::NearbyArgs;

#[derive(Debug, Parser)]
#[command(name = "nearstore")]
#[command(about = "Find nearby stores and check delivery to your location")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List stores nearest to you, with distance and delivery eligibility
    Nearby(NearbyArgs),
    /// Look up an address and print its coordinates
    Geocode {
        /// Free-text address, e.g. "350 5th Ave, New York"
        #[arg(required = true, num_args = 1..)]
        address: Vec<String>,
        /// Remember the result as your saved location
        #[arg(long)]
        save: bool,
    },
    /// Manage the saved location
    Location {
        #[command(subcommand)]
        command: LocationCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = nearstore_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut preferences = nearstore_core::AppPreferences::load(config.preferences_path.clone())?;

    match cli.command {
        Some(Commands::Nearby(args)) => nearby::run_nearby(&config, &preferences, &args).await?,
        Some(Commands::Geocode { address, save }) => {
            location::run_geocode(&config, &mut preferences, &address.join(" "), save).await?;
        }
        Some(Commands::Location { command }) => {
            location::run_location(&config, &mut preferences, &command)?;
        }
        None => println!("nothing to do; try `nearstore nearby` or `nearstore --help`"),
    }

    Ok(())
}

mod config;
mod ics;
mod server;

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use daytrip_core::geo::{LocationResolver, RoutePlanner};
use daytrip_core::plan::{Planner, SearchParams};
use daytrip_core::source::{DirectionsApi, EventSearchApi, GenerativeLanguageApi, GeocodingApi};
use daytrip_core::store::ItineraryStore;

use config::{ConfigFile, DaytripConfig, ProvidersSection, ServerSection};
use server::AppState;

#[derive(Parser)]
#[command(name = "daytrip", about = "Event discovery and day-itinerary planner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the daytrip config file with provider API keys
    Init {
        /// API key for the events search provider
        #[arg(long)]
        events_api_key: String,
        /// API key for the plan-generation model
        #[arg(long)]
        generation_api_key: String,
        /// API key for the geocoding/directions provider
        #[arg(long)]
        maps_api_key: String,
        /// Generation model override
        #[arg(long)]
        generation_model: Option<String>,
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Run the HTTP API server
    Serve {
        /// Bind address (overrides the config file)
        #[arg(long)]
        bind: Option<String>,
        /// Port (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate one itinerary and print it as JSON
    Plan {
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        /// Trip date (YYYY-MM-DD); repeat for multi-day trips
        #[arg(long = "date", required = true)]
        dates: Vec<String>,
        /// Budget tier label, e.g. "$0", "$1-$50", "$51-$150"
        #[arg(long, default_value = "$1-$50")]
        budget: String,
        /// Free-text interests
        #[arg(long, default_value = "")]
        preferences: String,
        /// Event title to exclude; repeatable
        #[arg(long = "exclude")]
        excluded_events: Vec<String>,
    },
}

fn cmd_init(
    events_api_key: String,
    generation_api_key: String,
    maps_api_key: String,
    generation_model: Option<String>,
    force: bool,
) -> Result<()> {
    let path = config::config_path();
    if path.exists() && !force {
        bail!(
            "config file already exists at {}; pass --force to overwrite",
            path.display()
        );
    }
    config::save_config(&ConfigFile {
        providers: ProvidersSection {
            events_api_key,
            generation_api_key,
            maps_api_key,
            generation_model,
        },
        server: ServerSection::default(),
    })?;
    println!("Wrote config to {}", path.display());
    Ok(())
}

/// Build the shared request state from resolved configuration.
fn build_state(config: &DaytripConfig) -> Result<AppState> {
    let events = EventSearchApi::new(config.events_api_key.clone())?;
    let generator = GenerativeLanguageApi::new(
        config.generation_api_key.clone(),
        config.generation_model.clone(),
    )?;
    let geocoder = GeocodingApi::new(config.maps_api_key.clone())?;
    let directions = DirectionsApi::new(config.maps_api_key.clone())?;

    let planner = Planner::new(Arc::new(events), Arc::new(generator), ItineraryStore::new());
    Ok(AppState {
        planner: Arc::new(planner),
        resolver: Arc::new(LocationResolver::new(Arc::new(geocoder))),
        routes: Arc::new(RoutePlanner::new(Arc::new(directions))),
    })
}

async fn cmd_plan(params: SearchParams) -> Result<()> {
    let config = DaytripConfig::resolve(None, None)?;
    let state = build_state(&config)?;
    let itinerary = state
        .planner
        .generate(params)
        .await
        .context("itinerary generation failed")?;
    println!("{}", serde_json::to_string_pretty(&itinerary)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Init {
            events_api_key,
            generation_api_key,
            maps_api_key,
            generation_model,
            force,
        } => cmd_init(
            events_api_key,
            generation_api_key,
            maps_api_key,
            generation_model,
            force,
        )?,
        Commands::Serve { bind, port } => {
            let config = DaytripConfig::resolve(bind.as_deref(), port)?;
            let state = build_state(&config)?;
            server::run_serve(state, &config.bind, config.port).await?;
        }
        Commands::Plan {
            city,
            state,
            dates,
            budget,
            preferences,
            excluded_events,
        } => {
            cmd_plan(SearchParams {
                city,
                state,
                dates,
                budget,
                preferences,
                excluded_events,
            })
            .await?;
        }
    }
    Ok(())
}

//! CLI entry point for the Delhi ward AQI engine.
//!
//! Provides subcommands for running the periodic ward refresh, resolving a
//! point or a place name to its ward, converting concentrations, and
//! talking to the government-user authentication service.

mod infra;
mod services;

use crate::infra::auth::client::HttpAuthClient;
use crate::services::auth_api::AuthApi;
use anyhow::{Context, Result, bail};
use chrono::{TimeDelta, Utc};
use clap::{Parser, Subcommand};
use delhi_aqi::aqi::{AqiBand, Pollutant, composite_aqi, dominant_pollutant, parse_reading};
use delhi_aqi::board::{Location, WardBoard};
use delhi_aqi::cache::SystemClock;
use delhi_aqi::config::Config;
use delhi_aqi::feed::{CachedFeed, FallbackFeed, HttpStationFeed, MockDataSource};
use delhi_aqi::fetch::{BasicClient, StaticHeader, fetch_bytes};
use delhi_aqi::geocode::geocode;
use delhi_aqi::output::{append_records, print_json};
use delhi_aqi::spatial::{find_ward_by_name, load_wards};
use delhi_aqi::ward::Ward;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "delhi_aqi")]
#[command(about = "Ward-level AQI estimation for Delhi", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch station readings and recompute every ward's AQI
    Refresh {
        /// Ward GeoJSON file or URL (repeatable, tried in order)
        #[arg(short, long = "wards", value_name = "FILE_OR_URL")]
        wards: Vec<String>,

        /// Station endpoint URL (repeatable, tried in order)
        #[arg(short, long = "endpoint", value_name = "URL")]
        endpoints: Vec<String>,

        /// Seconds between refresh cycles (defaults to AQI_REFRESH_SECS)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Number of refresh cycles to run (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 1)]
        cycles: usize,

        /// CSV file to append ward readings to
        #[arg(short, long)]
        output: Option<String>,

        /// Also log ward rows and station markers as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Resolve a coordinate (map click or search hit) to its ward reading
    Locate {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Ward GeoJSON file or URL (repeatable, tried in order)
        #[arg(short, long = "wards", value_name = "FILE_OR_URL")]
        wards: Vec<String>,
    },
    /// Resolve a ward name or place name to its ward reading
    Search {
        /// Ward name (substring, any case) or a place in Delhi
        query: String,

        /// Ward GeoJSON file or URL (repeatable, tried in order)
        #[arg(short, long = "wards", value_name = "FILE_OR_URL")]
        wards: Vec<String>,
    },
    /// Convert a pollutant concentration to its AQI sub-index
    Convert {
        /// pm25, pm10, o3, no2, so2 or co
        pollutant: String,

        /// Concentration in the pollutant's native unit
        concentration: f64,
    },
    /// Composite AQI of several readings and the pollutant driving it
    Composite {
        /// Readings as POLLUTANT=CONCENTRATION, e.g. pm25=80 pm10=210
        #[arg(required = true, value_name = "POLLUTANT=CONCENTRATION")]
        readings: Vec<String>,
    },
    /// Log in as a government user (password read from AQI_PASSWORD)
    Login {
        #[arg(long)]
        email: String,
    },
    /// Start a signup for a government email address
    Signup {
        #[arg(long)]
        email: String,
    },
    /// Finish a signup with its token (password read from AQI_PASSWORD)
    SignupComplete {
        #[arg(long)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/delhi_aqi.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("delhi_aqi.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Refresh {
            wards,
            endpoints,
            interval,
            cycles,
            output,
            json,
        } => {
            if !wards.is_empty() {
                config.ward_sources = wards;
            }
            if !endpoints.is_empty() {
                config.endpoints = endpoints;
            }
            if let Some(secs) = interval {
                config.refresh_interval = Duration::from_secs(secs);
            }
            run_refresh(&config, cycles, output.as_deref(), json).await?;
        }
        Commands::Locate { lat, lon, wards } => {
            if !wards.is_empty() {
                config.ward_sources = wards;
            }
            locate(&config, lat, lon).await?;
        }
        Commands::Search { query, wards } => {
            if !wards.is_empty() {
                config.ward_sources = wards;
            }
            search(&config, &query).await?;
        }
        Commands::Convert {
            pollutant,
            concentration,
        } => {
            let pollutant: Pollutant = pollutant.parse()?;
            let aqi = pollutant.sub_index(concentration);
            let band = AqiBand::from_aqi(Some(aqi));
            info!(
                pollutant = %pollutant,
                concentration,
                unit = pollutant.unit(),
                aqi,
                band = band.label(),
                color = band.color(),
                "Sub-index computed"
            );
            println!(
                "{pollutant} {concentration} {}: AQI {aqi} ({})",
                pollutant.unit(),
                band.label()
            );
        }
        Commands::Composite { readings } => {
            let readings = readings
                .iter()
                .map(String::as_str)
                .map(parse_reading)
                .collect::<Result<Vec<_>>>()?;
            let pairs = || readings.iter().map(|(p, c)| (p.key(), Some(*c)));

            let aqi = composite_aqi(pairs());
            let band = AqiBand::from_aqi(Some(aqi));
            match dominant_pollutant(pairs()) {
                Some(dominant) => {
                    info!(aqi, dominant = %dominant, band = band.label(), "Composite computed");
                    println!("AQI {aqi} ({}), driven by {dominant}", band.label());
                }
                None => {
                    warn!("No positive concentration among the readings");
                    println!("AQI {aqi} (no pollutant above zero)");
                }
            }
        }
        Commands::Login { email } => {
            let password = password_from_env()?;
            let client = HttpAuthClient::new(&config.auth_url)?;
            let session = client.login(&email, &password).await?;
            info!(email = %email, role = %session.role, "Logged in");
            println!("{}", session.token);
        }
        Commands::Signup { email } => {
            let client = HttpAuthClient::new(&config.auth_url)?;
            let token = client.signup_start(&email).await?;
            info!(email = %email, "Signup started");
            println!("{token}");
        }
        Commands::SignupComplete { token } => {
            let password = password_from_env()?;
            let client = HttpAuthClient::new(&config.auth_url)?;
            client.signup_complete(&token, &password).await?;
            info!("Signup complete");
        }
    }

    Ok(())
}

fn password_from_env() -> Result<String> {
    std::env::var("AQI_PASSWORD").context("AQI_PASSWORD must be set")
}

/// Builds the station feed: configured endpoints in order, optionally the
/// mock dataset last, behind the TTL cache.
fn build_feed(config: &Config) -> Result<CachedFeed<FallbackFeed>> {
    let mut fallback = FallbackFeed::new(Vec::new());
    let client = Arc::new(StaticHeader::skip_browser_warning(BasicClient::new()));

    for url in &config.endpoints {
        fallback.push(Box::new(HttpStationFeed::new(client.clone(), url.clone())));
    }
    if config.use_mock {
        fallback.push(Box::new(MockDataSource));
    }
    if fallback.is_empty() {
        bail!("No station sources configured: set AQI_ENDPOINTS or AQI_USE_MOCK");
    }

    info!(
        sources = fallback.len(),
        mock = config.use_mock,
        "Station sources configured"
    );

    Ok(CachedFeed::new(
        fallback,
        TimeDelta::from_std(config.cache_ttl)?,
        Arc::new(SystemClock),
    ))
}

/// Loads ward text from a local file path or fetches it over HTTP.
#[tracing::instrument(skip_all, fields(source = %source))]
async fn fetcher(source: &str) -> Result<String> {
    let text = if source.starts_with("http") {
        let client = BasicClient::new();
        String::from_utf8(fetch_bytes(&client, source).await?)?
    } else {
        std::fs::read_to_string(source)?
    };
    Ok(text)
}

/// Loads wards from the first source that yields a valid FeatureCollection.
async fn load_ward_sources(sources: &[String]) -> Result<Vec<Ward>> {
    for source in sources {
        match fetcher(source).await.and_then(|text| load_wards(&text)) {
            Ok(wards) => {
                info!(source = %source, wards = wards.len(), "Ward shapes loaded");
                return Ok(wards);
            }
            Err(e) => warn!(source = %source, error = %e, "Ward source failed, trying next"),
        }
    }
    bail!("Ward data not found in any of {} sources", sources.len())
}

/// Runs refresh cycles at the configured interval, appending each cycle's
/// ward rows to `output` when given.
#[tracing::instrument(skip(config), fields(interval_secs = config.refresh_interval.as_secs()))]
async fn run_refresh(
    config: &Config,
    cycles: usize,
    output: Option<&str>,
    json: bool,
) -> Result<()> {
    let wards = load_ward_sources(&config.ward_sources).await?;
    let feed = build_feed(config)?;
    let mut board = WardBoard::new(wards);

    if cycles == 0 {
        info!("Refreshing indefinitely. Press Ctrl+C to stop.");
    }

    let mut cycle = 0;
    loop {
        // Check if we've reached the cycle limit (0 = infinite)
        if cycles > 0 && cycle >= cycles {
            break;
        }
        cycle += 1;

        let status = board.refresh(&feed).await.clone();
        info!(cycle, status = %status, "Refresh cycle complete");

        let rows = board.snapshot_rows(Utc::now());
        if let Some(path) = output {
            if let Err(e) = append_records(path, &rows) {
                error!(path, error = %e, "Failed to write ward readings");
            }
        }
        if json {
            print_json(&rows)?;
            print_json(&board.station_markers())?;
        }

        // If not the last cycle, wait before the next one
        if cycles == 0 || cycle < cycles {
            info!(
                interval_secs = config.refresh_interval.as_secs(),
                "Waiting before next refresh"
            );
            tokio::time::sleep(config.refresh_interval).await;
        }
    }

    Ok(())
}

/// Loads wards and runs one refresh, as the dashboard does on open.
async fn refreshed_board(config: &Config) -> Result<WardBoard> {
    let wards = load_ward_sources(&config.ward_sources).await?;
    let feed = build_feed(config)?;
    let mut board = WardBoard::new(wards);
    board.refresh(&feed).await;
    Ok(board)
}

/// One refresh, then resolves `(lat, lon)` the way a map click does.
async fn locate(config: &Config, lat: f64, lon: f64) -> Result<()> {
    let board = refreshed_board(config).await?;
    report_location(&board.locate(lat, lon));
    Ok(())
}

/// Ward name match first; otherwise geocodes the query and resolves the hit.
#[tracing::instrument(skip(config))]
async fn search(config: &Config, query: &str) -> Result<()> {
    let board = refreshed_board(config).await?;

    if let Some(ward) = find_ward_by_name(query, board.wards()) {
        info!(ward_id = %ward.id, "Matched ward by name");
        report_location(&Location::Ward(ward));
        return Ok(());
    }

    let client = StaticHeader::new(BasicClient::new(), "user-agent", "delhi_aqi/0.1")?;
    let Some((lat, lon)) = geocode(&client, &config.geocoder_url, query).await? else {
        bail!("Location not found: {query}");
    };
    report_location(&board.locate(lat, lon));
    Ok(())
}

fn report_location(location: &Location<'_>) {
    match location {
        Location::Ward(ward) => {
            let aqi = ward.reading.as_ref().map(|r| r.aqi);
            let band = AqiBand::from_aqi(aqi);
            info!(
                ward_id = %ward.id,
                ward_name = %ward.name,
                aqi = ?aqi,
                method = ?ward.reading.as_ref().map(|r| r.method.label()),
                band = band.label(),
                "Point resolved to ward"
            );
            println!("{}: {} ({})", ward.name, display_aqi(aqi), band.advisory());
        }
        Location::Outside { lat, lon, estimate } => {
            let aqi = estimate.map(|e| e.aqi);
            let band = AqiBand::from_aqi(aqi);
            info!(
                lat,
                lon,
                aqi = ?aqi,
                method = ?estimate.map(|e| e.method.label()),
                "Point is outside every ward"
            );
            println!(
                "Outside Ward Boundary ({lat:.4}, {lon:.4}): {} ({})",
                display_aqi(aqi),
                band.advisory()
            );
        }
    }
}

fn display_aqi(aqi: Option<u16>) -> String {
    aqi.map_or_else(|| "N/A".to_string(), |a| a.to_string())
}

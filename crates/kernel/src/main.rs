//! Trailhub
//!
//! HTTP server and terminal browser for the off-road listings.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use clap::{Parser, Subcommand};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use trailhub_kernel::listing::{ListQuery, ListView, ListingService, ViewStatus};
use trailhub_kernel::render::{self, DisplayMode};
use trailhub_kernel::{AppState, Config, routes, state};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Run one listing query and print the results
    Browse {
        /// Listing to browse (e.g., vehicles, parts, trails)
        listing: String,

        /// Free-text search term
        #[arg(long, default_value = "")]
        search: String,

        /// Filter value as key=value (repeatable)
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,

        /// Page number
        #[arg(long, default_value = "1")]
        page: u32,

        /// Card layout: grid or list
        #[arg(long, default_value = "grid")]
        mode: DisplayMode,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_tracing();

    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Browse {
            listing,
            search,
            filters,
            page,
            mode,
        } => {
            let query = ListQuery {
                search,
                filters: filters.into_iter().collect(),
                page,
            };
            browse(config, &listing, query, mode).await
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting Trailhub");
    info!(port = config.port, backend = ?config.backend, "Configuration loaded");

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    let cors = build_cors_layer(&config);

    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

async fn browse(config: Config, listing_id: &str, query: ListQuery, mode: DisplayMode) -> Result<()> {
    let registry = state::load_registry(&config)?;
    let source = state::connect_source(&config, &registry).await?;
    let service = ListingService::new(source, registry.into());

    let listing = service.definition(listing_id)?.clone();

    let view = ListView::with_query(listing_id, query);
    view.set_mode(mode);
    view.refresh(&service).await;

    let status = view.status();
    let output = render::render_status(
        listing.entity,
        &status,
        view.mode(),
        listing.empty_text.as_deref(),
    );

    if let ViewStatus::Failed(_) = status {
        anyhow::bail!(output);
    }

    println!("{}", listing.label);
    println!("{output}");
    Ok(())
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("missing filter key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [Method::GET, Method::OPTIONS];

    if config.cors_allowed_origins.len() == 1 && config.cors_allowed_origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    // Logs go to stderr so `browse` output can be piped.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

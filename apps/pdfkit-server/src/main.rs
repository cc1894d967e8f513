//! PDF Toolkit Server
//!
//! A small server exposing the three PDF tab flows as a JSON API:
//!
//! - Merge: upload several PDFs, reorder, concatenate into one
//! - Split: upload one PDF, split by pages / equal ranges / custom ranges
//! - Convert: extract text, edit it, export as TXT or DOCX
//!
//! State is held in a per-session in-memory store keyed by a uuid issued
//! on session creation; sessions expire after a configurable idle TTL.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod store;
#[cfg(test)]
mod tests;

use store::SessionStore;

/// Command-line arguments for the PDF toolkit server
#[derive(Parser, Debug)]
#[command(name = "pdfkit-server")]
#[command(about = "PDF toolkit server for merge, split, and text extraction")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Idle session lifetime in seconds
    #[arg(long, default_value = "3600")]
    session_ttl_secs: u64,

    /// Rate limit: requests per second per IP
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
pub struct AppState {
    /// Per-user transient session store
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(session_ttl: Duration) -> Self {
        Self {
            sessions: SessionStore::new(session_ttl),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PDF toolkit server on {}:{}", args.host, args.port);

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(args.rate_limit.into())
            .burst_size(args.rate_limit * 2)
            .finish()
            .expect("Failed to create rate limiter config"),
    );

    // Create shared state
    let state = Arc::new(AppState::new(Duration::from_secs(args.session_ttl_secs)));

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with middleware
    let app = api::router(state)
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(cors);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);
    info!("Session TTL: {}s", args.session_ttl_secs);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

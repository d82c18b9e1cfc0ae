//! Document-store dispatch server.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                 DOCUMENT STORE SERVER                │
//!                     │                                                      │
//!  Client Request     │  ┌─────────┐   ┌──────────┐   ┌──────────────────┐   │
//!  ───────────────────┼─▶│  http   │──▶│ dispatch │──▶│ resolution cache │   │
//!                     │  │ server  │   │          │   │   + resolver     │   │
//!                     │  └─────────┘   └────┬─────┘   └────────┬─────────┘   │
//!                     │                     │ admin            │ route       │
//!                     │                     ▼                  ▼             │
//!                     │               ┌──────────┐     ┌──────────────┐      │
//!                     │               │  events  │     │   handlers   │      │
//!                     │               │ emitter  │     │ + controllers│      │
//!                     │               └────┬─────┘     └──────┬───────┘      │
//!                     │                    ▼                  ▼              │
//!                     │               ┌──────────┐     ┌──────────────┐      │
//!  Client Response    │               │lifecycle │     │    memory    │      │
//!  ◀──────────────────┼── result ◀────│ shutdown │     │   registry   │      │
//!                     │               └──────────┘     └──────────────┘      │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use docstore_dispatch::config::{load_config, ServerConfig};
use docstore_dispatch::http::{HandlerSet, HttpServer};
use docstore_dispatch::lifecycle::{signals, startup};
use docstore_dispatch::memory::global;
use docstore_dispatch::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "docstore-server")]
#[command(about = "In-memory document store with cached request dispatch", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability.log_level)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "docstore-server starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        cache_capacity = config.cache.capacity,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let state = startup::bootstrap(&config, HandlerSet::builtin());
    global::install(Arc::clone(&state.registry));
    state
        .dispatcher
        .events()
        .attach(&tokio::runtime::Handle::current());
    tokio::spawn(signals::forward_signals(state.shutdown.clone()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(&config, state);
    let reason = server.run(listener).await?;

    tracing::info!(reason = ?reason, exit_code = reason.exit_code(), "Shutdown complete");
    Ok(ExitCode::from(reason.exit_code()))
}

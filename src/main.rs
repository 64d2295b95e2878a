//! Archive gate server.
//!
//! ```text
//!   caller ──POST /archive──▶ ┌──────────────────────────────────────────┐
//!                             │ validator → rate limiter → backend call  │──▶ archiving API
//!   caller ◀──── envelope ─── │      ▲                          │        │
//!                             │      └──── usage ledger ◀───────┘        │
//!                             └──────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use archive_gate::lifecycle::shutdown::report_final_usage;
use archive_gate::lifecycle::{signals, startup};
use archive_gate::observability::{logging, metrics};
use archive_gate::{GateServer, Shutdown};

#[derive(Parser)]
#[command(name = "archive-gate", version, about = "Gate in front of the archiving API")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "ARCHIVE_GATE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = startup::load(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("archive-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend_url = %config.backend.url,
        daily_limit = config.rate_limit.daily_limit,
        hourly_limit = config.rate_limit.hourly_limit,
        min_interval_secs = config.rate_limit.min_interval_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let pipeline = startup::build_pipeline(&config)?;
    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server = GateServer::new(pipeline.clone(), &config.listener);
    let serving = tokio::spawn(server.run(listener, shutdown.clone()));

    signals::shutdown_on_signal(&shutdown).await;
    serving.await??;
    report_final_usage(&pipeline);

    tracing::info!("Shutdown complete");
    Ok(())
}

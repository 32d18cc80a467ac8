//! Konsulent API — serves the fixed consultant roster.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger
//!   4. Build the roster
//!   5. Spawn Ctrl-C / SIGTERM → shutdown watcher
//!   6. Serve until shutdown

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use konsulent_tjenester::{config, error::AppError, logger, roster::Roster, server};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — the file is optional.
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    logger::init(&config.log_level, config.log_format)?;

    let roster = Roster::seed();
    info!(
        bind = %config.roster_service.bind,
        consultants = roster.all().len(),
        "config loaded"
    );

    let shutdown = CancellationToken::new();
    server::spawn_shutdown_watcher(shutdown.clone());

    let router = server::roster_api::router(Arc::new(roster));
    server::serve("konsulent-api", &config.roster_service.bind, router, shutdown).await
}

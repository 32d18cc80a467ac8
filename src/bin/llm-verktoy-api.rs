//! LLM Verktøy API — availability summaries over the konsulent-api roster.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger
//!   4. Build the roster client and the summarizer (template-only without
//!      `OPENAI_API_KEY`)
//!   5. Spawn Ctrl-C / SIGTERM → shutdown watcher
//!   6. Serve until shutdown

use tokio_util::sync::CancellationToken;
use tracing::info;

use konsulent_tjenester::{
    config,
    error::AppError,
    logger,
    roster_client::RosterClient,
    server::{self, query_api::QueryState},
    summary::Summarizer,
};

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

    let roster = RosterClient::from_config(&config.query_service)
        .map_err(|e| AppError::Config(format!("roster client: {e}")))?;
    let summarizer = Summarizer::from_config(&config)
        .map_err(|e| AppError::Config(format!("llm provider: {e}")))?;

    info!(
        bind = %config.query_service.bind,
        roster_endpoint = %roster.endpoint(),
        llm_enabled = summarizer.llm_enabled(),
        llm_model = %config.llm.model,
        "config loaded"
    );

    let shutdown = CancellationToken::new();
    server::spawn_shutdown_watcher(shutdown.clone());

    let router = server::query_api::router(QueryState { roster, summarizer });
    server::serve("llm-verktoy-api", &config.query_service.bind, router, shutdown).await
}

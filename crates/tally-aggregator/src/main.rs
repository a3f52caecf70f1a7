//! tally aggregator
//!
//! - Event ingestion: POST /v1/events (one envelope per delivery)
//! - Counters read: GET /v1/counters
//! - Ops: /healthz, /readyz, /metrics
//! - Config path: first argument, default `tally.yaml`

use std::process::ExitCode;

use tally_aggregator::{app_state::AppState, config, obs, router, store};
use tally_core::error::{Result, TallyError};

#[tokio::main]
async fn main() -> ExitCode {
    obs::logging::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "tally-aggregator failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "tally.yaml".to_string());
    let cfg = config::load_from_file(&path)?;
    let listen = cfg.server.listen_addr()?;

    let store = store::connect(&cfg.store).await?;
    let state = AppState::with_store(cfg, store)?;
    let app = router::build_router(state.clone());

    tracing::info!(%listen, config = %path, "tally-aggregator starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| TallyError::Internal(format!("bind {listen} failed: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await
        .map_err(|e| TallyError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal(state: AppState) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    state.set_draining();
    tracing::info!("shutdown requested; draining");
}

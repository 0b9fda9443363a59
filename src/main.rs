//! CutGate API - governance gate service
//!
//! Serves the propose / vote / relinquish workflow over HTTP, applying
//! approved cuts to an in-memory facet registry.

use cutgate::config::{LogFormat, Settings};
use cutgate::routes::create_router;
use cutgate::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let settings = Settings::load()?;

    // Initialize tracing subscriber for structured logging
    init_tracing(settings.log_format);

    info!("Starting CutGate governance gate...");

    let governance = &settings.governance;
    let state = match AppState::new(governance) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Invalid governance configuration: {}", e);
            return Err(e.into());
        }
    };
    info!(
        "Gate ready: {} signer(s), threshold {}, proposals expire after {}s",
        governance.signers.len(),
        governance.vote_threshold,
        governance.proposal_expiration_secs
    );

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("Server listening on http://{}", addr);
    info!("");
    info!("API Endpoints:");
    info!("   GET  /api/governance                      - Signers, threshold, expiration");
    info!("   POST /api/proposals                       - Propose a registry cut");
    info!("   GET  /api/proposals                       - List proposals");
    info!("   GET  /api/proposals/{{id}}                  - Get a proposal");
    info!("   POST /api/proposals/{{id}}/votes            - Vote on a proposal");
    info!("   GET  /api/proposals/{{id}}/votes/{{signer}}   - Vote status");
    info!("   POST /api/proposals/expire                - Fail expired proposals");
    info!("   GET  /api/relinquish                      - Relinquish tally");
    info!("   POST /api/relinquish/votes                - Vote to relinquish cut control");
    info!("   GET  /api/events                          - Governance notifications");
    info!("");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,cutgate=debug,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .compact(),
            )
            .init(),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        },
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use foodeasy_server::{
    api::router,
    config::AppConfig,
    logging::init_tracing,
    state::{AppState, StartupError},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // The subscriber needs LOG_FORMAT from the config; fall back to defaults.
            init_tracing(Default::default());
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };
    init_tracing(config.log_format);

    if let Err(e) = run(config).await {
        error!(error = %e, "server failed");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), StartupError> {
    let addr = config.bind_addr;
    let state = AppState::from_config(config)?;
    let app = router(state);

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for shutdown signal");
        }
        signal.cancel();
    });

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "FoodEasy API listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{future::Future, net::SocketAddr, process::ExitCode};

use cookie_auth_server::{
    api::router,
    config::{Config, DEFAULT_LOG_FILTER},
    state::AppState,
};
use axum_server::Handle;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Resolve on Ctrl-C. Never resolves if the signal handler can't be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Start a graceful shutdown of the server behind `handle` once `signal` resolves.
async fn shutdown_on<F>(handle: Handle<SocketAddr>, signal: F)
where
    F: Future<Output = ()>,
{
    signal.await;
    info!("Shutdown signal received");
    handle.graceful_shutdown(None);
}

#[tokio::main]
async fn main() -> ExitCode {
    // The log format comes from the config, so config errors go to stderr.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.json_logs);

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to initialize application state");
            return ExitCode::FAILURE;
        }
    };
    let app = router(state);

    let addr: SocketAddr = match config.bind_address().parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, address = %config.bind_address(), "Failed to parse bind address");
            return ExitCode::FAILURE;
        }
    };

    info!(
        %addr,
        token_ttl_secs = config.token_ttl.map(|ttl| ttl.as_secs()),
        "Cookie auth server listening (docs at /docs)"
    );

    let handle = Handle::new();
    tokio::spawn(shutdown_on(handle.clone(), ctrl_c()));

    if let Err(e) = axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await
    {
        error!(error = %e, "HTTP server failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

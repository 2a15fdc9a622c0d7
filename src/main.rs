mod config;
mod db;
mod error;
mod handler;
mod model;
mod route;
mod schema;

use std::sync::Arc;

use axum::Server;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::{
    config::{Config, Pagination},
    db::TodoStore,
    error::StartupError,
    route::{cors_layer, create_router},
};

// Struct representing the application state
pub struct AppState {
    pub store: TodoStore,
    pub pagination: Pagination,
}

// Entry point of the application
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run().await {
        tracing::error!(error = %err, "todo api failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = Config::init()?;

    // No request is served without a working store
    let store = TodoStore::connect(&config).await?;

    let app_state = Arc::new(AppState {
        store,
        pagination: config.pagination,
    });

    let app = create_router(app_state)
        .layer(cors_layer(config.cors_origin.clone()))
        .layer(TraceLayer::new_for_http());

    tracing::info!(addr = %config.addr, pagination = ?config.pagination, "server started");

    Server::try_bind(&config.addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

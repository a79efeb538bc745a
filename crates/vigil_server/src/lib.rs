//! # VIGIL Server
//!
//! HTTP front end for [`vigil_core`]. Reporters post agent state, dashboards
//! poll devices and warnings, operators switch modes.
//!
//! ## Layout
//!
//! - [`config`] - TOML configuration loaded once at startup
//! - [`api`] - axum router, handlers and error mapping
//! - [`simulation`] - random demo fleet

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod api;
pub mod config;
pub mod simulation;

use std::path::Path;

use thiserror::Error;
use tokio::net::TcpListener;

pub use api::{create_router, AppState};
pub use config::{ConfigError, VigilConfig};

/// Errors that stop the server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Bind or accept failure.
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Loads the configuration file, or the defaults when no path is given.
///
/// # Errors
///
/// Returns [`ServerError::Config`] if the file is unreadable, malformed or
/// out of range.
pub fn load_config(path: Option<&Path>) -> Result<VigilConfig, ServerError> {
    let config = match path {
        Some(path) => VigilConfig::from_file(path)?,
        None => VigilConfig::default(),
    };
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

/// Binds the configured address and serves until Ctrl+C.
///
/// # Errors
///
/// Returns [`ServerError::Io`] if the address cannot be bound or the
/// accept loop fails.
pub async fn serve(config: VigilConfig) -> Result<(), ServerError> {
    let addr = config.server.bind_address;
    let state = AppState::new(config.build_tracker(), config.simulation);
    let app = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        system_mode = %config.modes.system_mode,
        control_mode = %config.modes.control_mode,
        "collision tracker listening"
    );
    for route in api::ROUTES {
        tracing::info!("  {route}");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::warn!("received Ctrl+C, shutting down"),
        Err(e) => tracing::error!(error = %e, "failed to listen for Ctrl+C"),
    }
}

//! # ARENA Server
//!
//! Hosts one authoritative session on a TCP line transport.
//!
//! ## Usage
//!
//! ```bash
//! ARENA_CONFIG=arena.toml RUST_LOG=arena=debug arena
//! ```
//!
//! Every config field can be overridden with an `ARENA_*` variable, e.g.
//! `ARENA_PORT=9600 ARENA_MAX_PLAYERS=4 arena`.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod config;
mod transport;

use std::io;
use std::process::ExitCode;

use arena_networking::server::{run_session, Session, SystemClock};
use arena_networking::ServerConfig;
use arena_shared::Outbox;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc::unbounded_channel;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ConfigError;

/// Fatal startup errors.
#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("transport: {0}")]
    Io(#[from] io::Error),
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ServerError> {
    let config = config::load()?;
    warn_unused_options(&config);

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(
        addr = %listener.local_addr()?,
        max_players = config.max_players,
        tick_rate = config.tick_rate_hz,
        "listening"
    );

    let (outbox, commands) = Outbox::channel();
    let (session_tx, session_rx) = unbounded_channel();
    let (router_tx, router_rx) = unbounded_channel();

    transport::spawn_outbox_pump(commands, router_tx.clone())?;
    tokio::spawn(transport::route(router_rx));
    tokio::spawn(transport::accept_loop(listener, session_tx, router_tx));

    let session = Session::new(config, SystemClock, outbox);
    run_session(session, session_rx).await;
    info!("session finished");
    Ok(())
}

/// Options the line transport does not act on.
fn warn_unused_options(config: &ServerConfig) {
    if config.tls_cert.is_some() {
        warn!("tls_cert/tls_key are set but the line transport serves plain TCP");
    }
    if !config.cors_origin.is_empty() {
        warn!(origin = %config.cors_origin, "cors_origin has no effect on the line transport");
    }
    if config.health_check {
        warn!("health_check is set but the line transport has no health endpoint");
    }
}

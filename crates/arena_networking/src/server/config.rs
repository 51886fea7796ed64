//! Server configuration.

use std::path::PathBuf;
use std::time::Duration;

use arena_shared::{Bounds, Millis, DEFAULT_MAX_PLAYERS, DEFAULT_PORT, SERVER_TICK_RATE};
use arena_simulation::prefabs::GAME_DURATION_MS;
use serde::{Deserialize, Serialize};

/// Asteroids spawned at the start of every game.
pub const DEFAULT_ASTEROID_COUNT: usize = 10;

/// Server configuration.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
    /// Allowed CORS origin for browser transports. Empty allows none.
    pub cors_origin: String,
    /// Players needed to start, and the most accepted at once.
    pub max_players: usize,
    /// Ticks per second while a game runs.
    pub tick_rate_hz: u32,
    /// Playable area.
    pub arena: Bounds,
    /// Asteroids spawned per game.
    pub asteroid_count: usize,
    /// Match length.
    pub game_duration_ms: Millis,
    /// Seed for every game's RNG. Taken from the clock when absent.
    pub seed: Option<u64>,
    /// TLS certificate for the transport.
    pub tls_cert: Option<PathBuf>,
    /// TLS private key for the transport.
    pub tls_key: Option<PathBuf>,
    /// Answer orchestrator health checks.
    pub health_check: bool,
}

impl ServerConfig {
    /// Time between ticks.
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.tick_rate_hz.max(1)))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cors_origin: String::new(),
            max_players: DEFAULT_MAX_PLAYERS,
            tick_rate_hz: SERVER_TICK_RATE,
            arena: Bounds::default(),
            asteroid_count: DEFAULT_ASTEROID_COUNT,
            game_duration_ms: GAME_DURATION_MS,
            seed: None,
            tls_cert: None,
            tls_key: None,
            health_check: false,
        }
    }
}

//! # Configuration Loading
//!
//! 1. `ARENA_CONFIG` names a TOML file (default `arena.toml`, skipped if
//!    absent unless named explicitly)
//! 2. `ARENA_*` environment variables override single fields
//! 3. The result is validated before the server starts

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use arena_networking::ServerConfig;
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "ARENA_CONFIG";
/// Config file read when `ARENA_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "arena.toml";

/// Errors raised while building the server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`ServerConfig`].
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: toml::de::Error,
    },

    /// An override variable did not parse.
    #[error("invalid value for {var}: {value:?}")]
    Env {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// The merged configuration is unusable.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Loads, overrides and validates the configuration from the process
/// environment.
///
/// # Errors
///
/// See [`ConfigError`].
pub fn load() -> ConfigResult<ServerConfig> {
    let explicit = env::var_os(CONFIG_ENV).map(PathBuf::from);
    let path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = from_file(&path, explicit.is_some())?;
    apply_overrides(&mut config, |var| env::var(var).ok())?;
    validate(&config)?;
    Ok(config)
}

/// Reads `path`. A missing file yields the defaults unless `required`.
///
/// # Errors
///
/// [`ConfigError::Read`] or [`ConfigError::Parse`].
pub fn from_file(path: &Path, required: bool) -> ConfigResult<ServerConfig> {
    if !required && !path.exists() {
        return Ok(ServerConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })
}

/// Applies `ARENA_*` overrides found through `lookup`.
///
/// # Errors
///
/// [`ConfigError::Env`] for a value that does not parse.
pub fn apply_overrides(
    config: &mut ServerConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ConfigResult<()> {
    if let Some(v) = lookup("ARENA_PORT") {
        config.port = parse("ARENA_PORT", v)?;
    }
    if let Some(v) = lookup("ARENA_CORS_ORIGIN") {
        config.cors_origin = v;
    }
    if let Some(v) = lookup("ARENA_MAX_PLAYERS") {
        config.max_players = parse("ARENA_MAX_PLAYERS", v)?;
    }
    if let Some(v) = lookup("ARENA_TICK_RATE") {
        config.tick_rate_hz = parse("ARENA_TICK_RATE", v)?;
    }
    if let Some(v) = lookup("ARENA_ASTEROID_COUNT") {
        config.asteroid_count = parse("ARENA_ASTEROID_COUNT", v)?;
    }
    if let Some(v) = lookup("ARENA_GAME_DURATION_MS") {
        config.game_duration_ms = parse("ARENA_GAME_DURATION_MS", v)?;
    }
    if let Some(v) = lookup("ARENA_SEED") {
        config.seed = Some(parse("ARENA_SEED", v)?);
    }
    if let Some(v) = lookup("ARENA_TLS_CERT") {
        config.tls_cert = Some(PathBuf::from(v));
    }
    if let Some(v) = lookup("ARENA_TLS_KEY") {
        config.tls_key = Some(PathBuf::from(v));
    }
    if let Some(v) = lookup("ARENA_HEALTH_CHECK") {
        config.health_check = parse("ARENA_HEALTH_CHECK", v)?;
    }
    Ok(())
}

fn parse<T: FromStr>(var: &'static str, value: String) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::Env { var, value })
}

/// Rejects configurations the session cannot run with.
///
/// # Errors
///
/// [`ConfigError::Invalid`].
pub fn validate(config: &ServerConfig) -> ConfigResult<()> {
    if config.max_players == 0 {
        return Err(ConfigError::Invalid("max_players must be at least 1"));
    }
    if config.tick_rate_hz == 0 {
        return Err(ConfigError::Invalid("tick_rate_hz must be at least 1"));
    }
    if config.arena.w <= 0.0 || config.arena.h <= 0.0 {
        return Err(ConfigError::Invalid("arena must have a positive size"));
    }
    if config.tls_cert.is_some() != config.tls_key.is_some() {
        return Err(ConfigError::Invalid("tls_cert and tls_key must be set together"));
    }
    Ok(())
}

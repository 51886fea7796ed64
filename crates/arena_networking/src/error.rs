//! Error types for protocol handling.

use arena_core::EcsError;
use thiserror::Error;

/// Errors raised while applying a server message on a client.
///
/// An error only rejects the offending message; the game keeps running.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// An asteroid spawn without the size or outline needed to build it.
    #[error("asteroid #{0} spawned without size or outline points")]
    MissingAsteroidShape(u32),

    /// The ECS rejected the mirrored spawn.
    #[error(transparent)]
    Ecs(#[from] EcsError),
}

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

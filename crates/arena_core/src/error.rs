//! # ECS Error Types

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors raised by entity lifecycle operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The id is out of range or its slot is already free.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A mirrored spawn targeted an occupied slot.
    #[error("entity id already in use: {0}")]
    IdInUse(EntityId),

    /// Every `u32` id is taken.
    #[error("entity id space exhausted")]
    IdSpaceExhausted,
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;

//! # ARENA Shared
//!
//! Common types used by both client and server.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on the ECS or the simulation. It only
//! describes what crosses the wire:
//! - 2D vector math used by every payload
//! - Event names and payloads (`protocol`)
//! - The fire-and-forget outbound handle (`outbox`)

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;
pub mod outbox;
pub mod protocol;

pub use constants::{
    ARENA_HEIGHT, ARENA_WIDTH, DEFAULT_MAX_PLAYERS, DEFAULT_PORT, SERVER_TICK_RATE,
};
pub use math::{lerp, lerp_angle, Bounds, Vector2};
pub use outbox::Outbox;
pub use protocol::{
    ClientMessage, ColliderShape, EntityPacket, EntityType, InitialData, Millis, OtherData,
    PlayerInputPacket, Recipient, ReportEntry, ServerCommand, ServerMessage, SocketId,
    SpawnEntityPacket, SyncHealthPacket, SyncInventoryPacket, SyncTimerPacket,
    SyncTransformPacket, DEFAULT_SIZE,
};

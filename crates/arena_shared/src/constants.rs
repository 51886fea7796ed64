//! # Network & Arena Constants
//!
//! Defaults baked into both binaries. The server can override most of them
//! through its configuration; clients take the arena size from here.

// =============================================================================
// NETWORK CONFIGURATION
// =============================================================================

/// Default listen port for game traffic.
pub const DEFAULT_PORT: u16 = 9500;

/// Default number of players a session waits for before starting.
pub const DEFAULT_MAX_PLAYERS: usize = 2;

/// Server simulation rate (ticks per second).
pub const SERVER_TICK_RATE: u32 = 60;

// =============================================================================
// ARENA CONFIGURATION
// =============================================================================

/// Arena width in world units.
pub const ARENA_WIDTH: f32 = 1440.0;

/// Arena height in world units.
pub const ARENA_HEIGHT: f32 = 1080.0;

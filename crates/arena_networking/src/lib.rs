//! # ARENA Networking
//!
//! Keeps every client's view consistent with the authoritative server over
//! a delayed, reordering transport.
//!
//! ## Architecture
//!
//! - **Sync**: fixed-rate broadcast of transforms, health, inventory and
//!   timers; fixed-rate upload of the local player's input
//! - **Interpolation**: remote entities are drawn 200 ms in the past,
//!   between two buffered server snapshots
//! - **Prediction**: the local player is simulated immediately, compared
//!   against each fresh snapshot and replayed from it on divergence
//! - **Session**: lobby, waiting room, active game and end-of-game report
//!
//! ```text
//! SERVER                                   CLIENT
//!   |                                         |
//!   |<------ playerInput (1/30 s) ------------|  local prediction
//!   |                                         |
//!   |------- syncTransform (1/30 s) --------->|  reconcile / interpolate
//!   |------- spawnEntity / despawnEntity ---->|
//! ```
//!
//! No socket is opened here. The server side consumes
//! [`server::SessionEvent`]s and emits through an
//! [`Outbox`](arena_shared::Outbox); the embedder owns the wire.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod error;
pub mod interpolation;
pub mod prediction;
pub mod server;
pub mod sync;

pub use client::{ClientEngine, ClientGame, ClientState};
pub use error::{ProtocolError, ProtocolResult};
pub use interpolation::{interpolate, TransformSmoothingSystem, NETWORK_DELAY_MS};
pub use prediction::{reconcile, ClientPredictionSystem, ReconciliationResult};
pub use server::{run_session, ServerConfig, ServerGame, Session, SessionEvent, SessionState};
pub use sync::{InputSyncSystem, SyncSystem};

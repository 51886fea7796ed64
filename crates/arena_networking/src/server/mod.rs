//! # Server Session
//!
//! Everything the authoritative server runs above the ECS:
//! - [`Session`]: connection bookkeeping and the lobby/game state machine
//! - [`ServerGame`]: one match's world, systems and seeded RNG
//! - [`TickDriver`]: wall-clock dt between ticks
//! - [`run_session`]: the tokio loop tying transport events to ticks

pub mod clock;
pub mod config;
pub mod game;
pub mod runtime;
pub mod session;
pub mod tick;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ServerConfig, DEFAULT_ASTEROID_COUNT};
pub use game::ServerGame;
pub use runtime::{run_session, SessionEvent};
pub use session::{Session, SessionState};
pub use tick::{TickDriver, TickStats};

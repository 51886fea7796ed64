//! # ARENA Simulation
//!
//! Gameplay systems that run inside an [`arena_core::Ecs`].
//!
//! ## Shared systems (server and client)
//!
//! | System | Effect |
//! |---|---|
//! | [`PlayerInputHandlerSystem`] | move intent → acceleration, look → rotation |
//! | [`PhysicsSystem`] | acceleration, drag, velocity integration |
//! | [`CollisionSystem`] | priority-based push-out of solid colliders |
//! | [`BoundsSystem`] | toroidal wrap at the arena edges |
//!
//! These only act on entities whose [`SimulationAuthority`](arena_core::SimulationAuthority)
//! simulates, so a client moves its own player and nothing else.
//!
//! ## Server-only systems
//!
//! Laser spawning, triggers, health, lifetime and the game timer create and
//! destroy entities, and announce every change through an
//! [`Outbox`](arena_shared::Outbox).

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod bounds;
pub mod broadcast;
pub mod collision;
pub mod health;
pub mod input;
pub mod laser;
pub mod lifetime;
pub mod physics;
pub mod prefabs;
pub mod trigger;

pub use bounds::BoundsSystem;
pub use collision::CollisionSystem;
pub use health::HealthSystem;
pub use input::PlayerInputHandlerSystem;
pub use laser::LaserSpawnSystem;
pub use lifetime::{LifetimeSystem, TimerEndGameSystem};
pub use physics::PhysicsSystem;
pub use trigger::TriggerSystem;

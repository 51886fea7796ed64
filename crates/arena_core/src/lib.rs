//! # ARENA Core
//!
//! Entity Component System shared by the authoritative server and every
//! client.
//!
//! ## Architecture Rules
//!
//! 1. **Ids are slots** - an entity id indexes every component column directly
//! 2. **Presence is the mask** - a component is readable only if its bit is set
//! 3. **Ids are recycled** - the lowest freed id is handed out first
//! 4. **One world per session** - no globals, the world is passed explicitly
//!
//! ## Example
//!
//! ```rust,ignore
//! use arena_core::{ComponentMask, ComponentType, World};
//!
//! let mut world = World::default();
//! let ship = world.create_entity(
//!     EntityType::Player,
//!     &InitialData::default(),
//!     ComponentMask::of(&[ComponentType::Transform, ComponentType::RigidBody]),
//! )?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod ecs;
pub mod error;
pub mod timed_buffer;

pub use ecs::{
    Collider, Component, ComponentMask, ComponentStorage, ComponentTables, ComponentType, Ecs,
    Entity, EntityId, FromInitial, Health, Inventory, LaserSpawner, Lifetime, LocalPlayer,
    PlayerInput, RigidBody, SimulationAuthority, SyncGate, System, TickContext, TickReport,
    TimedInput, Timer, Transform, TransformSnapshot, TransformSync, TriggerCollider, World,
};
pub use error::{EcsError, EcsResult};
pub use timed_buffer::{Timed, TimedBuffer};

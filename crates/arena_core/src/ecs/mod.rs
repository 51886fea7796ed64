//! # Entity Component System
//!
//! - Entities are `u32` slots recycled through a free list
//! - Components live in one dense column per type, indexed by entity id
//! - Systems run in construction order, each over every live entity

mod component;
mod entity;
mod storage;
mod system;
mod world;

pub use component::{
    Collider, Component, ComponentMask, ComponentType, FromInitial, Health, Inventory,
    LaserSpawner, Lifetime, LocalPlayer, PlayerInput, RigidBody, TimedInput, Timer, Transform,
    TransformSnapshot, TransformSync, TriggerCollider, INPUT_HISTORY_CAPACITY, SNAPSHOT_CAPACITY,
};
pub use entity::{Entity, EntityId, SimulationAuthority};
pub use storage::ComponentStorage;
pub use system::{Ecs, SyncGate, System, TickContext, TickReport};
pub use world::{ComponentTables, World};

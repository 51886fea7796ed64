//! # Entity Prefabs
//!
//! Initial data and component sets for every entity type.
//!
//! The server builds an entity from the same [`InitialData`] it broadcasts,
//! and the client rebuilds it from that broadcast with its own component
//! set. Keeping both sets here means a new component cannot be added to
//! one side and forgotten on the other.

use std::f32::consts::{FRAC_PI_2, TAU};

use arena_core::{ComponentMask, ComponentType as C, Transform};
use arena_shared::{Bounds, ColliderShape, EntityType, InitialData, Millis, OtherData, Vector2};
use rand::Rng;

// =============================================================================
// TUNING
// =============================================================================

/// Player collider radius.
pub const PLAYER_RADIUS: f32 = 20.0;
/// Player resolution priority.
pub const PLAYER_PRIORITY: f32 = 20.0;
/// Player acceleration at full input.
pub const PLAYER_MAX_ACCELERATION: f32 = 1000.0;
/// Milliseconds between laser shots.
pub const PLAYER_FIRE_RATE_MS: Millis = 500;
/// Distance kept from the arena edge when placing players.
pub const SPAWN_MARGIN: f32 = 100.0;

/// Laser speed in units per second.
pub const LASER_SPEED: f32 = 1000.0;
/// Laser time to live.
pub const LASER_LIFETIME_MS: Millis = 2000;
/// Gap between the owner's collider and the laser spawn point.
pub const LASER_MUZZLE_GAP: f32 = 11.0;
/// Laser trigger size (circle, radius in `x`).
pub const LASER_TRIGGER_SIZE: Vector2 = Vector2::new(5.0, 30.0);
/// Client-side blink phase before a laser expires.
pub const LASER_FLASH_WINDOW_MS: Millis = 300;

/// Material pickup radius.
pub const MATERIAL_TRIGGER_RADIUS: f32 = 5.0;

/// Smallest asteroid radius.
pub const ASTEROID_MIN_RADIUS: f32 = 20.0;
/// Largest asteroid radius.
pub const ASTEROID_MAX_RADIUS: f32 = 80.0;
/// Asteroid drift speed bound per axis.
pub const ASTEROID_MAX_SPEED: f32 = 10.0;

/// Default match length.
pub const GAME_DURATION_MS: Millis = 90_000;

// =============================================================================
// COMPONENT SETS
// =============================================================================

/// Server-side player.
pub const SERVER_PLAYER: ComponentMask = ComponentMask::of(&[
    C::Transform,
    C::PlayerInput,
    C::Collider,
    C::RigidBody,
    C::LaserSpawner,
    C::Inventory,
]);

/// Server-side asteroid.
pub const SERVER_ASTEROID: ComponentMask = ComponentMask::of(&[
    C::Transform,
    C::RigidBody,
    C::Collider,
    C::TransformSync,
    C::Health,
]);

/// Server-side material.
pub const SERVER_MATERIAL: ComponentMask =
    ComponentMask::of(&[C::Transform, C::TriggerCollider, C::RigidBody]);

/// Server-side laser.
pub const SERVER_PROJECTILE: ComponentMask = ComponentMask::of(&[
    C::Transform,
    C::RigidBody,
    C::TriggerCollider,
    C::Lifetime,
]);

/// Server-side game timer.
pub const SERVER_GAME_TIMER: ComponentMask = ComponentMask::of(&[C::Timer]);

/// Goal zones are a reserved wire kind; nothing spawns one yet.
const GOAL: ComponentMask = ComponentMask::of(&[C::Transform, C::Collider]);

/// Components the server attaches to a new entity of `kind`.
#[must_use]
pub const fn server_components(kind: EntityType) -> ComponentMask {
    match kind {
        EntityType::Player => SERVER_PLAYER,
        EntityType::Asteroid => SERVER_ASTEROID,
        EntityType::Material => SERVER_MATERIAL,
        EntityType::Projectile => SERVER_PROJECTILE,
        EntityType::GameTimer => SERVER_GAME_TIMER,
        EntityType::Goal => GOAL,
    }
}

/// Components a client attaches when mirroring a spawn.
///
/// Everything that moves gets a [`TransformSync`](arena_core::TransformSync)
/// to buffer server snapshots. The local player additionally carries the
/// input and marker components needed for prediction.
#[must_use]
pub const fn client_components(kind: EntityType, is_local: bool) -> ComponentMask {
    match kind {
        EntityType::Player if is_local => ComponentMask::of(&[
            C::Transform,
            C::PlayerInput,
            C::LocalPlayer,
            C::Collider,
            C::RigidBody,
            C::TransformSync,
            C::Inventory,
        ]),
        EntityType::Player => ComponentMask::of(&[
            C::Transform,
            C::Collider,
            C::RigidBody,
            C::TransformSync,
            C::Inventory,
        ]),
        EntityType::Asteroid => SERVER_ASTEROID,
        EntityType::Material => SERVER_MATERIAL.with(C::TransformSync),
        EntityType::Projectile => SERVER_PROJECTILE.with(C::TransformSync),
        EntityType::GameTimer => SERVER_GAME_TIMER,
        EntityType::Goal => GOAL,
    }
}

// =============================================================================
// INITIAL DATA
// =============================================================================

/// A player at a random position inside `bounds`, away from the edges.
pub fn player<R: Rng + ?Sized>(rng: &mut R, bounds: &Bounds) -> InitialData {
    let x = bounds.x + SPAWN_MARGIN + rng.gen::<f32>() * (bounds.w - SPAWN_MARGIN);
    let y = bounds.y + SPAWN_MARGIN + rng.gen::<f32>() * (bounds.h - SPAWN_MARGIN);

    InitialData {
        position: Some(Vector2::new(x, y)),
        is_static: Some(false),
        shape: Some(ColliderShape::Circle),
        max_acceleration: Some(PLAYER_MAX_ACCELERATION),
        size: Some(Vector2::new(PLAYER_RADIUS, PLAYER_RADIUS)),
        priority: Some(PLAYER_PRIORITY),
        fire_rate: Some(PLAYER_FIRE_RATE_MS),
        last_fire_time: Some(0),
        ..InitialData::default()
    }
}

/// Jagged outline of `radius`: 4 to 10 points, each between half and the
/// full radius from the centre.
pub fn asteroid_outline<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec<Vector2> {
    let count = rng.gen_range(4..=10);
    (0..count)
        .map(|p| {
            let angle = p as f32 * TAU / count as f32;
            let distance = rng.gen_range(radius * 0.5..=radius);
            Vector2::from_angle(angle) * distance
        })
        .collect()
}

/// An asteroid anywhere in `bounds` with a random size, drift and outline.
///
/// Its priority and health both equal its radius, so bigger rocks push
/// smaller ones and take more hits.
pub fn asteroid<R: Rng + ?Sized>(rng: &mut R, bounds: &Bounds) -> (InitialData, OtherData) {
    let radius = rng.gen_range(ASTEROID_MIN_RADIUS..ASTEROID_MAX_RADIUS);
    let points = asteroid_outline(rng, radius);

    let initial = InitialData {
        position: Some(Vector2::new(
            bounds.x + rng.gen::<f32>() * bounds.w,
            bounds.y + rng.gen::<f32>() * bounds.h,
        )),
        is_static: Some(false),
        max_acceleration: Some(PLAYER_MAX_ACCELERATION),
        size: Some(Vector2::new(radius, radius)),
        has_drag: Some(false),
        velocity: Some(Vector2::new(
            rng.gen_range(-ASTEROID_MAX_SPEED..ASTEROID_MAX_SPEED),
            rng.gen_range(-ASTEROID_MAX_SPEED..ASTEROID_MAX_SPEED),
        )),
        shape: Some(ColliderShape::Circle),
        priority: Some(radius),
        health: Some(radius),
        max_health: Some(radius),
        ..InitialData::default()
    };

    (initial, OtherData { points })
}

/// Number of materials an asteroid of `radius` breaks into.
#[must_use]
pub fn fragment_count(radius: f32) -> u32 {
    (((radius - ASTEROID_MIN_RADIUS) / 10.0).floor() as i64).max(1) as u32
}

/// A laser leaving `owner` along its facing.
///
/// `owner_radius` keeps the spawn point clear of the shooter's own collider.
#[must_use]
pub fn projectile(owner: &Transform, owner_radius: f32, now: Millis) -> InitialData {
    let facing = Vector2::from_angle(owner.rotation);

    InitialData {
        position: Some(owner.position + facing * (owner_radius + LASER_MUZZLE_GAP)),
        rotation: Some(owner.rotation + FRAC_PI_2),
        trigger_shape: Some(ColliderShape::Circle),
        trigger_size: Some(LASER_TRIGGER_SIZE),
        velocity: Some(facing * LASER_SPEED),
        has_drag: Some(false),
        lifetime: Some(LASER_LIFETIME_MS),
        spawn_time: Some(now),
        ..InitialData::default()
    }
}

/// A collectible drifting with `velocity`.
#[must_use]
pub fn material(position: Vector2, velocity: Vector2) -> InitialData {
    InitialData {
        position: Some(position),
        velocity: Some(velocity),
        has_drag: Some(true),
        trigger_shape: Some(ColliderShape::Circle),
        trigger_size: Some(Vector2::new(MATERIAL_TRIGGER_RADIUS, MATERIAL_TRIGGER_RADIUS)),
        ..InitialData::default()
    }
}

/// The session countdown starting at `now`.
#[must_use]
pub fn game_timer(now: Millis, duration: Millis) -> InitialData {
    InitialData {
        timer_start: Some(now),
        timer_duration: Some(duration),
        ..InitialData::default()
    }
}

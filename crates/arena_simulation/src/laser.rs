//! Laser firing.

use arena_core::{Collider, Entity, LaserSpawner, PlayerInput, System, TickContext, Transform, World};
use arena_shared::{EntityType, Outbox, ServerCommand, DEFAULT_SIZE};
use tracing::warn;

use crate::broadcast::announce_spawn;
use crate::prefabs;

/// Spawns a laser when fire is held and the cooldown has elapsed.
#[derive(Debug)]
pub struct LaserSpawnSystem {
    outbox: Outbox<ServerCommand>,
}

impl LaserSpawnSystem {
    /// Announces lasers through `outbox`.
    #[must_use]
    pub const fn new(outbox: Outbox<ServerCommand>) -> Self {
        Self { outbox }
    }
}

impl System for LaserSpawnSystem {
    fn name(&self) -> &'static str {
        "laser_spawn"
    }

    fn update(&mut self, world: &mut World, ctx: &mut TickContext, entity: Entity) {
        let id = entity.id;
        let (Some(transform), Some(true), Some(spawner)) = (
            world.get::<Transform>(id).copied(),
            world.get::<PlayerInput>(id).map(|input| input.is_fire),
            world.get_mut::<LaserSpawner>(id),
        ) else {
            return;
        };

        if !spawner.is_ready(ctx.now) {
            return;
        }
        spawner.last_fire_time = ctx.now;

        let owner_radius = world
            .get::<Collider>(id)
            .map_or(DEFAULT_SIZE.x, Collider::radius);
        let initial = prefabs::projectile(&transform, owner_radius, ctx.now);
        match world.create_entity(EntityType::Projectile, &initial, prefabs::SERVER_PROJECTILE) {
            Ok(laser) => announce_spawn(&self.outbox, laser, initial, None, ctx.now),
            Err(err) => warn!(shooter = %id, %err, "laser not spawned"),
        }
    }
}

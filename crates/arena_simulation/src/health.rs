//! Death handling.
//!
//! An entity whose health reaches zero is despawned. Asteroids break into
//! materials first, scattered around the impact point.

use arena_core::{Collider, Entity, EntityId, Health, System, TickContext, Transform, World};
use arena_shared::{EntityType, Millis, Outbox, ServerCommand, Vector2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::broadcast::{announce_spawn, despawn};
use crate::prefabs;

/// Despawns depleted entities and fragments asteroids.
#[derive(Debug)]
pub struct HealthSystem {
    outbox: Outbox<ServerCommand>,
    rng: ChaCha8Rng,
}

impl HealthSystem {
    /// Announces through `outbox`; fragment scatter comes from `seed`.
    #[must_use]
    pub fn new(outbox: Outbox<ServerCommand>, seed: u64) -> Self {
        Self {
            outbox,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Scatter velocity for one of `count` fragments, per axis in
    /// `[-5 * count, 5 * count)`.
    fn scatter(&mut self, count: u32) -> Vector2 {
        let spread = count as f32;
        Vector2::new(
            self.rng.gen::<f32>() * 10.0 * spread - 5.0 * spread,
            self.rng.gen::<f32>() * 10.0 * spread - 5.0 * spread,
        )
    }

    fn fragment(&mut self, world: &mut World, asteroid: EntityId, now: Millis) {
        let (Some(transform), Some(collider)) = (
            world.get::<Transform>(asteroid).copied(),
            world.get::<Collider>(asteroid).copied(),
        ) else {
            return;
        };

        let count = prefabs::fragment_count(collider.radius());
        debug!(%asteroid, count, "asteroid destroyed");

        for _ in 0..count {
            let initial = prefabs::material(transform.position, self.scatter(count));
            match world.create_entity(EntityType::Material, &initial, prefabs::SERVER_MATERIAL) {
                Ok(material) => announce_spawn(&self.outbox, material, initial, None, now),
                Err(err) => warn!(%asteroid, %err, "fragment not spawned"),
            }
        }
    }
}

impl System for HealthSystem {
    fn name(&self) -> &'static str {
        "health"
    }

    fn update(&mut self, world: &mut World, ctx: &mut TickContext, entity: Entity) {
        let depleted = world.get::<Health>(entity.id).is_some_and(Health::is_depleted);
        if !depleted {
            return;
        }

        match entity.kind {
            EntityType::Asteroid => self.fragment(world, entity.id, ctx.now),
            EntityType::Player => debug!(player = %entity.id, "player destroyed"),
            _ => {}
        }
        despawn(world, &self.outbox, entity.id, ctx.now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefabs::SERVER_ASTEROID;
    use arena_core::Ecs;
    use arena_shared::{InitialData, ServerMessage};

    fn rock(world: &mut World, radius: f32, health: f32) -> EntityId {
        let initial = InitialData {
            position: Some(Vector2::new(300.0, 300.0)),
            size: Some(Vector2::new(radius, radius)),
            health: Some(health),
            max_health: Some(radius),
            ..InitialData::default()
        };
        world.create_entity(EntityType::Asteroid, &initial, SERVER_ASTEROID).unwrap().id
    }

    #[test]
    fn test_healthy_entity_survives() {
        let mut world = World::default();
        let id = rock(&mut world, 40.0, 0.5);
        let (outbox, rx) = Outbox::channel();

        let mut ecs = Ecs::new(world).with_system(HealthSystem::new(outbox, 3));
        ecs.update(0.016, 0);

        assert!(ecs.world().entity(id).is_some());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_asteroid_fragments_on_death() {
        let mut world = World::default();
        let id = rock(&mut world, 45.0, 0.0);
        let (outbox, rx) = Outbox::channel();

        let mut ecs = Ecs::new(world).with_system(HealthSystem::new(outbox, 3));
        ecs.update(0.016, 2_000);

        assert!(ecs.world().is_entity_id_free(id));
        let materials: Vec<_> = ecs
            .world()
            .iter()
            .filter(|e| e.kind == EntityType::Material)
            .collect();
        assert_eq!(materials.len(), 2);

        let mut spawns = 0;
        let mut despawns = 0;
        for cmd in rx.try_iter() {
            match cmd {
                ServerCommand::Send {
                    message: ServerMessage::SpawnEntity(packet),
                    ..
                } => {
                    spawns += 1;
                    let velocity = packet.initial.velocity.unwrap();
                    assert!(velocity.x.abs() <= 10.0 && velocity.y.abs() <= 10.0);
                    assert_eq!(packet.initial.position, Some(Vector2::new(300.0, 300.0)));
                }
                ServerCommand::Send {
                    message: ServerMessage::DespawnEntity(packet),
                    ..
                } => {
                    despawns += 1;
                    assert_eq!(packet.entity_id, id.raw());
                }
                _ => {}
            }
        }
        assert_eq!((spawns, despawns), (2, 1));
    }

    #[test]
    fn test_small_asteroid_leaves_one_material() {
        let mut world = World::default();
        rock(&mut world, 20.0, -5.0);
        let (outbox, _rx) = Outbox::channel();

        let mut ecs = Ecs::new(world).with_system(HealthSystem::new(outbox, 9));
        ecs.update(0.016, 0);

        assert_eq!(ecs.world().alive_count(), 1);
        let survivor = ecs.world().iter().next().unwrap();
        assert_eq!(survivor.kind, EntityType::Material);
    }
}

//! # Trigger Resolution
//!
//! Overlap between an entity's trigger collider and another entity's solid
//! collider. Triggers never move anything; they dispatch on entity type:
//!
//! | Trigger owner | Other has | Effect |
//! |---|---|---|
//! | Material | Inventory | +1 material, material despawns |
//! | Projectile | Health | −damage, projectile despawns |
//! | Projectile | Inventory only | −1 material ejected as a new Material, projectile despawns |

use arena_core::{
    Collider, Entity, EntityId, Health, Inventory, RigidBody, System, TickContext, Transform,
    TriggerCollider, World,
};
use arena_shared::{EntityType, Millis, Outbox, ServerCommand, Vector2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};

use crate::broadcast::{announce_spawn, despawn};
use crate::collision::shapes_overlap;
use crate::prefabs;

/// Health removed by one laser hit.
pub const PROJECTILE_DAMAGE: f32 = 10.0;

/// Holders slower than this eject in a random direction.
pub const STATIONARY_SPEED: f32 = 1.0;

/// Speed of an ejected material.
pub const EJECT_SPEED: f32 = 200.0;

/// Maximum angular jitter of an ejected material, in radians.
pub const EJECT_JITTER: f32 = 0.5;

/// Gap between the holder's collider and the ejected material.
const EJECT_GAP: f32 = 15.0;

/// Detects trigger overlaps and applies their gameplay effects.
#[derive(Debug)]
pub struct TriggerSystem {
    outbox: Outbox<ServerCommand>,
    rng: ChaCha8Rng,
}

impl TriggerSystem {
    /// Announces effects through `outbox`; ejection jitter comes from `seed`.
    #[must_use]
    pub fn new(outbox: Outbox<ServerCommand>, seed: u64) -> Self {
        Self {
            outbox,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// First solid collider accepted by `wants` that overlaps the trigger of `id`.
    fn first_overlap(
        world: &World,
        id: EntityId,
        wants: impl Fn(&World, EntityId) -> bool,
    ) -> Option<Entity> {
        let trigger = world.get::<TriggerCollider>(id)?;
        let position = world.get::<Transform>(id)?.position;

        world.iter().filter(|other| other.id != id).find(|other| {
            if !wants(world, other.id) {
                return false;
            }
            let (Some(collider), Some(t)) = (
                world.get::<Collider>(other.id),
                world.get::<Transform>(other.id),
            ) else {
                return false;
            };
            shapes_overlap(
                trigger.shape,
                position,
                trigger.size,
                collider.shape,
                t.position,
                collider.size,
            )
        })
    }

    fn collect_material(&self, world: &mut World, material: EntityId, holder: EntityId, now: Millis) {
        let Some(inventory) = world.get_mut::<Inventory>(holder) else {
            return;
        };
        inventory.material_count += 1;
        debug!(%holder, count = inventory.material_count, "material collected");
        despawn(world, &self.outbox, material, now);
    }

    fn hit(&mut self, world: &mut World, projectile: EntityId, target: EntityId, now: Millis) {
        if let Some(health) = world.get_mut::<Health>(target) {
            health.current -= PROJECTILE_DAMAGE;
            debug!(%target, health = health.current, "projectile hit");
        } else {
            self.eject_material(world, target, now);
        }
        despawn(world, &self.outbox, projectile, now);
    }

    fn eject_material(&mut self, world: &mut World, holder: EntityId, now: Millis) {
        let Some(inventory) = world.get_mut::<Inventory>(holder) else {
            return;
        };
        if inventory.material_count == 0 {
            return;
        }
        inventory.material_count -= 1;

        let Some(position) = world.get::<Transform>(holder).map(|t| t.position) else {
            return;
        };
        let velocity = world
            .get::<RigidBody>(holder)
            .map_or(Vector2::ZERO, |b| b.velocity);
        let radius = world
            .get::<Collider>(holder)
            .map_or(prefabs::PLAYER_RADIUS, Collider::radius);

        let base = if velocity.length() < STATIONARY_SPEED {
            self.rng.gen_range(0.0..std::f32::consts::TAU)
        } else {
            (-velocity).angle()
        };
        let direction = Vector2::from_angle(base + self.rng.gen_range(-EJECT_JITTER..EJECT_JITTER));

        let initial = prefabs::material(
            position + direction * (radius + EJECT_GAP),
            direction * EJECT_SPEED,
        );
        match world.create_entity(EntityType::Material, &initial, prefabs::SERVER_MATERIAL) {
            Ok(material) => {
                debug!(%holder, material = %material.id, "material ejected");
                announce_spawn(&self.outbox, material, initial, None, now);
            }
            Err(err) => warn!(%holder, %err, "ejected material not spawned"),
        }
    }
}

impl System for TriggerSystem {
    fn name(&self) -> &'static str {
        "trigger"
    }

    fn update(&mut self, world: &mut World, ctx: &mut TickContext, entity: Entity) {
        if !entity.simulated() {
            return;
        }

        match entity.kind {
            EntityType::Material => {
                let holder = Self::first_overlap(world, entity.id, |w, other| {
                    w.get::<Inventory>(other).is_some()
                });
                if let Some(holder) = holder {
                    self.collect_material(world, entity.id, holder.id, ctx.now);
                }
            }
            EntityType::Projectile => {
                let target = Self::first_overlap(world, entity.id, |w, other| {
                    w.get::<Health>(other).is_some() || w.get::<Inventory>(other).is_some()
                });
                if let Some(target) = target {
                    self.hit(world, entity.id, target.id, ctx.now);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefabs::{SERVER_ASTEROID, SERVER_MATERIAL, SERVER_PLAYER, SERVER_PROJECTILE};
    use arena_core::Ecs;
    use arena_shared::InitialData;
    use crossbeam_channel::Receiver;

    fn at(x: f32, y: f32) -> InitialData {
        InitialData {
            position: Some(Vector2::new(x, y)),
            is_static: Some(false),
            ..InitialData::default()
        }
    }

    fn player(world: &mut World, x: f32, materials: u32) -> EntityId {
        let initial = InitialData {
            size: Some(Vector2::new(20.0, 20.0)),
            material_count: Some(materials),
            ..at(x, 100.0)
        };
        world.create_entity(EntityType::Player, &initial, SERVER_PLAYER).unwrap().id
    }

    fn laser_at(world: &mut World, x: f32) -> EntityId {
        let initial = InitialData {
            trigger_size: Some(Vector2::new(5.0, 30.0)),
            has_drag: Some(false),
            ..at(x, 100.0)
        };
        world.create_entity(EntityType::Projectile, &initial, SERVER_PROJECTILE).unwrap().id
    }

    fn run(world: World) -> (Ecs, Receiver<ServerCommand>) {
        let (outbox, rx) = Outbox::channel();
        let mut ecs = Ecs::new(world).with_system(TriggerSystem::new(outbox, 42));
        ecs.update(0.016, 1_000);
        (ecs, rx)
    }

    fn events(rx: &Receiver<ServerCommand>) -> Vec<&'static str> {
        rx.try_iter()
            .filter_map(|cmd| match cmd {
                ServerCommand::Send { message, .. } => Some(message.event_name()),
                ServerCommand::Disconnect(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_material_collected() {
        let mut world = World::default();
        let holder = player(&mut world, 100.0, 0);
        let initial = InitialData {
            trigger_size: Some(Vector2::new(5.0, 5.0)),
            ..at(110.0, 100.0)
        };
        let material = world.create_entity(EntityType::Material, &initial, SERVER_MATERIAL).unwrap().id;

        let (ecs, rx) = run(world);

        assert_eq!(ecs.world().get::<Inventory>(holder).unwrap().material_count, 1);
        assert!(ecs.world().is_entity_id_free(material));
        assert_eq!(events(&rx), vec!["despawnEntity"]);
    }

    #[test]
    fn test_projectile_damages_health() {
        let mut world = World::default();
        let initial = InitialData {
            size: Some(Vector2::new(40.0, 40.0)),
            health: Some(40.0),
            ..at(100.0, 100.0)
        };
        let rock = world.create_entity(EntityType::Asteroid, &initial, SERVER_ASTEROID).unwrap().id;
        let laser = laser_at(&mut world, 130.0);

        let (ecs, rx) = run(world);

        let health = ecs.world().get::<Health>(rock).unwrap();
        assert_eq!(health.current, 40.0 - PROJECTILE_DAMAGE);
        assert!(ecs.world().is_entity_id_free(laser));
        assert_eq!(events(&rx), vec!["despawnEntity"]);
    }

    #[test]
    fn test_projectile_ejects_material_from_holder() {
        let mut world = World::default();
        let holder = player(&mut world, 100.0, 3);
        let laser = laser_at(&mut world, 120.0);

        let (ecs, rx) = run(world);

        assert_eq!(ecs.world().get::<Inventory>(holder).unwrap().material_count, 2);
        assert!(ecs.world().is_entity_id_free(laser));
        let materials = ecs.world().iter().filter(|e| e.kind == EntityType::Material).count();
        assert_eq!(materials, 1);
        assert_eq!(events(&rx), vec!["spawnEntity", "despawnEntity"]);
    }

    #[test]
    fn test_projectile_against_empty_inventory() {
        let mut world = World::default();
        let holder = player(&mut world, 100.0, 0);
        let laser = laser_at(&mut world, 120.0);

        let (ecs, rx) = run(world);

        assert_eq!(ecs.world().get::<Inventory>(holder).unwrap().material_count, 0);
        assert!(ecs.world().is_entity_id_free(laser));
        assert_eq!(events(&rx), vec!["despawnEntity"]);
    }

    #[test]
    fn test_far_trigger_does_nothing() {
        let mut world = World::default();
        player(&mut world, 100.0, 1);
        laser_at(&mut world, 400.0);

        let (ecs, rx) = run(world);
        assert_eq!(ecs.world().alive_count(), 2);
        assert!(events(&rx).is_empty());
    }
}

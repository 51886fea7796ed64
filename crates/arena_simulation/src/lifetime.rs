//! Time-based expiry: short-lived entities and the session countdown.

use arena_core::{Entity, Lifetime, System, TickContext, Timer, World};
use arena_shared::{Outbox, ServerCommand};
use tracing::info;

use crate::broadcast::despawn;

/// Despawns entities whose [`Lifetime`] ran out.
#[derive(Debug)]
pub struct LifetimeSystem {
    outbox: Outbox<ServerCommand>,
}

impl LifetimeSystem {
    /// Announces despawns through `outbox`.
    #[must_use]
    pub const fn new(outbox: Outbox<ServerCommand>) -> Self {
        Self { outbox }
    }
}

impl System for LifetimeSystem {
    fn name(&self) -> &'static str {
        "lifetime"
    }

    fn update(&mut self, world: &mut World, ctx: &mut TickContext, entity: Entity) {
        let expired = world
            .get::<Lifetime>(entity.id)
            .is_some_and(|l| l.is_expired(ctx.now));
        if expired {
            despawn(world, &self.outbox, entity.id, ctx.now);
        }
    }
}

/// Ends the session when a [`Timer`] expires.
///
/// The timer entity itself is left alone; the session tears the world
/// down once it sees the request.
#[derive(Debug, Default)]
pub struct TimerEndGameSystem {
    announced: bool,
}

impl TimerEndGameSystem {
    /// Creates the system.
    #[must_use]
    pub const fn new() -> Self {
        Self { announced: false }
    }
}

impl System for TimerEndGameSystem {
    fn name(&self) -> &'static str {
        "timer_end_game"
    }

    fn update(&mut self, world: &mut World, ctx: &mut TickContext, entity: Entity) {
        let Some(timer) = world.get::<Timer>(entity.id) else {
            return;
        };
        if timer.is_expired(ctx.now) {
            if !self.announced {
                info!(timer = %entity.id, duration_ms = timer.duration, "game timer expired");
                self.announced = true;
            }
            ctx.request_end_game();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefabs::{self, SERVER_GAME_TIMER, SERVER_PROJECTILE};
    use arena_core::{Ecs, EntityId};
    use arena_shared::{EntityType, InitialData, ServerMessage};

    fn laser(world: &mut World, spawn_time: u64) -> EntityId {
        let initial = InitialData {
            spawn_time: Some(spawn_time),
            lifetime: Some(prefabs::LASER_LIFETIME_MS),
            ..InitialData::default()
        };
        world.create_entity(EntityType::Projectile, &initial, SERVER_PROJECTILE).unwrap().id
    }

    #[test]
    fn test_lifetime_expiry_is_strict() {
        let mut world = World::default();
        let id = laser(&mut world, 1_000);
        let (outbox, rx) = Outbox::channel();
        let mut ecs = Ecs::new(world).with_system(LifetimeSystem::new(outbox));

        // Exactly at the boundary the laser survives
        ecs.update(0.016, 3_000);
        assert!(ecs.world().entity(id).is_some());

        ecs.update(0.016, 3_001);
        assert!(ecs.world().is_entity_id_free(id));

        match rx.try_recv().unwrap() {
            ServerCommand::Send {
                message: ServerMessage::DespawnEntity(packet),
                ..
            } => {
                assert_eq!(packet.entity_id, id.raw());
                assert_eq!(packet.time, 3_001);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_timer_requests_end_without_despawn() {
        let mut world = World::default();
        let initial = prefabs::game_timer(0, 90_000);
        let timer = world
            .create_entity(EntityType::GameTimer, &initial, SERVER_GAME_TIMER)
            .unwrap()
            .id;
        let mut ecs = Ecs::new(world).with_system(TimerEndGameSystem::new());

        assert!(!ecs.update(0.016, 90_000).end_game_requested);
        assert!(ecs.update(0.016, 90_001).end_game_requested);
        assert!(ecs.world().entity(timer).is_some());
    }
}

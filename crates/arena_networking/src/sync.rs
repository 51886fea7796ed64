//! # State Sync Systems
//!
//! Fixed-rate broadcasters. Each owns a [`SyncGate`]: dt accumulates in
//! `pre_update`, the gate stays open for the whole entity pass once the
//! interval elapsed, and closes in `post_update`.
//!
//! | System | Direction | Default rate |
//! |---|---|---|
//! | transform | server → all | 30 Hz |
//! | health | server → all | 2 Hz |
//! | inventory | server → all | 2 Hz |
//! | timer | server → all | 1 Hz |
//! | input | client → server | 30 Hz |

use std::fmt;

use arena_core::{
    Entity, Health, Inventory, LocalPlayer, PlayerInput, SyncGate, System, TickContext, Timer,
    Transform, World,
};
use arena_shared::{
    ClientMessage, Millis, Outbox, PlayerInputPacket, ServerCommand, ServerMessage,
    SyncHealthPacket, SyncInventoryPacket, SyncTimerPacket, SyncTransformPacket,
};

/// Seconds between transform broadcasts.
pub const TRANSFORM_SYNC_INTERVAL: f32 = 1.0 / 30.0;
/// Seconds between health broadcasts.
pub const HEALTH_SYNC_INTERVAL: f32 = 0.5;
/// Seconds between inventory broadcasts.
pub const INVENTORY_SYNC_INTERVAL: f32 = 0.5;
/// Seconds between timer broadcasts.
pub const TIMER_SYNC_INTERVAL: f32 = 1.0;
/// Seconds between local input uploads.
pub const INPUT_SYNC_INTERVAL: f32 = 1.0 / 30.0;

type Capture = fn(&World, Entity, Millis) -> Option<ServerMessage>;

/// Broadcasts one kind of entity state at a fixed rate.
pub struct SyncSystem {
    name: &'static str,
    gate: SyncGate,
    outbox: Outbox<ServerCommand>,
    capture: Capture,
}

impl SyncSystem {
    fn new(name: &'static str, interval: f32, outbox: Outbox<ServerCommand>, capture: Capture) -> Self {
        Self {
            name,
            gate: SyncGate::new(interval),
            outbox,
            capture,
        }
    }

    /// `syncTransform` for every entity with a [`Transform`].
    #[must_use]
    pub fn transform(outbox: Outbox<ServerCommand>, interval: f32) -> Self {
        Self::new("transform_sync", interval, outbox, |world, entity, now| {
            let t = world.get::<Transform>(entity.id)?;
            Some(ServerMessage::SyncTransform(SyncTransformPacket {
                entity_id: entity.id.raw(),
                position: t.position,
                rotation: t.rotation,
                time: now,
            }))
        })
    }

    /// `syncHealth` for every entity with [`Health`].
    #[must_use]
    pub fn health(outbox: Outbox<ServerCommand>, interval: f32) -> Self {
        Self::new("health_sync", interval, outbox, |world, entity, now| {
            let health = world.get::<Health>(entity.id)?;
            Some(ServerMessage::SyncHealth(SyncHealthPacket {
                entity_id: entity.id.raw(),
                health: health.current,
                time: now,
            }))
        })
    }

    /// `syncInventory` for every entity with an [`Inventory`].
    #[must_use]
    pub fn inventory(outbox: Outbox<ServerCommand>, interval: f32) -> Self {
        Self::new("inventory_sync", interval, outbox, |world, entity, now| {
            let inventory = world.get::<Inventory>(entity.id)?;
            Some(ServerMessage::SyncInventory(SyncInventoryPacket {
                entity_id: entity.id.raw(),
                material_count: inventory.material_count,
                time: now,
            }))
        })
    }

    /// `syncTimer` for every entity with a [`Timer`].
    #[must_use]
    pub fn timer(outbox: Outbox<ServerCommand>, interval: f32) -> Self {
        Self::new("timer_sync", interval, outbox, |world, entity, now| {
            let timer = world.get::<Timer>(entity.id)?;
            Some(ServerMessage::SyncTimer(SyncTimerPacket {
                entity_id: entity.id.raw(),
                timer_start: timer.start,
                timer_duration: timer.duration,
                time: now,
            }))
        })
    }
}

impl fmt::Debug for SyncSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncSystem")
            .field("name", &self.name)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl System for SyncSystem {
    fn name(&self) -> &'static str {
        self.name
    }

    fn pre_update(&mut self, ctx: &TickContext) {
        self.gate.accumulate(ctx.dt);
    }

    fn update(&mut self, world: &mut World, ctx: &mut TickContext, entity: Entity) {
        if !self.gate.is_open() {
            return;
        }
        if let Some(message) = (self.capture)(world, entity, ctx.now) {
            self.outbox.broadcast(message);
        }
    }

    fn post_update(&mut self, _ctx: &TickContext) {
        self.gate.reset();
    }
}

/// Uploads the local player's intent to the server.
#[derive(Debug)]
pub struct InputSyncSystem {
    gate: SyncGate,
    outbox: Outbox<ClientMessage>,
}

impl InputSyncSystem {
    /// Sends `playerInput` through `outbox` every `interval` seconds.
    #[must_use]
    pub const fn new(outbox: Outbox<ClientMessage>, interval: f32) -> Self {
        Self {
            gate: SyncGate::new(interval),
            outbox,
        }
    }
}

impl System for InputSyncSystem {
    fn name(&self) -> &'static str {
        "input_sync"
    }

    fn pre_update(&mut self, ctx: &TickContext) {
        self.gate.accumulate(ctx.dt);
    }

    fn update(&mut self, world: &mut World, ctx: &mut TickContext, entity: Entity) {
        if !self.gate.is_open() {
            return;
        }
        let is_local = world.get::<LocalPlayer>(entity.id).is_some_and(|l| l.is_local);
        let Some(input) = world.get::<PlayerInput>(entity.id).filter(|_| is_local) else {
            return;
        };

        self.outbox.emit(ClientMessage::PlayerInput(PlayerInputPacket {
            entity_id: entity.id.raw(),
            move_input: input.move_input,
            look_rot: input.look_rotation,
            is_fire: input.is_fire,
            time: ctx.now,
        }));
    }

    fn post_update(&mut self, _ctx: &TickContext) {
        self.gate.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{ComponentMask, ComponentType, Ecs};
    use arena_shared::{EntityType, InitialData, Vector2};

    fn mover(world: &mut World) {
        let initial = InitialData {
            position: Some(Vector2::new(3.0, 4.0)),
            health: Some(12.0),
            ..InitialData::default()
        };
        world.create_entity(
            EntityType::Asteroid,
            &initial,
            ComponentMask::of(&[ComponentType::Transform, ComponentType::Health]),
        )
        .unwrap();
    }

    #[test]
    fn test_transform_sync_respects_interval() {
        let mut world = World::default();
        mover(&mut world);
        let (outbox, rx) = Outbox::channel();
        let mut ecs = Ecs::new(world).with_system(SyncSystem::transform(outbox, 0.1));

        ecs.update(0.06, 60);
        assert_eq!(rx.try_iter().count(), 0);

        ecs.update(0.06, 120);
        let sent: Vec<_> = rx.try_iter().collect();
        assert_eq!(sent.len(), 1);
        assert!(matches!(
            &sent[0],
            ServerCommand::Send {
                message: ServerMessage::SyncTransform(p),
                ..
            } if p.position == Vector2::new(3.0, 4.0) && p.time == 120
        ));

        // Gate restarted after firing
        ecs.update(0.06, 180);
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_health_sync_skips_entities_without_health() {
        let mut world = World::default();
        mover(&mut world);
        world.create_entity(
            EntityType::Material,
            &InitialData::default(),
            ComponentMask::of(&[ComponentType::Transform]),
        )
        .unwrap();
        let (outbox, rx) = Outbox::channel();
        let mut ecs = Ecs::new(world).with_system(SyncSystem::health(outbox, HEALTH_SYNC_INTERVAL));

        ecs.update(0.5, 500);
        let sent: Vec<_> = rx.try_iter().collect();
        assert_eq!(sent.len(), 1);
        assert_eq!(ecs.system_names(), vec!["health_sync"]);
    }

    #[test]
    fn test_input_sync_only_for_local_player() {
        let mut world = World::default();
        let input_mask = ComponentMask::of(&[
            ComponentType::PlayerInput,
            ComponentType::LocalPlayer,
        ]);
        let local = InitialData {
            is_local_player: Some(true),
            move_input: Some(Vector2::new(1.0, 0.0)),
            ..InitialData::default()
        };
        let local_id = world.create_entity(EntityType::Player, &local, input_mask).unwrap().id;
        world
            .create_entity(EntityType::Player, &InitialData::default(), input_mask)
            .unwrap();

        let (outbox, rx) = Outbox::channel();
        let mut ecs = Ecs::new(world).with_system(InputSyncSystem::new(outbox, INPUT_SYNC_INTERVAL));
        ecs.update(0.05, 1_050);

        let sent: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            sent,
            vec![ClientMessage::PlayerInput(PlayerInputPacket {
                entity_id: local_id.raw(),
                move_input: Vector2::new(1.0, 0.0),
                look_rot: 0.0,
                is_fire: false,
                time: 1_050,
            })]
        );
    }
}

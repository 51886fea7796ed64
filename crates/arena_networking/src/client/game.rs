//! Client mirror of one match.

use std::collections::HashMap;

use arena_core::{
    Ecs, EntityId, Health, Inventory, Lifetime, PlayerInput, SimulationAuthority, TickReport,
    Timer, Transform, TransformSnapshot, TransformSync, World,
};
use arena_shared::{
    Bounds, ClientMessage, EntityType, Millis, Outbox, ServerMessage, SpawnEntityPacket, Vector2,
};
use arena_simulation::prefabs::{self, LASER_FLASH_WINDOW_MS};
use arena_simulation::{BoundsSystem, CollisionSystem, PhysicsSystem, PlayerInputHandlerSystem};
use tracing::{debug, trace};

use crate::error::{ProtocolError, ProtocolResult};
use crate::interpolation::{TransformSmoothingSystem, NETWORK_DELAY_MS};
use crate::prediction::ClientPredictionSystem;
use crate::sync::{InputSyncSystem, INPUT_SYNC_INTERVAL};

/// The client's ECS plus what the renderer needs beside it.
pub struct ClientGame {
    ecs: Ecs,
    local_player: Option<EntityId>,
    outlines: HashMap<EntityId, Vec<Vector2>>,
}

impl ClientGame {
    /// An empty world whose input uploads go through `outbox`.
    #[must_use]
    pub fn new(outbox: Outbox<ClientMessage>, arena: Bounds) -> Self {
        let ecs = Ecs::new(World::new(SimulationAuthority::Interpolated))
            .with_system(InputSyncSystem::new(outbox, INPUT_SYNC_INTERVAL))
            .with_system(PlayerInputHandlerSystem)
            .with_system(PhysicsSystem)
            .with_system(CollisionSystem)
            .with_system(BoundsSystem::new(arena))
            .with_system(TransformSmoothingSystem::new(NETWORK_DELAY_MS))
            .with_system(ClientPredictionSystem::default());

        Self {
            ecs,
            local_player: None,
            outlines: HashMap::new(),
        }
    }

    /// Applies one in-game server message.
    ///
    /// Stale references (despawns and syncs for ids that are gone) are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] for a spawn that cannot be built. Only that
    /// spawn is rejected.
    pub fn handle(&mut self, message: ServerMessage) -> ProtocolResult<()> {
        let world = self.ecs.world_mut();
        match message {
            ServerMessage::AssignPlayerId(id) => {
                debug!(player = id, "local player assigned");
                self.local_player = Some(EntityId(id));
            }
            ServerMessage::SpawnEntity(packet) => return self.spawn(packet),
            ServerMessage::DespawnEntity(packet) => {
                let id = EntityId(packet.entity_id);
                match world.destroy_entity_by_id(id) {
                    Ok(entity) => debug!(entity = %id, kind = ?entity.kind, "despawned"),
                    Err(err) => trace!(%err, "stale despawn"),
                }
                self.outlines.remove(&id);
            }
            ServerMessage::SyncTransform(packet) => {
                let id = EntityId(packet.entity_id);
                match world.get_mut::<TransformSync>(id) {
                    Some(sync) => sync.receive(TransformSnapshot {
                        time: packet.time,
                        position: packet.position,
                        rotation: packet.rotation,
                    }),
                    None => trace!(entity = %id, "stale transform sync"),
                }
            }
            ServerMessage::SyncHealth(packet) => {
                let id = EntityId(packet.entity_id);
                match world.get_mut::<Health>(id) {
                    Some(health) => health.current = packet.health,
                    None => trace!(entity = %id, "stale health sync"),
                }
            }
            ServerMessage::SyncInventory(packet) => {
                let id = EntityId(packet.entity_id);
                match world.get_mut::<Inventory>(id) {
                    Some(inventory) => inventory.material_count = packet.material_count,
                    None => trace!(entity = %id, "stale inventory sync"),
                }
            }
            ServerMessage::SyncTimer(packet) => {
                let id = EntityId(packet.entity_id);
                match world.get_mut::<Timer>(id) {
                    Some(timer) => {
                        timer.start = packet.timer_start;
                        timer.duration = packet.timer_duration;
                    }
                    None => trace!(entity = %id, "stale timer sync"),
                }
            }
            other => trace!(event = other.event_name(), "not a game message"),
        }
        Ok(())
    }

    fn spawn(&mut self, packet: SpawnEntityPacket) -> ProtocolResult<()> {
        let id = EntityId(packet.entity_id);
        if !self.ecs.world().is_entity_id_free(id) {
            trace!(entity = %id, "duplicate spawn");
            return Ok(());
        }

        let outline = packet.other_data.map(|data| data.points).unwrap_or_default();
        if packet.entity_type == EntityType::Asteroid
            && (packet.initial.size.is_none() || outline.is_empty())
        {
            return Err(ProtocolError::MissingAsteroidShape(packet.entity_id));
        }

        let is_local =
            packet.entity_type == EntityType::Player && self.local_player == Some(id);
        let mut initial = packet.initial;
        if is_local {
            initial.is_local_player = Some(true);
        }

        let world = self.ecs.world_mut();
        let entity = world.spawn_with_id(
            id,
            packet.entity_type,
            &initial,
            prefabs::client_components(packet.entity_type, is_local),
        )?;
        if is_local {
            world.set_authority(id, SimulationAuthority::PredictedLocal)?;
        }

        if let Some(lifetime) = world.get_mut::<Lifetime>(id) {
            *lifetime = lifetime.with_flash_window(LASER_FLASH_WINDOW_MS);
        }
        let transform = world.get::<Transform>(id).copied();
        if let (Some(transform), Some(sync)) = (transform, world.get_mut::<TransformSync>(id)) {
            sync.receive(TransformSnapshot::capture(&transform, packet.time));
        }
        if !outline.is_empty() {
            self.outlines.insert(id, outline);
        }

        debug!(entity = %id, kind = ?entity.kind, is_local, "spawned");
        Ok(())
    }

    /// Sets the local player's intent for the next ticks.
    pub fn set_local_input(&mut self, move_input: Vector2, look_rotation: f32, is_fire: bool) {
        let Some(id) = self.local_player else {
            return;
        };
        if let Some(input) = self.ecs.world_mut().get_mut::<PlayerInput>(id) {
            input.move_input = move_input;
            input.look_rotation = look_rotation;
            input.is_fire = is_fire;
        }
    }

    /// Runs one client tick.
    pub fn update(&mut self, dt: f32, now: Millis) -> TickReport {
        self.ecs.update(dt, now)
    }

    /// The entity this client controls, once assigned.
    #[must_use]
    pub const fn local_player(&self) -> Option<EntityId> {
        self.local_player
    }

    /// Outline of an asteroid.
    #[must_use]
    pub fn outline(&self, id: EntityId) -> Option<&[Vector2]> {
        self.outlines.get(&id).map(Vec::as_slice)
    }

    /// The world, for rendering.
    #[must_use]
    pub const fn world(&self) -> &World {
        self.ecs.world()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_shared::{
        EntityPacket, InitialData, OtherData, SyncHealthPacket, SyncTransformPacket,
    };

    fn game() -> (ClientGame, crossbeam_channel::Receiver<ClientMessage>) {
        let (outbox, rx) = Outbox::channel();
        (ClientGame::new(outbox, Bounds::default()), rx)
    }

    fn spawn(id: u32, kind: EntityType, initial: InitialData) -> ServerMessage {
        ServerMessage::SpawnEntity(SpawnEntityPacket {
            entity_id: id,
            entity_type: kind,
            time: 1_000,
            initial,
            other_data: None,
        })
    }

    fn at(x: f32, y: f32) -> InitialData {
        InitialData {
            position: Some(Vector2::new(x, y)),
            ..InitialData::default()
        }
    }

    #[test]
    fn test_spawn_is_idempotent() {
        let (mut game, _rx) = game();
        game.handle(spawn(3, EntityType::Material, at(10.0, 10.0))).unwrap();
        game.handle(spawn(3, EntityType::Material, at(99.0, 99.0))).unwrap();

        assert_eq!(game.world().alive_count(), 1);
        let transform = game.world().get::<Transform>(EntityId(3)).unwrap();
        assert_eq!(transform.position, Vector2::new(10.0, 10.0));
    }

    #[test]
    fn test_asteroid_without_outline_rejected() {
        let (mut game, _rx) = game();
        let mut initial = at(100.0, 100.0);
        initial.size = Some(Vector2::new(40.0, 40.0));

        let result = game.handle(spawn(0, EntityType::Asteroid, initial.clone()));
        assert_eq!(result, Err(ProtocolError::MissingAsteroidShape(0)));
        assert!(game.world().is_entity_id_free(EntityId(0)));

        let outline = vec![Vector2::new(20.0, 0.0), Vector2::new(0.0, 20.0), Vector2::new(-20.0, 0.0)];
        game.handle(ServerMessage::SpawnEntity(SpawnEntityPacket {
            entity_id: 0,
            entity_type: EntityType::Asteroid,
            time: 1_000,
            initial,
            other_data: Some(OtherData { points: outline }),
        }))
        .unwrap();
        assert_eq!(game.outline(EntityId(0)).map(<[Vector2]>::len), Some(3));
    }

    #[test]
    fn test_local_player_is_predicted() {
        let (mut game, _rx) = game();
        game.handle(ServerMessage::AssignPlayerId(1)).unwrap();
        game.handle(spawn(0, EntityType::Player, at(10.0, 10.0))).unwrap();
        game.handle(spawn(1, EntityType::Player, at(50.0, 50.0))).unwrap();

        let world = game.world();
        let remote = world.entity(EntityId(0)).unwrap();
        let local = world.entity(EntityId(1)).unwrap();
        assert_eq!(remote.authority, SimulationAuthority::Interpolated);
        assert_eq!(local.authority, SimulationAuthority::PredictedLocal);
        assert!(world.get::<PlayerInput>(EntityId(0)).is_none());
        assert!(world.get::<PlayerInput>(EntityId(1)).is_some());
    }

    #[test]
    fn test_stale_packets_ignored() {
        let (mut game, _rx) = game();
        game.handle(ServerMessage::DespawnEntity(EntityPacket { entity_id: 9, time: 0 }))
            .unwrap();
        game.handle(ServerMessage::SyncHealth(SyncHealthPacket {
            entity_id: 9,
            health: 1.0,
            time: 0,
        }))
        .unwrap();
        game.handle(ServerMessage::SyncTransform(SyncTransformPacket {
            entity_id: 9,
            position: Vector2::ZERO,
            rotation: 0.0,
            time: 0,
        }))
        .unwrap();
        assert_eq!(game.world().alive_count(), 0);
    }

    #[test]
    fn test_laser_spawn_gets_flash_window() {
        let (mut game, _rx) = game();
        let initial = prefabs::projectile(&Transform::default(), 20.0, 1_000);
        game.handle(spawn(4, EntityType::Projectile, initial)).unwrap();

        let lifetime = game.world().get::<Lifetime>(EntityId(4)).unwrap();
        assert!(lifetime.is_flashing(2_900));
        assert!(!lifetime.is_flashing(2_000));
    }

    #[test]
    fn test_local_input_uploaded() {
        let (mut game, rx) = game();
        game.handle(ServerMessage::AssignPlayerId(0)).unwrap();
        game.handle(spawn(0, EntityType::Player, at(100.0, 100.0))).unwrap();

        game.set_local_input(Vector2::new(1.0, 0.0), 0.5, true);
        game.update(0.05, 1_050);

        match rx.try_recv().unwrap() {
            ClientMessage::PlayerInput(packet) => {
                assert_eq!(packet.entity_id, 0);
                assert!(packet.is_fire);
                assert_eq!(packet.time, 1_050);
            }
        }
    }
}

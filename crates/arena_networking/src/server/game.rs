//! One running match: the ECS, its systems and the socket → player map.

use std::collections::HashMap;

use arena_core::{
    Ecs, Entity, EntityId, Inventory, PlayerInput, SimulationAuthority, TickReport, World,
};
use arena_shared::{
    Bounds, EntityType, InitialData, Millis, Outbox, PlayerInputPacket, ReportEntry, ServerCommand,
    ServerMessage, SocketId,
};
use arena_simulation::broadcast::announce_spawn;
use arena_simulation::{
    prefabs, BoundsSystem, CollisionSystem, HealthSystem, LaserSpawnSystem, LifetimeSystem,
    PhysicsSystem, PlayerInputHandlerSystem, TimerEndGameSystem, TriggerSystem,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace, warn};

use super::config::ServerConfig;
use super::tick::TickDriver;
use crate::sync::{
    SyncSystem, HEALTH_SYNC_INTERVAL, INVENTORY_SYNC_INTERVAL, TIMER_SYNC_INTERVAL,
    TRANSFORM_SYNC_INTERVAL,
};

/// Authoritative state of one match.
pub struct ServerGame {
    ecs: Ecs,
    players: HashMap<SocketId, EntityId>,
    driver: TickDriver,
    outbox: Outbox<ServerCommand>,
    rng: ChaCha8Rng,
}

impl ServerGame {
    /// Builds the world and announces every initial entity.
    ///
    /// Each socket gets `assignPlayerId` before its player's spawn is
    /// broadcast, so clients can recognise their own ship.
    #[must_use]
    pub fn new(
        config: &ServerConfig,
        sockets: &[SocketId],
        outbox: Outbox<ServerCommand>,
        seed: u64,
        now: Millis,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let ecs = Self::build_ecs(config, &outbox, &mut rng);

        let mut game = Self {
            ecs,
            players: HashMap::with_capacity(sockets.len()),
            driver: TickDriver::new(config.tick_period(), now),
            outbox,
            rng,
        };

        for &socket in sockets {
            game.spawn_player(socket, &config.arena, now);
        }
        for _ in 0..config.asteroid_count {
            game.spawn_asteroid(&config.arena, now);
        }
        game.spawn_game_timer(config.game_duration_ms, now);

        game
    }

    /// Server system order. Less important sync systems run last.
    fn build_ecs(config: &ServerConfig, outbox: &Outbox<ServerCommand>, rng: &mut ChaCha8Rng) -> Ecs {
        Ecs::new(World::new(SimulationAuthority::Authoritative))
            .with_system(PlayerInputHandlerSystem)
            .with_system(LaserSpawnSystem::new(outbox.clone()))
            .with_system(PhysicsSystem)
            .with_system(CollisionSystem)
            .with_system(TriggerSystem::new(outbox.clone(), rng.gen()))
            .with_system(SyncSystem::transform(outbox.clone(), TRANSFORM_SYNC_INTERVAL))
            .with_system(BoundsSystem::new(config.arena))
            .with_system(HealthSystem::new(outbox.clone(), rng.gen()))
            .with_system(TimerEndGameSystem::new())
            .with_system(SyncSystem::health(outbox.clone(), HEALTH_SYNC_INTERVAL))
            .with_system(SyncSystem::inventory(outbox.clone(), INVENTORY_SYNC_INTERVAL))
            .with_system(SyncSystem::timer(outbox.clone(), TIMER_SYNC_INTERVAL))
            .with_system(LifetimeSystem::new(outbox.clone()))
    }

    /// Creates an entity of `kind` with its server component set.
    fn create(&mut self, kind: EntityType, initial: &InitialData) -> Option<Entity> {
        match self
            .ecs
            .world_mut()
            .create_entity(kind, initial, prefabs::server_components(kind))
        {
            Ok(entity) => Some(entity),
            Err(err) => {
                warn!(?kind, %err, "spawn failed");
                None
            }
        }
    }

    fn spawn_player(&mut self, socket: SocketId, arena: &Bounds, now: Millis) {
        let initial = prefabs::player(&mut self.rng, arena);
        let Some(player) = self.create(EntityType::Player, &initial) else {
            return;
        };

        self.outbox
            .send_to(socket, ServerMessage::AssignPlayerId(player.id.raw()));
        announce_spawn(&self.outbox, player, initial, None, now);
        self.players.insert(socket, player.id);
        debug!(%socket, player = %player.id, "player assigned");
    }

    fn spawn_asteroid(&mut self, arena: &Bounds, now: Millis) {
        let (initial, outline) = prefabs::asteroid(&mut self.rng, arena);
        if let Some(asteroid) = self.create(EntityType::Asteroid, &initial) {
            announce_spawn(&self.outbox, asteroid, initial, Some(outline), now);
        }
    }

    fn spawn_game_timer(&mut self, duration: Millis, now: Millis) {
        let initial = prefabs::game_timer(now, duration);
        if let Some(timer) = self.create(EntityType::GameTimer, &initial) {
            announce_spawn(&self.outbox, timer, initial, None, now);
        }
    }

    /// Writes a client's intent into its player.
    ///
    /// Unknown sockets and despawned players are ignored. The entity id in
    /// the packet is not trusted; the socket decides which player moves.
    pub fn on_player_input(&mut self, socket: SocketId, packet: &PlayerInputPacket) {
        let Some(&id) = self.players.get(&socket) else {
            trace!(%socket, "input from socket without a player");
            return;
        };
        let Some(input) = self.ecs.world_mut().get_mut::<PlayerInput>(id) else {
            trace!(%socket, player = %id, "input for missing player");
            return;
        };

        input.move_input = packet.move_input;
        input.look_rotation = packet.look_rot;
        input.is_fire = packet.is_fire;
    }

    /// Forgets a disconnected socket. Its ship stays in the world.
    pub fn remove_socket(&mut self, socket: SocketId) -> Option<EntityId> {
        self.players.remove(&socket)
    }

    /// Runs one tick at `now`.
    pub fn tick(&mut self, now: Millis) -> TickReport {
        let dt = self.driver.begin_tick(now);
        self.ecs.update(dt, now)
    }

    /// Final score of every player still in the world.
    #[must_use]
    pub fn after_game_report(&self) -> Vec<ReportEntry> {
        let world = self.ecs.world();
        world
            .iter()
            .filter(|e| e.kind == EntityType::Player)
            .filter_map(|e| {
                let inventory = world.get::<Inventory>(e.id)?;
                Some(ReportEntry {
                    entity_id: e.id.raw(),
                    score: inventory.material_count,
                })
            })
            .collect()
    }

    /// Player entity controlled by `socket`.
    #[must_use]
    pub fn player_of(&self, socket: SocketId) -> Option<EntityId> {
        self.players.get(&socket).copied()
    }

    /// The ECS, for inspection.
    #[must_use]
    pub const fn ecs(&self) -> &Ecs {
        &self.ecs
    }

    /// The ECS, for embedders that place entities outside the systems.
    pub fn ecs_mut(&mut self) -> &mut Ecs {
        &mut self.ecs
    }

    /// The tick driver.
    #[must_use]
    pub const fn driver(&self) -> &TickDriver {
        &self.driver
    }
}

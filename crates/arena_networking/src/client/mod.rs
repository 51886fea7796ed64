//! # Client Engine
//!
//! Follows the session from the client side and owns the mirrored game
//! while one is running.
//!
//! ```text
//! Connecting ──WAITING──▶ Lobby ──START_GAME──▶ Game ──END_GAME──▶ Lobby
//!      └──────────────── disconnect (any state) ────────────▶ Disconnected
//! ```
//!
//! `INITIALIZE_GAME` builds a fresh [`ClientGame`] so the spawns that
//! follow it have a world to land in.

mod game;

pub use game::ClientGame;

use arena_core::TickReport;
use arena_shared::{Bounds, ClientMessage, Millis, Outbox, ReportEntry, ServerMessage, Vector2};
use tracing::{info, trace, warn};

/// Where the client is in the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClientState {
    /// Connected, nothing heard yet.
    #[default]
    Connecting,
    /// Waiting for players, or between games.
    Lobby,
    /// A game is running.
    Game,
    /// The transport closed.
    Disconnected,
}

/// Dispatches server messages and ticks the client game.
pub struct ClientEngine {
    outbox: Outbox<ClientMessage>,
    arena: Bounds,
    state: ClientState,
    game: Option<ClientGame>,
    waiting_for: u32,
    last_report: Vec<ReportEntry>,
}

impl ClientEngine {
    /// A client whose uploads go through `outbox`.
    #[must_use]
    pub fn new(outbox: Outbox<ClientMessage>, arena: Bounds) -> Self {
        Self {
            outbox,
            arena,
            state: ClientState::Connecting,
            game: None,
            waiting_for: 0,
            last_report: Vec::new(),
        }
    }

    /// Applies one server message. Protocol errors are logged and dropped.
    pub fn handle(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::WaitingForPlayers(missing) => {
                info!(missing, "waiting for players");
                self.waiting_for = missing;
                self.state = ClientState::Lobby;
            }
            ServerMessage::FullServer => info!("server is full"),
            ServerMessage::InitializeGame => {
                info!("initializing game");
                self.game = Some(ClientGame::new(self.outbox.clone(), self.arena));
            }
            ServerMessage::StartGame => {
                info!("game started");
                self.state = ClientState::Game;
            }
            ServerMessage::EndGame => {
                info!("game ended");
                self.game = None;
                self.state = ClientState::Lobby;
            }
            ServerMessage::AfterGameReport(report) => self.last_report = report,
            other => match self.game.as_mut() {
                Some(game) => {
                    let event = other.event_name();
                    if let Err(err) = game.handle(other) {
                        warn!(event, %err, "rejected server message");
                    }
                }
                None => trace!(event = other.event_name(), "game message outside a game"),
            },
        }
    }

    /// The transport closed.
    pub fn on_disconnect(&mut self) {
        info!("disconnected");
        self.game = None;
        self.state = ClientState::Disconnected;
    }

    /// Forwards the embedder's input to the local player.
    pub fn set_local_input(&mut self, move_input: Vector2, look_rotation: f32, is_fire: bool) {
        if let Some(game) = self.game.as_mut() {
            game.set_local_input(move_input, look_rotation, is_fire);
        }
    }

    /// Ticks the game, if one exists.
    pub fn update(&mut self, dt: f32, now: Millis) -> Option<TickReport> {
        self.game.as_mut().map(|game| game.update(dt, now))
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ClientState {
        self.state
    }

    /// The mirrored game, if any.
    #[must_use]
    pub const fn game(&self) -> Option<&ClientGame> {
        self.game.as_ref()
    }

    /// Players still missing, as last announced.
    #[must_use]
    pub const fn waiting_for(&self) -> u32 {
        self.waiting_for
    }

    /// Scores from the last finished game.
    #[must_use]
    pub fn last_report(&self) -> &[ReportEntry] {
        &self.last_report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_shared::{EntityType, InitialData, SpawnEntityPacket};

    fn engine() -> ClientEngine {
        let (outbox, _rx) = Outbox::channel();
        ClientEngine::new(outbox, Bounds::default())
    }

    #[test]
    fn test_lifecycle() {
        let mut engine = engine();
        assert_eq!(engine.state(), ClientState::Connecting);

        engine.handle(ServerMessage::WaitingForPlayers(1));
        assert_eq!(engine.state(), ClientState::Lobby);
        assert_eq!(engine.waiting_for(), 1);

        engine.handle(ServerMessage::InitializeGame);
        assert!(engine.game().is_some());
        engine.handle(ServerMessage::StartGame);
        assert_eq!(engine.state(), ClientState::Game);

        engine.handle(ServerMessage::AfterGameReport(vec![ReportEntry {
            entity_id: 0,
            score: 4,
        }]));
        engine.handle(ServerMessage::EndGame);
        assert_eq!(engine.state(), ClientState::Lobby);
        assert!(engine.game().is_none());
        assert_eq!(engine.last_report()[0].score, 4);

        engine.on_disconnect();
        assert_eq!(engine.state(), ClientState::Disconnected);
    }

    #[test]
    fn test_bad_spawn_does_not_stop_game() {
        let mut engine = engine();
        engine.handle(ServerMessage::InitializeGame);
        engine.handle(ServerMessage::SpawnEntity(SpawnEntityPacket {
            entity_id: 0,
            entity_type: EntityType::Asteroid,
            time: 0,
            initial: InitialData::default(),
            other_data: None,
        }));
        engine.handle(ServerMessage::SpawnEntity(SpawnEntityPacket {
            entity_id: 1,
            entity_type: EntityType::Material,
            time: 0,
            initial: InitialData::default(),
            other_data: None,
        }));

        let world = engine.game().unwrap().world();
        assert_eq!(world.alive_count(), 1);
        assert!(engine.update(0.016, 16).is_some());
    }

    #[test]
    fn test_game_messages_ignored_in_lobby() {
        let mut engine = engine();
        engine.handle(ServerMessage::AssignPlayerId(0));
        assert!(engine.game().is_none());
        assert!(engine.update(0.016, 16).is_none());
    }
}

//! # Session State Machine
//!
//! ```text
//!            connect (< max)            connect (== max)
//!   Lobby ───────────────────▶ Waiting ──────────────────▶ GameActive
//!     ▲                          │  ▲                          │
//!     │    last socket leaves    │  │ disconnect (> 0 left)    │ timer expired
//!     └──────────────────────────┘  └──                        │ or player left
//!     ▲                                                        ▼
//!     └──────────────────────────────────────────────────── GameEnded
//! ```
//!
//! A connection beyond `max_players` is told `FULL_SERVER` and dropped.
//! The game and its tick driver exist only while the state is
//! [`SessionState::GameActive`].

use std::collections::BTreeSet;

use arena_core::TickReport;
use arena_shared::{
    ClientMessage, Outbox, PlayerInputPacket, ServerCommand, ServerMessage, SocketId,
};
use tracing::{info, trace};

use super::clock::{Clock, SystemClock};
use super::config::ServerConfig;
use super::game::ServerGame;

/// Lifecycle of the server session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Nobody connected.
    #[default]
    Lobby,
    /// Some players connected, not enough to start.
    WaitingForPlayers,
    /// A game is running.
    GameActive,
    /// The game just finished; transient before returning to the lobby.
    GameEnded,
}

/// Owns the connected sockets and, while a game runs, the game itself.
pub struct Session<C: Clock = SystemClock> {
    config: ServerConfig,
    clock: C,
    outbox: Outbox<ServerCommand>,
    sockets: BTreeSet<SocketId>,
    state: SessionState,
    game: Option<ServerGame>,
    games_played: u64,
}

impl<C: Clock> Session<C> {
    /// Creates an empty session.
    #[must_use]
    pub fn new(config: ServerConfig, clock: C, outbox: Outbox<ServerCommand>) -> Self {
        Self {
            config,
            clock,
            outbox,
            sockets: BTreeSet::new(),
            state: SessionState::Lobby,
            game: None,
            games_played: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Connected sockets.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.sockets.len()
    }

    /// The running game, if any.
    #[must_use]
    pub const fn game(&self) -> Option<&ServerGame> {
        self.game.as_ref()
    }

    /// The running game, mutably.
    pub fn game_mut(&mut self) -> Option<&mut ServerGame> {
        self.game.as_mut()
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handles a new connection.
    pub fn on_connect(&mut self, socket: SocketId) {
        let max = self.config.max_players;

        if self.sockets.len() >= max {
            info!(%socket, max, "server full, rejecting");
            self.outbox.send_to(socket, ServerMessage::FullServer);
            self.outbox.disconnect(socket);
            return;
        }

        self.sockets.insert(socket);
        info!(%socket, players = self.sockets.len(), max, "player connected");

        if self.sockets.len() < max {
            self.state = SessionState::WaitingForPlayers;
            self.broadcast_waiting();
        } else {
            self.start_game();
        }
    }

    /// Handles a closed connection.
    pub fn on_disconnect(&mut self, socket: SocketId) {
        if !self.sockets.remove(&socket) {
            trace!(%socket, "disconnect from unknown socket");
            return;
        }
        info!(%socket, players = self.sockets.len(), "player disconnected");

        if let Some(game) = self.game.as_mut() {
            game.remove_socket(socket);
        }

        match self.state {
            SessionState::GameActive if self.sockets.len() < self.config.max_players => {
                self.end_game();
            }
            SessionState::WaitingForPlayers | SessionState::Lobby if self.sockets.is_empty() => {
                self.state = SessionState::Lobby;
            }
            SessionState::WaitingForPlayers => self.broadcast_waiting(),
            _ => {}
        }
    }

    /// Handles a client message.
    pub fn on_message(&mut self, socket: SocketId, message: &ClientMessage) {
        match message {
            ClientMessage::PlayerInput(packet) => self.on_player_input(socket, packet),
        }
    }

    /// Applies player input immediately. Ignored outside a game.
    pub fn on_player_input(&mut self, socket: SocketId, packet: &PlayerInputPacket) {
        match self.game.as_mut() {
            Some(game) => game.on_player_input(socket, packet),
            None => trace!(%socket, "input outside a game"),
        }
    }

    /// Runs one tick of the active game, ending it if a system asked to.
    pub fn tick(&mut self) -> Option<TickReport> {
        let now = self.clock.now();
        let report = self.game.as_mut()?.tick(now);
        if report.end_game_requested {
            self.end_game();
        }
        Some(report)
    }

    /// Ends the active game: report, `AFTER_GAME_REPORT`, `END_GAME`, then
    /// back to the lobby. Does nothing unless a game is active.
    pub fn end_game(&mut self) {
        if self.state != SessionState::GameActive {
            return;
        }
        self.state = SessionState::GameEnded;

        if let Some(game) = self.game.take() {
            let report = game.after_game_report();
            info!(
                ticks = game.driver().tick_count(),
                late_ticks = game.driver().stats().late_ticks,
                players = report.len(),
                "game ended"
            );
            self.outbox.broadcast(ServerMessage::AfterGameReport(report));
        }
        self.outbox.broadcast(ServerMessage::EndGame);

        self.state = SessionState::Lobby;
    }

    fn start_game(&mut self) {
        let now = self.clock.now();
        let seed = self
            .config
            .seed
            .unwrap_or(now)
            .wrapping_add(self.games_played);
        self.games_played += 1;

        info!(players = self.sockets.len(), seed, "starting game");
        self.outbox.broadcast(ServerMessage::InitializeGame);

        let sockets: Vec<SocketId> = self.sockets.iter().copied().collect();
        self.game = Some(ServerGame::new(&self.config, &sockets, self.outbox.clone(), seed, now));
        self.state = SessionState::GameActive;

        self.outbox.broadcast(ServerMessage::StartGame);
    }

    fn broadcast_waiting(&self) {
        let missing = self.config.max_players.saturating_sub(self.sockets.len());
        self.outbox
            .broadcast(ServerMessage::WaitingForPlayers(missing as u32));
    }
}

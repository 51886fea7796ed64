//! # Session Runtime
//!
//! Drives a [`Session`] from a stream of transport events and a tick
//! interval that only exists while a game is active.
//!
//! ```text
//! transport ──SessionEvent──▶ run_session ──▶ Session ──ServerCommand──▶ transport
//!                                 ▲
//!                          Interval (game only)
//! ```

use std::future::pending;

use arena_shared::{ClientMessage, SocketId};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info};

use super::clock::Clock;
use super::session::Session;

/// Something the transport saw.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// A socket connected.
    Connected(SocketId),
    /// A socket closed.
    Disconnected(SocketId),
    /// A socket sent a message.
    Message(SocketId, ClientMessage),
}

/// Runs `session` until the event channel closes.
///
/// Events are handled in arrival order. Ticks fire at the configured rate
/// while a game is active; late ticks are skipped rather than bunched.
pub async fn run_session<C: Clock>(
    mut session: Session<C>,
    mut events: UnboundedReceiver<SessionEvent>,
) -> Session<C> {
    let mut ticker: Option<Interval> = None;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    info!("event channel closed, stopping session");
                    break;
                };
                match event {
                    SessionEvent::Connected(socket) => session.on_connect(socket),
                    SessionEvent::Disconnected(socket) => session.on_disconnect(socket),
                    SessionEvent::Message(socket, message) => session.on_message(socket, &message),
                }
            }
            () = next_tick(&mut ticker) => {
                session.tick();
            }
        }

        match (session.game().is_some(), ticker.is_some()) {
            (true, false) => {
                let mut fresh = interval(session.config().tick_period());
                fresh.set_missed_tick_behavior(MissedTickBehavior::Skip);
                ticker = Some(fresh);
                debug!("tick loop started");
            }
            (false, true) => {
                ticker = None;
                debug!("tick loop stopped");
            }
            _ => {}
        }
    }

    session
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending().await,
    }
}

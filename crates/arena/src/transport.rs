//! # Line Transport
//!
//! Plain TCP, one JSON object per line: `{"event": <name>, "payload": ...}`.
//!
//! ```text
//!  accept ──▶ connection task ──SessionEvent──▶ session
//!                  ▲                               │
//!                  │ lines                         │ ServerCommand (crossbeam)
//!                  │                               ▼
//!               router ◀──RouteEvent── outbox pump thread
//! ```
//!
//! The router owns one sender per socket. Dropping it closes the
//! connection after everything already queued has been written.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::thread;

use arena_networking::SessionEvent;
use arena_shared::{ClientMessage, Recipient, ServerCommand, ServerMessage, SocketId};
use crossbeam_channel::Receiver;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, trace, warn};

/// Encoded line shared by every recipient of a broadcast.
type Line = Arc<str>;

/// Input of the router task.
#[derive(Debug)]
pub enum RouteEvent {
    /// A connection is ready to receive lines.
    Register(SocketId, UnboundedSender<Line>),
    /// A connection is gone.
    Unregister(SocketId),
    /// Something the session wants delivered.
    Command(ServerCommand),
}

/// Encodes a server message as one newline-terminated line.
///
/// # Errors
///
/// Propagates `serde_json` failures.
pub fn encode(message: &ServerMessage) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

/// Decodes one client line.
///
/// # Errors
///
/// Propagates `serde_json` failures.
pub fn decode(line: &str) -> serde_json::Result<ClientMessage> {
    serde_json::from_str(line.trim())
}

/// Forwards outbox commands into the async router on a dedicated thread.
///
/// The thread exits once every outbox handle is dropped.
///
/// # Errors
///
/// Fails if the thread cannot be spawned.
pub fn spawn_outbox_pump(
    commands: Receiver<ServerCommand>,
    router: UnboundedSender<RouteEvent>,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("outbox-pump".into())
        .spawn(move || {
            for command in commands {
                if router.send(RouteEvent::Command(command)).is_err() {
                    break;
                }
            }
            debug!("outbox closed");
        })
}

/// Delivers session output to the registered connections.
pub async fn route(mut events: UnboundedReceiver<RouteEvent>) {
    let mut peers: HashMap<SocketId, UnboundedSender<Line>> = HashMap::new();

    while let Some(event) = events.recv().await {
        match event {
            RouteEvent::Register(socket, tx) => {
                peers.insert(socket, tx);
            }
            RouteEvent::Unregister(socket) => {
                peers.remove(&socket);
            }
            RouteEvent::Command(ServerCommand::Disconnect(socket)) => {
                if peers.remove(&socket).is_none() {
                    trace!(%socket, "disconnect for unknown socket");
                }
            }
            RouteEvent::Command(ServerCommand::Send { recipient, message }) => {
                let line: Line = match encode(&message) {
                    Ok(line) => line.into(),
                    Err(err) => {
                        warn!(event = message.event_name(), %err, "cannot encode message");
                        continue;
                    }
                };
                match recipient {
                    Recipient::All => {
                        for tx in peers.values() {
                            let _ = tx.send(Arc::clone(&line));
                        }
                    }
                    Recipient::Socket(socket) => match peers.get(&socket) {
                        Some(tx) => {
                            let _ = tx.send(line);
                        }
                        None => trace!(%socket, "message for unknown socket"),
                    },
                }
            }
        }
    }
}

/// Accepts connections forever, numbering sockets from zero.
pub async fn accept_loop(
    listener: TcpListener,
    session: UnboundedSender<SessionEvent>,
    router: UnboundedSender<RouteEvent>,
) {
    let mut next_id = 0u64;
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let socket = SocketId(next_id);
                next_id += 1;
                info!(%socket, %addr, "connection accepted");
                tokio::spawn(connection(stream, socket, session.clone(), router.clone()));
            }
            Err(err) => warn!(%err, "accept failed"),
        }
    }
}

/// Runs one connection until either side closes it.
pub async fn connection(
    stream: TcpStream,
    socket: SocketId,
    session: UnboundedSender<SessionEvent>,
    router: UnboundedSender<RouteEvent>,
) {
    let (tx, mut outgoing) = unbounded_channel::<Line>();
    // Must reach the router before the session sees Connected
    if router.send(RouteEvent::Register(socket, tx)).is_err()
        || session.send(SessionEvent::Connected(socket)).is_err()
    {
        return;
    }

    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match decode(&line) {
                    Ok(message) => {
                        if session.send(SessionEvent::Message(socket, message)).is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!(%socket, %err, "malformed client line"),
                },
                Ok(None) => break,
                Err(err) => {
                    debug!(%socket, %err, "read failed");
                    break;
                }
            },
            out = outgoing.recv() => match out {
                Some(line) => {
                    if let Err(err) = write.write_all(line.as_bytes()).await {
                        debug!(%socket, %err, "write failed");
                        break;
                    }
                }
                None => break,
            },
        }
    }

    let _ = write.shutdown().await;
    let _ = router.send(RouteEvent::Unregister(socket));
    let _ = session.send(SessionEvent::Disconnected(socket));
    info!(%socket, "connection closed");
}

//! Outbound event queue.
//!
//! Simulation code never touches sockets. It pushes events into an
//! [`Outbox`] and the transport drains the receiving end between ticks.
//! Emitting is fire-and-forget: a dropped receiver is ignored.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::protocol::{Recipient, ServerCommand, ServerMessage, SocketId};

/// Cloneable sending half of an event queue.
#[derive(Debug)]
pub struct Outbox<E> {
    tx: Sender<E>,
}

impl<E> Clone for Outbox<E> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<E> Outbox<E> {
    /// Creates an unbounded queue, returning the outbox and its receiver.
    #[must_use]
    pub fn channel() -> (Self, Receiver<E>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }

    /// Queues an event. Never blocks, never fails.
    #[inline]
    pub fn emit(&self, event: E) {
        let _ = self.tx.send(event);
    }
}

impl Outbox<ServerCommand> {
    /// Sends `message` to every connected socket.
    pub fn broadcast(&self, message: ServerMessage) {
        self.emit(ServerCommand::Send {
            recipient: Recipient::All,
            message,
        });
    }

    /// Sends `message` to a single socket.
    pub fn send_to(&self, socket: SocketId, message: ServerMessage) {
        self.emit(ServerCommand::Send {
            recipient: Recipient::Socket(socket),
            message,
        });
    }

    /// Asks the transport to close `socket`.
    pub fn disconnect(&self, socket: SocketId) {
        self.emit(ServerCommand::Disconnect(socket));
    }
}

//! Mock socket: a local in-process event emitter.
//!
//! DESIGN
//! ======
//! There is no server counterpart, so the "socket" is two channels:
//! an unbounded `mpsc` queue carrying staged intents out to the echo peer, and a
//! `broadcast` channel carrying delivered frames back to any subscriber.
//! Emitting never blocks and never drops: a cursor burst waits in the queue
//! behind its delay instead of crowding out later chat messages. The only
//! failure is a peer that has shut down.

use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

use crate::frame::Frame;

#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    #[error("echo peer is gone")]
    Closed,
}

/// An intent waiting for the echo peer, with the instant it was staged.
#[derive(Debug)]
pub struct Staged {
    pub frame: Frame,
    pub staged_at: Instant,
}

/// Session-side end: emit intents, subscribe to deliveries.
#[derive(Clone)]
pub struct MockSocket {
    outbound: mpsc::UnboundedSender<Staged>,
    delivered: broadcast::Sender<Frame>,
}

/// Peer-side end, owned by the echo simulator.
pub struct EchoPeer {
    inbound: mpsc::UnboundedReceiver<Staged>,
    delivered: broadcast::Sender<Frame>,
}

/// Create a connected socket/peer pair.
#[must_use]
pub fn pair(event_capacity: usize) -> (MockSocket, EchoPeer) {
    let (outbound, inbound) = mpsc::unbounded_channel();
    let (delivered, _) = broadcast::channel(event_capacity.max(1));
    (
        MockSocket { outbound, delivered: delivered.clone() },
        EchoPeer { inbound, delivered },
    )
}

impl MockSocket {
    /// Stage a frame for the echo peer.
    ///
    /// # Errors
    ///
    /// Returns `Closed` when the peer has shut down.
    pub fn emit(&self, frame: Frame) -> Result<(), SocketError> {
        let staged = Staged { frame, staged_at: Instant::now() };
        self.outbound.send(staged).map_err(|_| SocketError::Closed)
    }

    /// Receive hook: every frame the peer delivers from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.delivered.subscribe()
    }
}

impl EchoPeer {
    /// Next staged intent, or `None` once every socket handle is dropped.
    pub async fn recv(&mut self) -> Option<Staged> {
        self.inbound.recv().await
    }

    /// Hand a frame to subscribers. Returns how many received it.
    pub fn deliver(&self, frame: Frame) -> usize {
        self.delivered.send(frame).unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "socket_test.rs"]
mod tests;

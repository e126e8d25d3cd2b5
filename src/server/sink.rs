//! Channel-backed output sink.
//!
//! Collects a connection's plaintext in memory and hands it over as one
//! [`ReceivedMessage`] when the connection is released.

use std::io;
use std::net::SocketAddr;

use tokio::sync::mpsc;
use tracing::debug;

use crate::core::{BlockSink, SinkFactory};

/// Plaintext recovered from one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Sender's address.
    pub peer: SocketAddr,
    /// Reconstructed bytes, possibly partial.
    pub bytes: Vec<u8>,
    /// Whether the sender's stream ended cleanly.
    pub complete: bool,
}

/// Sink delivering the whole message through a channel on close.
#[derive(Debug)]
pub struct MemorySink {
    peer: SocketAddr,
    bytes: Vec<u8>,
    complete: bool,
    tx: Option<mpsc::UnboundedSender<ReceivedMessage>>,
}

impl MemorySink {
    /// Create a factory handing out memory sinks, and the receiving end of
    /// their channel.
    pub fn factory() -> (MemorySinkFactory, mpsc::UnboundedReceiver<ReceivedMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (MemorySinkFactory { tx }, rx)
    }
}

impl BlockSink for MemorySink {
    async fn write(&mut self, bytes: &[u8], has_more: bool) -> io::Result<()> {
        self.bytes.extend_from_slice(bytes);
        if !has_more {
            self.complete = true;
        }
        Ok(())
    }

    async fn close(&mut self) -> io::Result<()> {
        let Some(tx) = self.tx.take() else {
            return Ok(());
        };
        let message = ReceivedMessage {
            peer: self.peer,
            bytes: std::mem::take(&mut self.bytes),
            complete: self.complete,
        };
        if tx.send(message).is_err() {
            debug!(peer = %self.peer, "message receiver dropped");
        }
        Ok(())
    }
}

/// Produces a [`MemorySink`] per connection, all feeding one channel.
#[derive(Debug, Clone)]
pub struct MemorySinkFactory {
    tx: mpsc::UnboundedSender<ReceivedMessage>,
}

impl SinkFactory for MemorySinkFactory {
    type Sink = MemorySink;

    fn open(&self, peer: SocketAddr) -> MemorySink {
        MemorySink {
            peer,
            bytes: Vec::new(),
            complete: false,
            tx: Some(self.tx.clone()),
        }
    }
}

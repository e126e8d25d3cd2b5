//! Console output sink.

use std::io;
use std::net::SocketAddr;

use blockwire::core::BlockSink;
use tokio::io::{AsyncWriteExt, Stdout};

/// Echoes one connection's plaintext to stdout as it arrives.
pub struct ConsoleSink {
    peer: SocketAddr,
    started: bool,
    out: Stdout,
}

impl ConsoleSink {
    /// Sink for a connection from `peer`.
    pub fn open(peer: SocketAddr) -> Self {
        Self {
            peer,
            started: false,
            out: tokio::io::stdout(),
        }
    }
}

impl BlockSink for ConsoleSink {
    async fn write(&mut self, bytes: &[u8], has_more: bool) -> io::Result<()> {
        if !self.started {
            self.started = true;
            let header = format!("RECEIVED MESSAGE FROM {}: ", self.peer);
            self.out.write_all(header.as_bytes()).await?;
        }
        self.out.write_all(bytes).await?;
        if !has_more {
            self.out.write_all(b"\n").await?;
        }
        self.out.flush().await
    }
}

//! Core traits for Blockwire.
//!
//! The block framer only knows how many bytes of a block are meaningful. How
//! a block travels on the wire, and how many round trips it takes, belongs to
//! the scheme codec behind [`BlockEncoder`] / [`BlockDecoder`].

use std::future::{self, Future};
use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::transport::{BlockSize, TransportResult};

/// Ordered, reliable, bidirectional byte stream carrying one connection.
///
/// Blanket-implemented for anything tokio can read and write, e.g.
/// `TcpStream`, `DuplexStream` or a `BufWriter` around either.
pub trait ByteStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> ByteStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Sending half of a block codec.
///
/// # Requirements
///
/// - `encode_block` receives the full fixed-capacity block; bytes past the
///   meaningful count are zero.
/// - Any randomness MUST be drawn fresh for every block.
/// - The encoder MUST flush before awaiting a reply from the peer.
pub trait BlockEncoder: Send {
    /// Fixed block size of this scheme.
    fn block_size(&self) -> BlockSize;

    /// Write the scheme preamble once, before the first block.
    fn write_preamble<S: ByteStream>(
        &mut self,
        stream: &mut S,
    ) -> impl Future<Output = TransportResult<()>> + Send {
        let _ = stream;
        future::ready(Ok(()))
    }

    /// Place one block on the connection, running any round trips it needs.
    fn encode_block<S: ByteStream>(
        &mut self,
        block: &[u8],
        stream: &mut S,
    ) -> impl Future<Output = TransportResult<()>> + Send;
}

/// Receiving half of a block codec.
pub trait BlockDecoder: Send {
    /// Fixed block size of this scheme.
    fn block_size(&self) -> BlockSize;

    /// Read the scheme preamble once, before the first block.
    fn read_preamble<S: ByteStream>(
        &mut self,
        stream: &mut S,
    ) -> impl Future<Output = TransportResult<()>> + Send {
        let _ = stream;
        future::ready(Ok(()))
    }

    /// Recover one block into `buf` (exactly `block_size` bytes long).
    ///
    /// Returns how many leading bytes of `buf` were filled.
    fn decode_block<S: ByteStream>(
        &mut self,
        stream: &mut S,
        buf: &mut [u8],
    ) -> impl Future<Output = TransportResult<usize>> + Send;
}

/// Destination for reconstructed plaintext of one connection.
pub trait BlockSink: Send {
    /// Deliver plaintext bytes.
    ///
    /// `has_more` is `false` exactly once, on an empty write after the
    /// sender's stream ended cleanly.
    fn write(&mut self, bytes: &[u8], has_more: bool)
    -> impl Future<Output = io::Result<()>> + Send;

    /// Release the sink. Called once per connection on every exit path.
    fn close(&mut self) -> impl Future<Output = io::Result<()>> + Send {
        future::ready(Ok(()))
    }
}

/// Produces one [`BlockSink`] per accepted connection.
pub trait SinkFactory: Send + Sync + 'static {
    /// Sink type handed to each connection.
    type Sink: BlockSink + 'static;

    /// Open the sink for a connection from `peer`.
    fn open(&self, peer: SocketAddr) -> Self::Sink;
}

impl<F, K> SinkFactory for F
where
    F: Fn(SocketAddr) -> K + Send + Sync + 'static,
    K: BlockSink + 'static,
{
    type Sink = K;

    fn open(&self, peer: SocketAddr) -> K {
        self(peer)
    }
}

impl BlockSink for Vec<u8> {
    async fn write(&mut self, bytes: &[u8], _has_more: bool) -> io::Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

//! Block framing over a byte stream.
//!
//! The framer splits an unbounded byte source into fixed-capacity blocks. In
//! front of every block it writes one meta byte holding the number of
//! meaningful bytes; the block itself is handed to a scheme codec, which owns
//! its wire representation.
//!
//! ```text
//! +------+---------------------------+------+---------------------------+---
//! | meta | codec payload for block 0 | meta | codec payload for block 1 | ...
//! | 1 B  | (raw, R/E, pass1..3, ...) | 1 B  |                           |
//! +------+---------------------------+------+---------------------------+---
//! ```
//!
//! There is no terminator. End-of-input where a meta byte is expected ends
//! the message cleanly.

use std::fmt;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tracing::{debug, trace};

use super::error::{truncated, FrameError, TransportError, TransportResult};
use super::wire;
use crate::core::{BlockDecoder, BlockEncoder, BlockSink, ByteStream, ConfigError, MAX_BLOCK_SIZE};

/// Number of plaintext bytes carried per block, validated to `1..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockSize(u8);

impl BlockSize {
    /// Validate a block size.
    pub fn new(size: usize) -> Result<Self, ConfigError> {
        if size == 0 || size > MAX_BLOCK_SIZE {
            return Err(ConfigError::InvalidBlockSize(size));
        }
        Ok(Self(size as u8))
    }

    /// Block size in bytes.
    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// Block size in bits.
    pub fn bits(self) -> u64 {
        self.0 as u64 * 8
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for BlockSize {
    type Error = ConfigError;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

/// Counters for one direction of a transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// Blocks moved.
    pub blocks: u64,
    /// Meaningful plaintext bytes moved.
    pub bytes: u64,
}

impl TransferStats {
    fn record(&mut self, bytes: usize) {
        self.blocks += 1;
        self.bytes += bytes as u64;
    }
}

/// Moves data in blocks, with a meta byte ahead of each one.
#[derive(Debug, Clone, Copy)]
pub struct BlockTransfer {
    block_size: BlockSize,
}

impl BlockTransfer {
    /// Create a framer for the given block size.
    pub fn new(block_size: BlockSize) -> Self {
        debug!(block_size = block_size.get(), "block transfer initialized");
        Self { block_size }
    }

    /// Configured block size.
    pub fn block_size(&self) -> BlockSize {
        self.block_size
    }

    /// Read `source` to its end, sending each chunk as one framed block.
    ///
    /// Each non-empty read becomes one block. The meta byte and the codec
    /// payload are flushed together once the encoder returns, so a failing
    /// encoder leaves no orphaned meta byte on the wire. Returns at the end
    /// of `source` without writing any terminator.
    pub async fn write_blocks<R, S, E>(
        &self,
        source: &mut R,
        stream: &mut S,
        encoder: &mut E,
    ) -> TransportResult<TransferStats>
    where
        R: AsyncRead + Unpin + Send,
        S: ByteStream,
        E: BlockEncoder,
    {
        debug_assert_eq!(encoder.block_size(), self.block_size);

        let mut buf = vec![0u8; self.block_size.get()];
        let mut stats = TransferStats::default();

        loop {
            buf.fill(0);
            let read = source.read(&mut buf).await.map_err(TransportError::Source)?;
            if read == 0 {
                debug!(blocks = stats.blocks, bytes = stats.bytes, "message source exhausted");
                return Ok(stats);
            }

            trace!(meta = read, "writing block");
            stream.write_u8(read as u8).await?;
            encoder.encode_block(&buf, stream).await?;
            stream.flush().await?;
            stats.record(read);
        }
    }

    /// Receive framed blocks until the peer closes, forwarding plaintext to `sink`.
    ///
    /// The meta byte is the single source of truth for how many bytes of a
    /// block are kept. A decoder that recovers fewer bytes than declared is
    /// a protocol error. Clean end-of-stream is signalled to the sink with an
    /// empty write and `has_more == false`.
    pub async fn read_blocks<S, D, K>(
        &self,
        stream: &mut S,
        decoder: &mut D,
        sink: &mut K,
    ) -> TransportResult<TransferStats>
    where
        S: ByteStream,
        D: BlockDecoder,
        K: BlockSink,
    {
        debug_assert_eq!(decoder.block_size(), self.block_size);

        let block_size = self.block_size.get();
        let mut buf = vec![0u8; block_size];
        let mut stats = TransferStats::default();

        loop {
            let Some(meta) = wire::read_meta_byte(stream).await? else {
                debug!(blocks = stats.blocks, bytes = stats.bytes, "peer closed stream");
                sink.write(&[], false).await.map_err(TransportError::Sink)?;
                return Ok(stats);
            };

            let declared = meta as usize;
            if declared > block_size {
                return Err(FrameError::MetaOutOfRange { meta, block_size }.into());
            }
            trace!(meta, "received meta byte");

            buf.fill(0);
            let decoded = decoder.decode_block(stream, &mut buf).await?;
            if decoded < declared {
                return Err(FrameError::LengthMismatch { declared, decoded }.into());
            }

            sink.write(&buf[..declared], true)
                .await
                .map_err(TransportError::Sink)?;
            stats.record(declared);
        }
    }
}

/// Identity codec: every block travels as exactly `block_size` raw bytes.
#[derive(Debug, Clone, Copy)]
pub struct RawCodec {
    block_size: BlockSize,
}

impl RawCodec {
    /// Create a raw codec.
    pub fn new(block_size: BlockSize) -> Self {
        Self { block_size }
    }
}

impl BlockEncoder for RawCodec {
    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    async fn encode_block<S: ByteStream>(&mut self, block: &[u8], stream: &mut S) -> TransportResult<()> {
        stream.write_all(block).await?;
        Ok(())
    }
}

impl BlockDecoder for RawCodec {
    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    async fn decode_block<S: ByteStream>(&mut self, stream: &mut S, buf: &mut [u8]) -> TransportResult<usize> {
        stream.read_exact(buf).await.map_err(truncated("block"))?;
        Ok(buf.len())
    }
}

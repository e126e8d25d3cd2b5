//! Per-connection receive state machine.
//!
//! ```text
//! AwaitingProtocolCode ──► AwaitingSchemeSetup ──► StreamingBlocks ──► Closed
//!   read 4-byte code         registry lookup,        framer read loop
//!                            scheme preamble
//! ```
//!
//! Whatever phase a connection stops in, its sink is closed and its stream
//! shut down before [`serve_connection`] returns. Failures are reported
//! through the error callback, exactly once per connection, and never
//! returned to the listener.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::core::{BlockDecoder, BlockSink, ByteStream, ConfigError};
use crate::protocols::Registry;
use crate::transport::{wire, BlockTransfer, ConnectionPhase, ConnectionState, TransportError};

/// Why a connection was aborted.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The connection failed on the wire.
    #[error("{phase}: {source}")]
    Transport {
        /// Phase the connection was in.
        phase: ConnectionPhase,
        /// Underlying error.
        #[source]
        source: TransportError,
    },

    /// The protocol code has no decoder here.
    #[error("awaiting protocol code: {0}")]
    Dispatch(#[source] ConfigError),

    /// Releasing the output sink failed.
    #[error("closing output: {0}")]
    Close(#[source] io::Error),
}

impl SessionError {
    /// Phase in which the connection failed.
    pub fn phase(&self) -> ConnectionPhase {
        match self {
            SessionError::Transport { phase, .. } => *phase,
            SessionError::Dispatch(_) => ConnectionPhase::AwaitingProtocolCode,
            SessionError::Close(_) => ConnectionPhase::StreamingBlocks,
        }
    }
}

fn in_phase(phase: ConnectionPhase) -> impl FnOnce(TransportError) -> SessionError {
    move |source| SessionError::Transport { phase, source }
}

async fn receive<S, K>(
    stream: &mut S,
    registry: &Registry,
    sink: &mut K,
    state: &mut ConnectionState,
) -> Result<(), SessionError>
where
    S: ByteStream,
    K: BlockSink,
{
    let code = wire::read_protocol_code(stream)
        .await
        .map_err(in_phase(state.phase))?;
    state.protocol_code = Some(code);
    let mut decoder = registry.decoder_for(code).map_err(SessionError::Dispatch)?;

    state.advance(ConnectionPhase::AwaitingSchemeSetup);
    decoder.read_preamble(stream).await.map_err(in_phase(state.phase))?;

    state.advance(ConnectionPhase::StreamingBlocks);
    debug!(peer = %state.peer, protocol = %decoder.protocol_code(), "streaming blocks");
    let framer = BlockTransfer::new(decoder.block_size());
    state.stats = framer
        .read_blocks(stream, &mut decoder, sink)
        .await
        .map_err(in_phase(state.phase))?;
    Ok(())
}

/// Drive one accepted connection to completion.
///
/// Takes ownership of the stream and the sink and releases both on every
/// exit path. On failure `on_error` is invoked once with a message naming
/// the peer and the failing phase. Returns the final connection state.
pub async fn serve_connection<S, K>(
    mut stream: S,
    peer: SocketAddr,
    registry: &Registry,
    mut sink: K,
    on_error: &(dyn Fn(&str) + Send + Sync),
) -> ConnectionState
where
    S: ByteStream,
    K: BlockSink,
{
    let mut state = ConnectionState::new(peer);
    debug!(%peer, "connection accepted");

    let mut result = receive(&mut stream, registry, &mut sink, &mut state).await;

    if let Err(e) = sink.close().await {
        match result {
            Ok(()) => result = Err(SessionError::Close(e)),
            Err(_) => warn!(%peer, error = %e, "closing output failed"),
        }
    }
    if let Err(e) = stream.shutdown().await {
        debug!(%peer, error = %e, "stream shutdown failed");
    }

    match result {
        Ok(()) => {
            state.advance(ConnectionPhase::Closed);
            info!(
                %peer,
                blocks = state.stats.blocks,
                bytes = state.stats.bytes,
                elapsed_ms = state.age().as_millis() as u64,
                "message received"
            );
        }
        Err(e) => {
            state.fail();
            warn!(%peer, error = %e, "connection aborted");
            on_error(&format!("connection from {peer}: {e}"));
        }
    }
    state
}

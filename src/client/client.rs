//! High-level sender API.
//!
//! Provides [`MessageSender`] for streaming one message per connection to a
//! receiver under the configured scheme.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use num_bigint::BigUint;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::core::{BlockEncoder, ByteStream, ConfigError, CONNECT_TIMEOUT, DEFAULT_HOST, DEFAULT_PORT};
use crate::crypto::DomainParams;
use crate::protocols::{ProtocolCode, Registry, SchemeEncoder, SenderSetup};
use crate::transport::{wire, BlockTransfer, TransferStats, TransportError};

/// Errors that can occur while sending.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Sender setup failed before any connection was made.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failed to connect to the receiver.
    #[error("connection to {addr} failed: {source}")]
    ConnectionFailed {
        /// Address dialled.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The receiver did not accept in time.
    #[error("connection to {0} timed out")]
    Timeout(String),

    /// The transfer aborted.
    #[error("transfer failed: {0}")]
    Transfer(#[from] TransportError),
}

impl ClientError {
    /// Check if the failure came from the local plaintext source.
    pub fn is_source_error(&self) -> bool {
        matches!(self, ClientError::Transfer(e) if e.is_source_error())
    }
}

/// Sender configuration.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Scheme parameters.
    pub setup: SenderSetup,

    /// Receiver address as `host:port`.
    pub server_addr: String,

    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            setup: SenderSetup::default(),
            server_addr: format!("{DEFAULT_HOST}:{DEFAULT_PORT}"),
            connect_timeout: CONNECT_TIMEOUT,
        }
    }
}

/// Builder for creating a [`SenderConfig`].
#[derive(Debug)]
pub struct MessageSenderBuilder {
    config: SenderConfig,
}

impl MessageSenderBuilder {
    /// Create a new sender builder.
    pub fn new() -> Self {
        Self {
            config: SenderConfig::default(),
        }
    }

    /// Set the scheme.
    pub fn protocol(mut self, protocol: ProtocolCode) -> Self {
        self.config.setup.protocol = protocol;
        self
    }

    /// Set the prime announced by a Shamir sender.
    pub fn shamir_prime(mut self, prime: BigUint) -> Self {
        self.config.setup.shamir_prime = prime;
        self
    }

    /// Set the ElGamal domain parameters.
    pub fn domain(mut self, domain: DomainParams) -> Self {
        self.config.setup.domain = Some(domain);
        self
    }

    /// Set where the receiver published its public value.
    pub fn peer_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.setup.peer_key_file = Some(path.into());
        self
    }

    /// Set the receiver address.
    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.server_addr = addr.into();
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Build the sender configuration.
    pub fn build(self) -> SenderConfig {
        self.config
    }
}

impl Default for MessageSenderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Blockwire sender.
///
/// The scheme codec is built once, when the sender is created, so key-file
/// problems surface as a [`ConfigError`] before any connection exists.
///
/// # Example
///
/// ```ignore
/// use blockwire::client::{MessageSender, MessageSenderBuilder};
/// use blockwire::ProtocolCode;
///
/// let config = MessageSenderBuilder::new()
///     .protocol(ProtocolCode::Rsa)
///     .peer_key_file("bob_rsa.key")
///     .server_addr("localhost:4444")
///     .build();
///
/// let sender = MessageSender::new(config)?;
/// let stats = sender.send_to(&mut tokio::io::stdin()).await?;
/// println!("sent {} bytes", stats.bytes);
/// ```
#[derive(Debug, Clone)]
pub struct MessageSender {
    config: SenderConfig,
    encoder: SchemeEncoder,
}

impl MessageSender {
    /// Validate the configuration and build the scheme codec.
    pub fn new(config: SenderConfig) -> Result<Self, ConfigError> {
        let encoder = Registry::encoder_for(&config.setup)?;
        Ok(Self { config, encoder })
    }

    /// Scheme this sender speaks.
    pub fn protocol(&self) -> ProtocolCode {
        self.encoder.protocol_code()
    }

    /// Get the sender configuration.
    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// Stream `source` over an established connection, then close it.
    ///
    /// Writes the protocol code and scheme preamble, then one framed block
    /// per source read until `source` is exhausted.
    pub async fn send<R, S>(&self, source: &mut R, stream: S) -> Result<TransferStats, TransportError>
    where
        R: AsyncRead + Unpin + Send,
        S: ByteStream,
    {
        let mut encoder = self.encoder.clone();
        let mut stream = BufWriter::new(stream);
        let protocol = self.protocol();

        wire::write_protocol_code(&mut stream, protocol.as_u32()).await?;
        encoder.write_preamble(&mut stream).await?;
        stream.flush().await?;
        debug!(%protocol, "preamble sent");

        let framer = BlockTransfer::new(encoder.block_size());
        let stats = framer.write_blocks(source, &mut stream, &mut encoder).await?;
        stream.shutdown().await?;

        info!(%protocol, blocks = stats.blocks, bytes = stats.bytes, "message sent");
        Ok(stats)
    }

    /// Dial the configured receiver and stream `source` to it.
    pub async fn send_to<R>(&self, source: &mut R) -> Result<TransferStats, ClientError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let addr = self.config.server_addr.as_str();
        let stream = tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| ClientError::Timeout(addr.to_string()))?
            .map_err(|source| ClientError::ConnectionFailed {
                addr: addr.to_string(),
                source,
            })?;
        stream.set_nodelay(true)?;
        info!(addr, protocol = %self.protocol(), "connected to receiver");

        Ok(self.send(source, stream).await?)
    }
}

impl From<io::Error> for ClientError {
    fn from(source: io::Error) -> Self {
        ClientError::Transfer(TransportError::Io(source))
    }
}

//! High-level receiver API.
//!
//! Provides [`MessageServer`], which accepts TCP connections and runs one
//! task per connection through [`serve_connection`].

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use num_bigint::BigUint;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::receiver::{ElGamalReceiverConfig, ReceiverConfig, RsaReceiverConfig};
use super::session::serve_connection;
use crate::core::{ConfigError, SinkFactory, DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT};
use crate::crypto::DomainParams;
use crate::protocols::Registry;

/// Pause after a failed accept, e.g. when out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Errors that can occur in the receiver.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to address.
    #[error("bind to {addr} failed: {source}")]
    BindFailed {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Receiver setup failed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,

    /// Maximum number of concurrently served connections.
    pub max_connections: usize,

    /// Enabled schemes and their key material.
    pub receiver: ReceiverConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            receiver: ReceiverConfig::default(),
        }
    }
}

/// Builder for creating a [`ServerConfig`].
#[derive(Debug)]
pub struct MessageServerBuilder {
    config: ServerConfig,
}

impl MessageServerBuilder {
    /// Create a new server builder.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Set the bind address.
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    /// Set the maximum number of concurrent connections.
    pub fn max_connections(mut self, max: usize) -> Self {
        self.config.max_connections = max;
        self
    }

    /// Enable or disable Shamir three-pass.
    pub fn shamir(mut self, enabled: bool) -> Self {
        self.config.receiver.shamir = enabled;
        self
    }

    /// Enable ElGamal, publishing the public value to `key_file`.
    pub fn elgamal(mut self, domain: DomainParams, key_file: impl Into<PathBuf>) -> Self {
        self.config.receiver.elgamal = Some(ElGamalReceiverConfig {
            domain,
            key_file: key_file.into(),
        });
        self
    }

    /// Enable RSA with primes `p` and `q`, publishing the modulus to `key_file`.
    pub fn rsa(mut self, p: BigUint, q: BigUint, key_file: impl Into<PathBuf>) -> Self {
        self.config.receiver.rsa = Some(RsaReceiverConfig {
            p,
            q,
            key_file: key_file.into(),
        });
        self
    }

    /// Build the server configuration.
    pub fn build(self) -> ServerConfig {
        self.config
    }
}

impl Default for MessageServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A Blockwire receiver.
///
/// # Example
///
/// ```ignore
/// use blockwire::server::{MemorySink, MessageServer, MessageServerBuilder};
///
/// let config = MessageServerBuilder::new()
///     .bind_addr("0.0.0.0:4444".parse()?)
///     .elgamal(domain, "bob_elgamal.key")
///     .build();
///
/// let (sinks, mut messages) = MemorySink::factory();
/// let server = MessageServer::bind(config, sinks, |e| eprintln!("{e}")).await?;
///
/// while let Some(message) = messages.recv().await {
///     println!("{}: {:?}", message.peer, message.bytes);
/// }
/// ```
pub struct MessageServer {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    accept_task: Option<JoinHandle<()>>,
}

impl MessageServer {
    /// Publish keys, bind, and start accepting connections.
    pub async fn bind<F, E>(config: ServerConfig, sinks: F, on_error: E) -> Result<Self, ServerError>
    where
        F: SinkFactory,
        E: Fn(&str) + Send + Sync + 'static,
    {
        let registry = config.receiver.build_registry()?;
        Self::with_registry(&config, registry, sinks, on_error).await
    }

    /// Bind and start accepting connections with a prepared registry.
    pub async fn with_registry<F, E>(
        config: &ServerConfig,
        registry: Registry,
        sinks: F,
        on_error: E,
    ) -> Result<Self, ServerError>
    where
        F: SinkFactory,
        E: Fn(&str) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|source| ServerError::BindFailed {
                addr: config.bind_addr,
                source,
            })?;
        let local_addr = listener.local_addr()?;
        info!(%local_addr, schemes = ?registry.enabled(), "listening");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let accept_task = tokio::spawn(accept_loop(
            listener,
            Arc::new(Semaphore::new(config.max_connections.max(1))),
            Arc::new(registry),
            Arc::new(sinks),
            Arc::new(on_error),
            shutdown_rx,
        ));

        Ok(Self {
            local_addr,
            shutdown_tx: Some(shutdown_tx),
            accept_task: Some(accept_task),
        })
    }

    /// Get the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections.
    ///
    /// Connections already being served run to completion.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.accept_task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "accept loop ended abnormally");
            }
        }
    }
}

impl Drop for MessageServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn accept_loop<F, E>(
    listener: TcpListener,
    limiter: Arc<Semaphore>,
    registry: Arc<Registry>,
    sinks: Arc<F>,
    on_error: Arc<E>,
    mut shutdown_rx: oneshot::Receiver<()>,
) where
    F: SinkFactory,
    E: Fn(&str) + Send + Sync + 'static,
{
    loop {
        let permit = tokio::select! {
            _ = &mut shutdown_rx => break,
            permit = Arc::clone(&limiter).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let (stream, peer) = tokio::select! {
            _ = &mut shutdown_rx => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            },
        };
        if let Err(e) = stream.set_nodelay(true) {
            debug!(%peer, error = %e, "could not disable nagle");
        }

        let registry = Arc::clone(&registry);
        let sink = sinks.open(peer);
        let on_error = Arc::clone(&on_error);
        tokio::spawn(async move {
            let _permit = permit;
            serve_connection(stream, peer, &registry, sink, &*on_error).await;
        });
    }
    info!(addr = ?listener.local_addr().ok(), "stopped accepting connections");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DEFAULT_SHAMIR_PRIME;
    use crate::server::MemorySink;
    use crate::transport::wire;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::mpsc;

    fn loopback() -> ServerConfig {
        MessageServerBuilder::new()
            .bind_addr("127.0.0.1:0".parse().unwrap())
            .build()
    }

    #[test]
    fn test_builder() {
        let config = MessageServerBuilder::new()
            .bind_addr("127.0.0.1:9999".parse().unwrap())
            .max_connections(8)
            .shamir(false)
            .rsa(BigUint::from(65_537u32), BigUint::from(65_539u32), "n.key")
            .build();

        assert_eq!(config.bind_addr.port(), 9999);
        assert_eq!(config.max_connections, 8);
        assert!(!config.receiver.shamir);
        assert_eq!(config.receiver.rsa.unwrap().key_file, PathBuf::from("n.key"));
    }

    #[tokio::test]
    async fn test_unknown_code_keeps_listening() {
        let (sinks, mut messages) = MemorySink::factory();
        let (err_tx, mut errors) = mpsc::unbounded_channel();
        let server = MessageServer::bind(loopback(), sinks, move |e: &str| {
            let _ = err_tx.send(e.to_string());
        })
        .await
        .unwrap();

        let mut bad = TcpStream::connect(server.local_addr()).await.unwrap();
        bad.write_all(&0x0000_0009u32.to_be_bytes()).await.unwrap();
        let mut rest = Vec::new();
        bad.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());

        let report = errors.recv().await.unwrap();
        assert!(report.contains("unsupported protocol code: 9"), "{report}");
        assert!(!messages.recv().await.unwrap().complete);

        // a well-formed connection is still served
        let mut good = TcpStream::connect(server.local_addr()).await.unwrap();
        wire::write_protocol_code(&mut good, 0).await.unwrap();
        wire::write_biguint(&mut good, &BigUint::from(DEFAULT_SHAMIR_PRIME)).await.unwrap();
        good.shutdown().await.unwrap();

        let message = messages.recv().await.unwrap();
        assert!(message.complete);
        assert!(message.bytes.is_empty());
        assert!(errors.try_recv().is_err());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_accepting() {
        let (sinks, _messages) = MemorySink::factory();
        let server = MessageServer::bind(loopback(), sinks, |_: &str| {}).await.unwrap();
        let addr = server.local_addr();

        server.shutdown().await;
        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_bind_conflict() {
        let (sinks, _messages) = MemorySink::factory();
        let first = MessageServer::bind(loopback(), sinks.clone(), |_: &str| {}).await.unwrap();

        let taken = MessageServerBuilder::new().bind_addr(first.local_addr()).build();
        let err = MessageServer::bind(taken, sinks, |_: &str| {}).await.err().unwrap();
        assert!(matches!(err, ServerError::BindFailed { .. }));
    }
}

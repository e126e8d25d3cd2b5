//! # Blockwire
//!
//! Block-framed, peer-to-peer secure messaging over raw byte streams.
//!
//! A sender ("Alice") streams plaintext to a receiver ("Bob") over any
//! ordered, reliable byte stream. The stream is cut into tiny fixed-size
//! blocks and every block is encrypted under one of several interchangeable
//! schemes, selected per connection by a 4-byte protocol code:
//!
//! - **Shamir three-pass** (code 0): commutative exponentiation, two round
//!   trips per block, no pre-shared secret beyond a prime.
//! - **ElGamal** (code 1): re-randomized encryption under the receiver's
//!   published public value, no round trips.
//! - **RSA** (code 2): textbook RSA under the receiver's published modulus.
//!
//! ## Feature Flags
//!
//! - `client` (default): [`client::MessageSender`] and TCP dial helpers
//! - `server` (default): [`server::MessageServer`] and the per-connection
//!   receive state machine
//!
//! ## Modules
//!
//! - [`core`]: Constants, error taxonomy and collaborator traits
//! - [`transport`]: Wire primitives, the block framer, connection phases
//! - [`crypto`]: Big-integer helpers, keys and scheme mathematics
//! - [`protocols`]: Per-scheme block codecs and the protocol registry
//!
//! ## Wire Layout
//!
//! ```text
//! +---------------+-----------------+------+-------------+------+-------------+---
//! | protocol code | scheme preamble | meta | block data  | meta | block data  | ...
//! | 4 bytes (BE)  | (Shamir: P)     | 1 B  | per scheme  | 1 B  | per scheme  |
//! +---------------+-----------------+------+-------------+------+-------------+---
//! ```
//!
//! The stream has no terminator: the receiver treats end-of-input at a block
//! boundary as a clean end of message.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

pub mod crypto;
pub mod protocols;
pub mod transport;

// Sender API (feature-gated)
#[cfg(feature = "client")]
#[cfg_attr(docsrs, doc(cfg(feature = "client")))]
pub mod client;

// Receiver API (feature-gated)
#[cfg(feature = "server")]
#[cfg_attr(docsrs, doc(cfg(feature = "server")))]
pub mod server;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;

    pub use crate::crypto::{DomainParams, Keypair};
    pub use crate::protocols::{ProtocolCode, Registry, SchemeDecoder, SchemeEncoder};
    pub use crate::transport::{
        BlockSize, BlockTransfer, ConnectionPhase, FrameError, TransferStats, TransportError,
        TransportResult,
    };

    #[cfg(feature = "client")]
    pub use crate::client::{ClientError, MessageSender, MessageSenderBuilder, SenderConfig};

    #[cfg(feature = "server")]
    pub use crate::server::{
        MemorySink, MessageServer, MessageServerBuilder, ReceiverConfig, ServerConfig,
        ServerError, SessionError,
    };
}

// Re-export commonly used items at crate root
pub use core::{BlockwireError, ConfigError, CryptoError};
pub use protocols::ProtocolCode;
pub use transport::{BlockSize, BlockTransfer, TransportError};

//! Blockwire - Transport Layer
//!
//! This module carries plaintext blocks over a raw byte stream while staying
//! agnostic to how each scheme represents a block on the wire. It provides:
//!
//! - **Wire primitives**: protocol code and length-prefixed big integers ([`wire`])
//! - **Block framing**: [`BlockTransfer`] meta-byte framing over [`BlockSize`] blocks
//! - **Identity codec**: [`RawCodec`] for schemes with no cryptographic expansion
//! - **Connection state machine**: [`ConnectionPhase`] / [`ConnectionState`]
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │       Sender / Receiver session         │
//! ├─────────────────────────────────────────┤
//! │         Block framer (meta byte)        │  ← This module
//! ├─────────────────────────────────────────┤
//! │   Scheme codec (ElGamal/Shamir/RSA)     │
//! ├─────────────────────────────────────────┤
//! │         Byte stream (TCP)               │
//! └─────────────────────────────────────────┘
//! ```

mod block;
mod connection;
mod error;
pub mod wire;

pub use block::*;
pub use connection::*;
pub use error::*;

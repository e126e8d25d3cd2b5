//! Error types for the Blockwire protocol.

use std::path::PathBuf;

use thiserror::Error;

use crate::transport::TransportError;

/// Errors detected while setting up a sender, receiver or codec.
///
/// These are reported before any connection work begins and are fatal only
/// to the command or connection being configured.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The protocol code is not in the registered set.
    #[error("unsupported protocol code: {0}")]
    UnknownProtocol(u32),

    /// The protocol is known but this receiver was not configured for it.
    #[error("protocol {0} is not enabled on this receiver")]
    SchemeNotConfigured(String),

    /// A sender parameter required by the chosen protocol is absent.
    #[error("missing parameter for {protocol}: {parameter}")]
    MissingParameter {
        /// Protocol being configured.
        protocol: String,
        /// Name of the absent parameter.
        parameter: &'static str,
    },

    /// Block size outside `1..=255`.
    #[error("invalid block size {0}: must be between 1 and 255")]
    InvalidBlockSize(usize),

    /// The modulus cannot hold every value of a block.
    #[error("block size {block_size} needs a modulus wider than {needed_bits} bits, got {modulus_bits}")]
    BlockTooLargeForModulus {
        /// Configured block size in bytes.
        block_size: usize,
        /// Bits the modulus must exceed.
        needed_bits: u64,
        /// Actual modulus width in bits.
        modulus_bits: u64,
    },

    /// Domain parameters failed structural validation.
    #[error("invalid domain parameters: {0}")]
    InvalidDomainParams(String),

    /// RSA primes unusable for key derivation.
    #[error("invalid RSA key: {0}")]
    InvalidRsaKey(String),

    /// Reading or writing a persisted key failed.
    #[error("key file {path}: {source}")]
    KeyFile {
        /// File being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The persisted key file does not hold a usable integer.
    #[error("malformed key file {0}")]
    MalformedKey(PathBuf),
}

/// Errors in the scheme mathematics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Exponent has no inverse modulo the group order.
    #[error("value is not invertible modulo the group order")]
    NotInvertible,

    /// Recovered plaintext does not fit the block.
    ///
    /// Signals that the peer used different domain parameters or key.
    #[error("decoded value has {bits} bits, block holds {max_bits}; peer key or parameters mismatch")]
    ValueTooLarge {
        /// Bit length of the recovered value.
        bits: u64,
        /// Bits available in the block.
        max_bits: u64,
    },

    /// Plaintext integer is not below the modulus.
    #[error("message does not fit below the modulus")]
    MessageOutOfRange,
}

/// Top-level Blockwire errors.
#[derive(Debug, Error)]
pub enum BlockwireError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Crypto error.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

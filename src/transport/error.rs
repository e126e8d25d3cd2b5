//! Transport layer error types.
//!
//! Every error here aborts the current connection only. End-of-stream at a
//! block boundary is not an error and never surfaces as one of these.

use std::io;

use thiserror::Error;

use crate::core::CryptoError;

/// Framing violations detected on the wire.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Meta byte claims more bytes than a block holds.
    #[error("meta byte {meta} exceeds block size {block_size}")]
    MetaOutOfRange {
        /// Received meta byte.
        meta: u8,
        /// Configured block size.
        block_size: usize,
    },

    /// Stream ended inside a block or field.
    #[error("stream ended inside {0}")]
    Truncated(&'static str),

    /// Length prefix larger than any field we accept.
    #[error("big-integer field of {0} bytes exceeds limit")]
    FieldTooLarge(usize),

    /// Decoder filled fewer bytes than the meta byte declared.
    #[error("meta byte declared {declared} bytes, decoder recovered {decoded}")]
    LengthMismatch {
        /// Count from the meta byte.
        declared: usize,
        /// Count reported by the decoder.
        decoded: usize,
    },

    /// Scheme preamble is unusable.
    #[error("invalid scheme preamble: {0}")]
    InvalidPreamble(String),
}

/// Transport layer errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Frame parsing error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// Cryptographic consistency error (likely key/parameter mismatch).
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// I/O error on the connection.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// Reading the upstream plaintext source failed.
    #[error("reading message source failed: {0}")]
    Source(#[source] io::Error),

    /// Writing to the output sink failed.
    #[error("writing to output failed: {0}")]
    Sink(#[source] io::Error),
}

impl TransportError {
    /// Check if this error points at mismatched keys or domain parameters.
    pub fn is_crypto_mismatch(&self) -> bool {
        matches!(self, TransportError::Crypto(CryptoError::ValueTooLarge { .. }))
    }

    /// Check if this error came from the sender's plaintext source.
    pub fn is_source_error(&self) -> bool {
        matches!(self, TransportError::Source(_))
    }

    /// Check if the peer violated the framing rules.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, TransportError::Frame(_) | TransportError::Crypto(_))
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Map an I/O error from `read_exact` into a truncation when the peer hung up.
pub(crate) fn truncated(what: &'static str) -> impl FnOnce(io::Error) -> TransportError {
    move |e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            FrameError::Truncated(what).into()
        } else {
            TransportError::Io(e)
        }
    }
}

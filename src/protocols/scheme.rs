//! Closed dispatch over the registered schemes.

use super::code::ProtocolCode;
use super::elgamal::{ElGamalDecoder, ElGamalEncoder};
use super::rsa::{RsaDecoder, RsaEncoder};
use super::shamir::{ShamirDecoder, ShamirEncoder};
use crate::core::{BlockDecoder, BlockEncoder, ByteStream};
use crate::transport::{BlockSize, TransportResult};

/// Sending codec for whichever scheme a connection negotiated.
#[derive(Debug, Clone)]
pub enum SchemeEncoder {
    /// Shamir three-pass.
    Shamir(ShamirEncoder),
    /// ElGamal.
    ElGamal(ElGamalEncoder),
    /// RSA.
    Rsa(RsaEncoder),
}

impl SchemeEncoder {
    /// Code announced in the connection preamble.
    pub fn protocol_code(&self) -> ProtocolCode {
        match self {
            Self::Shamir(_) => ProtocolCode::Shamir,
            Self::ElGamal(_) => ProtocolCode::ElGamal,
            Self::Rsa(_) => ProtocolCode::Rsa,
        }
    }
}

impl BlockEncoder for SchemeEncoder {
    fn block_size(&self) -> BlockSize {
        match self {
            Self::Shamir(c) => c.block_size(),
            Self::ElGamal(c) => c.block_size(),
            Self::Rsa(c) => c.block_size(),
        }
    }

    async fn write_preamble<S: ByteStream>(&mut self, stream: &mut S) -> TransportResult<()> {
        match self {
            Self::Shamir(c) => c.write_preamble(stream).await,
            Self::ElGamal(c) => c.write_preamble(stream).await,
            Self::Rsa(c) => c.write_preamble(stream).await,
        }
    }

    async fn encode_block<S: ByteStream>(&mut self, block: &[u8], stream: &mut S) -> TransportResult<()> {
        match self {
            Self::Shamir(c) => c.encode_block(block, stream).await,
            Self::ElGamal(c) => c.encode_block(block, stream).await,
            Self::Rsa(c) => c.encode_block(block, stream).await,
        }
    }
}

/// Receiving codec selected by the registry.
#[derive(Debug, Clone)]
pub enum SchemeDecoder {
    /// Shamir three-pass.
    Shamir(ShamirDecoder),
    /// ElGamal.
    ElGamal(ElGamalDecoder),
    /// RSA.
    Rsa(RsaDecoder),
}

impl SchemeDecoder {
    /// Scheme this decoder speaks.
    pub fn protocol_code(&self) -> ProtocolCode {
        match self {
            Self::Shamir(_) => ProtocolCode::Shamir,
            Self::ElGamal(_) => ProtocolCode::ElGamal,
            Self::Rsa(_) => ProtocolCode::Rsa,
        }
    }
}

impl BlockDecoder for SchemeDecoder {
    fn block_size(&self) -> BlockSize {
        match self {
            Self::Shamir(c) => c.block_size(),
            Self::ElGamal(c) => c.block_size(),
            Self::Rsa(c) => c.block_size(),
        }
    }

    async fn read_preamble<S: ByteStream>(&mut self, stream: &mut S) -> TransportResult<()> {
        match self {
            Self::Shamir(c) => c.read_preamble(stream).await,
            Self::ElGamal(c) => c.read_preamble(stream).await,
            Self::Rsa(c) => c.read_preamble(stream).await,
        }
    }

    async fn decode_block<S: ByteStream>(&mut self, stream: &mut S, buf: &mut [u8]) -> TransportResult<usize> {
        match self {
            Self::Shamir(c) => c.decode_block(stream, buf).await,
            Self::ElGamal(c) => c.decode_block(stream, buf).await,
            Self::Rsa(c) => c.decode_block(stream, buf).await,
        }
    }
}

//! Shamir three-pass block codec.
//!
//! The sender announces the shared prime once, then every block costs a
//! full round trip:
//!
//! ```text
//! preamble:  P          ───►
//! block:     meta       ───►
//!            pass1      ───►
//!                       ◄───  pass2
//!            pass3      ───►
//! ```
//!
//! Both sides draw a fresh exponent for every block.

use num_bigint::BigUint;
use rand::rngs::OsRng;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace};

use crate::core::{BlockDecoder, BlockEncoder, ByteStream, ConfigError, SHAMIR_BLOCK_SIZE};
use crate::crypto::arith::{block_to_int, check_modulus, int_to_block};
use crate::crypto::shamir::validate_shared_prime;
use crate::crypto::ThreePassKey;
use crate::transport::{wire, BlockSize, FrameError, TransportResult};

fn validate_prime(prime: &BigUint, block_size: BlockSize) -> Result<(), ConfigError> {
    validate_shared_prime(prime).map_err(ConfigError::InvalidDomainParams)?;
    check_modulus(block_size, prime)
}

/// Alice's side: announces the prime and drives each exchange.
#[derive(Debug, Clone)]
pub struct ShamirEncoder {
    prime: BigUint,
    block_size: BlockSize,
}

impl ShamirEncoder {
    /// Create an encoder over `prime` with the standard Shamir block size.
    pub fn new(prime: BigUint) -> Result<Self, ConfigError> {
        Self::with_block_size(prime, BlockSize::new(SHAMIR_BLOCK_SIZE)?)
    }

    /// Create an encoder with a custom block size.
    pub fn with_block_size(prime: BigUint, block_size: BlockSize) -> Result<Self, ConfigError> {
        validate_prime(&prime, block_size)?;
        Ok(Self { prime, block_size })
    }

    /// Shared prime announced to the receiver.
    pub fn prime(&self) -> &BigUint {
        &self.prime
    }
}

impl BlockEncoder for ShamirEncoder {
    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    async fn write_preamble<S: ByteStream>(&mut self, stream: &mut S) -> TransportResult<()> {
        debug!(prime = %self.prime, "announcing shared prime");
        wire::write_biguint(stream, &self.prime).await
    }

    async fn encode_block<S: ByteStream>(&mut self, block: &[u8], stream: &mut S) -> TransportResult<()> {
        let key = ThreePassKey::generate(&self.prime, &mut OsRng)?;

        let pass1 = key.lock(&block_to_int(block))?;
        wire::write_biguint(stream, &pass1).await?;
        stream.flush().await?;
        trace!(%pass1, "pass 1 sent");

        let pass2 = wire::read_biguint(stream).await?;
        trace!(%pass2, "pass 2 received");

        let pass3 = key.unlock(&pass2)?;
        wire::write_biguint(stream, &pass3).await?;
        trace!(%pass3, "pass 3 sent");
        Ok(())
    }
}

/// Bob's side: learns the prime from the preamble and answers each exchange.
#[derive(Debug, Clone)]
pub struct ShamirDecoder {
    prime: Option<BigUint>,
    block_size: BlockSize,
}

impl ShamirDecoder {
    /// Create a decoder with the standard Shamir block size.
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self::with_block_size(BlockSize::new(SHAMIR_BLOCK_SIZE)?))
    }

    /// Create a decoder with a custom block size.
    pub fn with_block_size(block_size: BlockSize) -> Self {
        Self {
            prime: None,
            block_size,
        }
    }

    /// Prime received in the preamble, if any yet.
    pub fn prime(&self) -> Option<&BigUint> {
        self.prime.as_ref()
    }
}

impl BlockDecoder for ShamirDecoder {
    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    async fn read_preamble<S: ByteStream>(&mut self, stream: &mut S) -> TransportResult<()> {
        let prime = wire::read_biguint(stream).await?;
        validate_prime(&prime, self.block_size)
            .map_err(|e| FrameError::InvalidPreamble(e.to_string()))?;
        debug!(%prime, "shared prime received");
        self.prime = Some(prime);
        Ok(())
    }

    async fn decode_block<S: ByteStream>(&mut self, stream: &mut S, buf: &mut [u8]) -> TransportResult<usize> {
        let prime = self
            .prime
            .as_ref()
            .ok_or_else(|| FrameError::InvalidPreamble("block before shared prime".to_string()))?;
        let key = ThreePassKey::generate(prime, &mut OsRng)?;

        let pass1 = wire::read_biguint(stream).await?;
        let pass2 = key.lock(&pass1)?;
        wire::write_biguint(stream, &pass2).await?;
        stream.flush().await?;

        let pass3 = wire::read_biguint(stream).await?;
        let message = key.unlock(&pass3)?;
        int_to_block(&message, buf)?;
        Ok(buf.len())
    }
}

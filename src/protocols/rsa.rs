//! RSA block codec: one ciphertext integer per block.

use std::sync::Arc;

use tracing::trace;

use crate::core::{BlockDecoder, BlockEncoder, ByteStream, ConfigError, RSA_BLOCK_SIZE};
use crate::crypto::arith::{block_to_int, check_modulus, int_to_block};
use crate::crypto::{RsaPrivateKey, RsaPublicKey};
use crate::transport::{wire, BlockSize, TransportResult};

/// Sender side, holding the receiver's published modulus.
#[derive(Debug, Clone)]
pub struct RsaEncoder {
    key: RsaPublicKey,
    block_size: BlockSize,
}

impl RsaEncoder {
    /// Create an encoder with the standard RSA block size.
    pub fn new(key: RsaPublicKey) -> Result<Self, ConfigError> {
        let block_size = BlockSize::new(RSA_BLOCK_SIZE)?;
        check_modulus(block_size, key.n())?;
        Ok(Self { key, block_size })
    }
}

impl BlockEncoder for RsaEncoder {
    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    async fn encode_block<S: ByteStream>(&mut self, block: &[u8], stream: &mut S) -> TransportResult<()> {
        let ciphertext = self.key.encrypt(&block_to_int(block))?;
        trace!(%ciphertext, "rsa block encrypted");
        wire::write_biguint(stream, &ciphertext).await
    }
}

/// Receiver side, sharing one private key across connections.
#[derive(Debug, Clone)]
pub struct RsaDecoder {
    key: Arc<RsaPrivateKey>,
    block_size: BlockSize,
}

impl RsaDecoder {
    /// Create a decoder with the standard RSA block size.
    pub fn new(key: Arc<RsaPrivateKey>) -> Result<Self, ConfigError> {
        let block_size = BlockSize::new(RSA_BLOCK_SIZE)?;
        check_modulus(block_size, key.public().n())?;
        Ok(Self { key, block_size })
    }
}

impl BlockDecoder for RsaDecoder {
    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    async fn decode_block<S: ByteStream>(&mut self, stream: &mut S, buf: &mut [u8]) -> TransportResult<usize> {
        let ciphertext = wire::read_biguint(stream).await?;
        let message = self.key.decrypt(&ciphertext)?;
        int_to_block(&message, buf)?;
        Ok(buf.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::BlockTransfer;
    use num_bigint::BigUint;

    fn key() -> Arc<RsaPrivateKey> {
        Arc::new(
            RsaPrivateKey::from_primes(&BigUint::from(65_537u32), &BigUint::from(65_539u32)).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_roundtrip_through_framer() {
        let key = key();
        let mut encoder = RsaEncoder::new(key.public().clone()).unwrap();
        let mut decoder = RsaDecoder::new(key).unwrap();
        let framer = BlockTransfer::new(encoder.block_size());

        let message = b"\xff\xff\xff\xffrsa block codec";
        let (mut alice, mut bob) = tokio::io::duplex(4096);
        let mut source = &message[..];
        let sent = framer.write_blocks(&mut source, &mut alice, &mut encoder).await.unwrap();
        drop(alice);

        let mut out = Vec::new();
        let received = framer.read_blocks(&mut bob, &mut decoder, &mut out).await.unwrap();
        assert_eq!(out, message);
        assert_eq!(sent, received);
        assert_eq!(received.blocks, 5);
    }

    #[test]
    fn test_modulus_must_exceed_block() {
        // 65537 * 65539 has 33 bits, enough for a 4-byte block
        assert!(RsaEncoder::new(key().public().clone()).is_ok());

        let narrow = RsaPublicKey::new(BigUint::from(70_001u32)).unwrap();
        assert!(matches!(
            RsaEncoder::new(narrow),
            Err(ConfigError::BlockTooLargeForModulus { .. })
        ));
    }
}

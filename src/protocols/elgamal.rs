//! ElGamal block codec.
//!
//! Every block is encrypted under a fresh ephemeral secret and sent as two
//! length-prefixed integers `R`, `E`. No reply is expected from the peer.

use std::sync::Arc;

use rand::rngs::OsRng;
use tracing::trace;

use crate::core::{BlockDecoder, BlockEncoder, ByteStream, ConfigError, ELGAMAL_BLOCK_SIZE};
use crate::crypto::arith::{block_to_int, check_modulus, int_to_block};
use crate::crypto::{Ciphertext, ElGamalDecryptor, ElGamalEncryptor};
use crate::transport::{wire, BlockSize, TransportResult};

/// Alice's side of the ElGamal codec.
#[derive(Debug, Clone)]
pub struct ElGamalEncoder {
    encryptor: ElGamalEncryptor,
    block_size: BlockSize,
}

impl ElGamalEncoder {
    /// Create an encoder with the standard ElGamal block size.
    pub fn new(encryptor: ElGamalEncryptor) -> Result<Self, ConfigError> {
        Self::with_block_size(encryptor, BlockSize::new(ELGAMAL_BLOCK_SIZE)?)
    }

    /// Create an encoder with a custom block size.
    pub fn with_block_size(encryptor: ElGamalEncryptor, block_size: BlockSize) -> Result<Self, ConfigError> {
        check_modulus(block_size, encryptor.params().p())?;
        Ok(Self {
            encryptor,
            block_size,
        })
    }
}

impl BlockEncoder for ElGamalEncoder {
    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    async fn encode_block<S: ByteStream>(&mut self, block: &[u8], stream: &mut S) -> TransportResult<()> {
        let message = block_to_int(block);
        let Ciphertext { r, e } = self.encryptor.encrypt(&message, &mut OsRng)?;
        trace!(%r, %e, "elgamal block encrypted");

        wire::write_biguint(stream, &r).await?;
        wire::write_biguint(stream, &e).await?;
        Ok(())
    }
}

/// Bob's side of the ElGamal codec, sharing one keypair across connections.
#[derive(Debug, Clone)]
pub struct ElGamalDecoder {
    decryptor: Arc<ElGamalDecryptor>,
    block_size: BlockSize,
}

impl ElGamalDecoder {
    /// Create a decoder with the standard ElGamal block size.
    pub fn new(decryptor: Arc<ElGamalDecryptor>) -> Result<Self, ConfigError> {
        Self::with_block_size(decryptor, BlockSize::new(ELGAMAL_BLOCK_SIZE)?)
    }

    /// Create a decoder with a custom block size.
    pub fn with_block_size(decryptor: Arc<ElGamalDecryptor>, block_size: BlockSize) -> Result<Self, ConfigError> {
        check_modulus(block_size, decryptor.params().p())?;
        Ok(Self {
            decryptor,
            block_size,
        })
    }
}

impl BlockDecoder for ElGamalDecoder {
    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    async fn decode_block<S: ByteStream>(&mut self, stream: &mut S, buf: &mut [u8]) -> TransportResult<usize> {
        let r = wire::read_biguint(stream).await?;
        let e = wire::read_biguint(stream).await?;

        let message = self.decryptor.decrypt(&Ciphertext { r, e });
        int_to_block(&message, buf)?;
        trace!(?buf, "elgamal block decrypted");
        Ok(buf.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CryptoError, DEFAULT_SHAMIR_PRIME};
    use crate::crypto::DomainParams;
    use crate::transport::{BlockTransfer, TransportError};
    use num_bigint::BigUint;

    fn domain() -> DomainParams {
        DomainParams::new(BigUint::from(DEFAULT_SHAMIR_PRIME), BigUint::from(3u32)).unwrap()
    }

    fn codec_pair() -> (ElGamalEncoder, ElGamalDecoder) {
        let bob = Arc::new(ElGamalDecryptor::generate(domain(), &mut OsRng));
        let alice = ElGamalEncryptor::new(domain(), bob.public().clone()).unwrap();
        (
            ElGamalEncoder::new(alice).unwrap(),
            ElGamalDecoder::new(bob).unwrap(),
        )
    }

    async fn transfer(message: &[u8], encoder: &mut ElGamalEncoder, decoder: &mut ElGamalDecoder) -> TransportResult<Vec<u8>> {
        let framer = BlockTransfer::new(encoder.block_size());
        let (mut alice, mut bob) = tokio::io::duplex(1 << 16);
        let mut source = message;
        framer.write_blocks(&mut source, &mut alice, encoder).await?;
        drop(alice);

        let mut out = Vec::new();
        framer.read_blocks(&mut bob, decoder, &mut out).await?;
        Ok(out)
    }

    #[tokio::test]
    async fn test_roundtrip_through_framer() {
        let (mut encoder, mut decoder) = codec_pair();
        let message = b"hello, bob \x00\xff";
        let out = transfer(message, &mut encoder, &mut decoder).await.unwrap();
        assert_eq!(out, message);
    }

    #[tokio::test]
    async fn test_same_block_encrypts_differently() {
        let (mut encoder, _) = codec_pair();
        let (mut a, mut b) = tokio::io::duplex(1024);
        encoder.encode_block(&[0x41], &mut a).await.unwrap();
        encoder.encode_block(&[0x41], &mut a).await.unwrap();

        let first = (wire::read_biguint(&mut b).await.unwrap(), wire::read_biguint(&mut b).await.unwrap());
        let second = (wire::read_biguint(&mut b).await.unwrap(), wire::read_biguint(&mut b).await.unwrap());
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_wrong_key_is_detected() {
        let (mut encoder, _) = codec_pair();
        let (_, mut stranger) = codec_pair();

        let message: Vec<u8> = (0u8..=255).collect();
        let err = transfer(&message, &mut encoder, &mut stranger).await.unwrap_err();
        assert!(matches!(err, TransportError::Crypto(CryptoError::ValueTooLarge { .. })));
        assert!(err.is_crypto_mismatch());
    }

    #[test]
    fn test_modulus_too_small_for_block() {
        let params = DomainParams::new(BigUint::from(251u32), BigUint::from(6u32)).unwrap();
        let alice = ElGamalEncryptor::new(params, BigUint::from(7u32)).unwrap();
        assert!(matches!(
            ElGamalEncoder::new(alice),
            Err(ConfigError::BlockTooLargeForModulus { .. })
        ));
    }
}

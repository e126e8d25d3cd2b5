//! Protocol code dispatch for both roles.
//!
//! The receiving side holds the key material of every enabled scheme and
//! hands out a fresh [`SchemeDecoder`] per connection. The sending side
//! turns a [`SenderSetup`] into a [`SchemeEncoder`], loading the peer's
//! published key where the scheme needs one.

use std::path::PathBuf;
use std::sync::Arc;

use num_bigint::BigUint;
use tracing::debug;

use super::code::ProtocolCode;
use super::elgamal::{ElGamalDecoder, ElGamalEncoder};
use super::rsa::{RsaDecoder, RsaEncoder};
use super::scheme::{SchemeDecoder, SchemeEncoder};
use super::shamir::{ShamirDecoder, ShamirEncoder};
use crate::core::{ConfigError, DEFAULT_ELGAMAL_KEY_FILE, DEFAULT_RSA_KEY_FILE, DEFAULT_SHAMIR_PRIME};
use crate::crypto::{DomainParams, ElGamalDecryptor, ElGamalEncryptor, PublicKeyFile, RsaPrivateKey, RsaPublicKey};

/// Everything a sender needs to build its codec.
#[derive(Debug, Clone)]
pub struct SenderSetup {
    /// Scheme to speak.
    pub protocol: ProtocolCode,
    /// Prime announced by a Shamir sender.
    pub shamir_prime: BigUint,
    /// Domain shared with an ElGamal receiver.
    pub domain: Option<DomainParams>,
    /// Where the receiver published its public value.
    ///
    /// `None` falls back to the scheme's default file name.
    pub peer_key_file: Option<PathBuf>,
}

impl Default for SenderSetup {
    fn default() -> Self {
        Self {
            protocol: ProtocolCode::Shamir,
            shamir_prime: BigUint::from(DEFAULT_SHAMIR_PRIME),
            domain: None,
            peer_key_file: None,
        }
    }
}

impl SenderSetup {
    fn key_file(&self, default: &str) -> PublicKeyFile {
        PublicKeyFile::new(self.peer_key_file.clone().unwrap_or_else(|| default.into()))
    }
}

/// Receiver-side table from protocol code to decoder.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    shamir: bool,
    elgamal: Option<Arc<ElGamalDecryptor>>,
    rsa: Option<Arc<RsaPrivateKey>>,
}

impl Registry {
    /// Registry with no scheme enabled.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Enable Shamir three-pass. It needs no receiver key material.
    pub fn with_shamir(mut self) -> Self {
        self.shamir = true;
        self
    }

    /// Enable ElGamal with a keypair shared by every connection.
    pub fn with_elgamal(mut self, decryptor: ElGamalDecryptor) -> Self {
        self.elgamal = Some(Arc::new(decryptor));
        self
    }

    /// Enable RSA with the given private key.
    pub fn with_rsa(mut self, key: RsaPrivateKey) -> Self {
        self.rsa = Some(Arc::new(key));
        self
    }

    /// Schemes this registry answers to.
    pub fn enabled(&self) -> Vec<ProtocolCode> {
        ProtocolCode::ALL
            .into_iter()
            .filter(|code| match code {
                ProtocolCode::Shamir => self.shamir,
                ProtocolCode::ElGamal => self.elgamal.is_some(),
                ProtocolCode::Rsa => self.rsa.is_some(),
            })
            .collect()
    }

    /// Fresh decoder for a code read off the wire.
    pub fn decoder_for(&self, code: u32) -> Result<SchemeDecoder, ConfigError> {
        let protocol = ProtocolCode::try_from(code)?;
        let not_configured = || ConfigError::SchemeNotConfigured(protocol.to_string());

        let decoder = match protocol {
            ProtocolCode::Shamir if self.shamir => SchemeDecoder::Shamir(ShamirDecoder::new()?),
            ProtocolCode::ElGamal => {
                let decryptor = self.elgamal.as_ref().ok_or_else(not_configured)?;
                SchemeDecoder::ElGamal(ElGamalDecoder::new(Arc::clone(decryptor))?)
            }
            ProtocolCode::Rsa => {
                let key = self.rsa.as_ref().ok_or_else(not_configured)?;
                SchemeDecoder::Rsa(RsaDecoder::new(Arc::clone(key))?)
            }
            ProtocolCode::Shamir => return Err(not_configured()),
        };
        debug!(%protocol, "decoder selected");
        Ok(decoder)
    }

    /// Build the sending codec described by `setup`.
    ///
    /// ElGamal and RSA read the receiver's public value from its key file
    /// here, so a missing or malformed file is reported before any
    /// connection is opened.
    pub fn encoder_for(setup: &SenderSetup) -> Result<SchemeEncoder, ConfigError> {
        let encoder = match setup.protocol {
            ProtocolCode::Shamir => SchemeEncoder::Shamir(ShamirEncoder::new(setup.shamir_prime.clone())?),
            ProtocolCode::ElGamal => {
                let domain = setup.domain.clone().ok_or(ConfigError::MissingParameter {
                    protocol: ProtocolCode::ElGamal.to_string(),
                    parameter: "domain parameters",
                })?;
                let peer_public = setup.key_file(DEFAULT_ELGAMAL_KEY_FILE).read()?;
                SchemeEncoder::ElGamal(ElGamalEncoder::new(ElGamalEncryptor::new(domain, peer_public)?)?)
            }
            ProtocolCode::Rsa => {
                let n = setup.key_file(DEFAULT_RSA_KEY_FILE).read()?;
                SchemeEncoder::Rsa(RsaEncoder::new(RsaPublicKey::new(n)?)?)
            }
        };
        debug!(protocol = %setup.protocol, "encoder built");
        Ok(encoder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BlockDecoder, BlockEncoder};
    use crate::transport::{BlockTransfer, TransportError};
    use rand::rngs::OsRng;
    use tokio::io::AsyncWriteExt;

    fn domain() -> DomainParams {
        DomainParams::new(BigUint::from(DEFAULT_SHAMIR_PRIME), BigUint::from(3u32)).unwrap()
    }

    fn rsa_key() -> RsaPrivateKey {
        RsaPrivateKey::from_primes(&BigUint::from(65_537u32), &BigUint::from(65_539u32)).unwrap()
    }

    /// Registry with every scheme enabled, public values written under `dir`.
    fn full_setup(dir: &tempfile::TempDir) -> (Registry, PathBuf, PathBuf) {
        let bob = ElGamalDecryptor::generate(domain(), &mut OsRng);
        let rsa = rsa_key();

        let elgamal_file = dir.path().join("elgamal.key");
        let rsa_file = dir.path().join("rsa.key");
        PublicKeyFile::new(&elgamal_file).write(bob.public()).unwrap();
        PublicKeyFile::new(&rsa_file).write(rsa.public().n()).unwrap();

        let registry = Registry::empty().with_shamir().with_elgamal(bob).with_rsa(rsa);
        (registry, elgamal_file, rsa_file)
    }

    async fn roundtrip(
        mut encoder: SchemeEncoder,
        mut decoder: SchemeDecoder,
        message: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        let framer = BlockTransfer::new(encoder.block_size());
        let (mut alice, mut bob) = tokio::io::duplex(512);

        let send = async {
            encoder.write_preamble(&mut alice).await?;
            let mut source = message;
            framer.write_blocks(&mut source, &mut alice, &mut encoder).await?;
            alice.shutdown().await?;
            Ok::<_, TransportError>(())
        };
        let receive = async {
            let mut out = Vec::new();
            decoder.read_preamble(&mut bob).await?;
            framer.read_blocks(&mut bob, &mut decoder, &mut out).await?;
            Ok::<_, TransportError>(out)
        };

        let (sent, received) = tokio::join!(send, receive);
        sent?;
        received
    }

    #[tokio::test]
    async fn test_every_scheme_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let (registry, elgamal_file, rsa_file) = full_setup(&dir);

        for protocol in ProtocolCode::ALL {
            let setup = SenderSetup {
                protocol,
                domain: Some(domain()),
                peer_key_file: match protocol {
                    ProtocolCode::Shamir => None,
                    ProtocolCode::ElGamal => Some(elgamal_file.clone()),
                    ProtocolCode::Rsa => Some(rsa_file.clone()),
                },
                ..SenderSetup::default()
            };
            let encoder = Registry::encoder_for(&setup).unwrap();
            let bs = encoder.block_size().get();

            for len in [0, 1, bs - 1, bs, bs + 1] {
                let message: Vec<u8> = (0..len).map(|i| 0xA0u8.wrapping_add(i as u8)).collect();
                let decoder = registry.decoder_for(protocol.as_u32()).unwrap();
                assert_eq!(decoder.protocol_code(), protocol);

                let out = roundtrip(encoder.clone(), decoder, &message).await.unwrap();
                assert_eq!(out, message, "{protocol} with {len} bytes");
            }
        }
    }

    #[test]
    fn test_unknown_code() {
        let registry = Registry::empty().with_shamir();
        assert!(matches!(
            registry.decoder_for(7),
            Err(ConfigError::UnknownProtocol(7))
        ));
    }

    #[test]
    fn test_scheme_not_configured() {
        let registry = Registry::empty().with_shamir();
        assert_eq!(registry.enabled(), vec![ProtocolCode::Shamir]);
        assert!(matches!(
            registry.decoder_for(ProtocolCode::ElGamal.as_u32()),
            Err(ConfigError::SchemeNotConfigured(_))
        ));
        assert!(matches!(
            Registry::empty().decoder_for(ProtocolCode::Shamir.as_u32()),
            Err(ConfigError::SchemeNotConfigured(_))
        ));
    }

    #[test]
    fn test_sender_missing_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let setup = SenderSetup {
            protocol: ProtocolCode::Rsa,
            peer_key_file: Some(dir.path().join("nobody.key")),
            ..SenderSetup::default()
        };
        assert!(matches!(
            Registry::encoder_for(&setup),
            Err(ConfigError::KeyFile { .. })
        ));
    }

    #[test]
    fn test_elgamal_sender_needs_domain() {
        let setup = SenderSetup {
            protocol: ProtocolCode::ElGamal,
            ..SenderSetup::default()
        };
        assert!(matches!(
            Registry::encoder_for(&setup),
            Err(ConfigError::MissingParameter { .. })
        ));
    }
}

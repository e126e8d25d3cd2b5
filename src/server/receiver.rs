//! Receiver scheme configuration and key publication.

use std::path::PathBuf;

use num_bigint::BigUint;
use rand::rngs::OsRng;
use tracing::info;

use crate::core::{ConfigError, DEFAULT_ELGAMAL_KEY_FILE, DEFAULT_RSA_KEY_FILE};
use crate::crypto::{DomainParams, ElGamalDecryptor, PublicKeyFile, RsaPrivateKey};
use crate::protocols::Registry;

/// ElGamal receiver settings.
#[derive(Debug, Clone)]
pub struct ElGamalReceiverConfig {
    /// Shared domain parameters.
    pub domain: DomainParams,
    /// Where to publish the receiver's public value.
    pub key_file: PathBuf,
}

impl ElGamalReceiverConfig {
    /// Publish to the default key file.
    pub fn new(domain: DomainParams) -> Self {
        Self {
            domain,
            key_file: PathBuf::from(DEFAULT_ELGAMAL_KEY_FILE),
        }
    }
}

/// RSA receiver settings.
#[derive(Clone)]
pub struct RsaReceiverConfig {
    /// First prime.
    pub p: BigUint,
    /// Second prime.
    pub q: BigUint,
    /// Where to publish the modulus.
    pub key_file: PathBuf,
}

impl RsaReceiverConfig {
    /// Publish to the default key file.
    pub fn new(p: BigUint, q: BigUint) -> Self {
        Self {
            p,
            q,
            key_file: PathBuf::from(DEFAULT_RSA_KEY_FILE),
        }
    }
}

impl std::fmt::Debug for RsaReceiverConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaReceiverConfig")
            .field("key_file", &self.key_file)
            .finish_non_exhaustive()
    }
}

/// Which schemes a receiver answers to.
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    /// Accept Shamir three-pass connections.
    pub shamir: bool,
    /// Accept ElGamal connections.
    pub elgamal: Option<ElGamalReceiverConfig>,
    /// Accept RSA connections.
    pub rsa: Option<RsaReceiverConfig>,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            shamir: true,
            elgamal: None,
            rsa: None,
        }
    }
}

impl ReceiverConfig {
    /// Generate key material and publish public values.
    ///
    /// This is the only place the receiver touches the filesystem. Every
    /// connection served from the returned registry shares the keys drawn
    /// here.
    pub fn build_registry(&self) -> Result<Registry, ConfigError> {
        let mut registry = Registry::empty();
        if self.shamir {
            registry = registry.with_shamir();
        }

        if let Some(elgamal) = &self.elgamal {
            let decryptor = ElGamalDecryptor::generate(elgamal.domain.clone(), &mut OsRng);
            PublicKeyFile::new(&elgamal.key_file).write(decryptor.public())?;
            info!(public = %decryptor.public(), "elgamal receiver ready");
            registry = registry.with_elgamal(decryptor);
        }

        if let Some(rsa) = &self.rsa {
            let key = RsaPrivateKey::from_primes(&rsa.p, &rsa.q)?;
            PublicKeyFile::new(&rsa.key_file).write(key.public().n())?;
            info!(n = %key.public().n(), "rsa receiver ready");
            registry = registry.with_rsa(key);
        }

        Ok(registry)
    }
}

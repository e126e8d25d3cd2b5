//! Domain parameters, role keypairs and the persisted public-key store.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use tracing::info;

use super::arith::random_in_range;
use crate::core::ConfigError;

/// Shared discrete-log domain `(P, G)`, immutable once constructed.
///
/// Only structural checks happen here; primality of `P` and the order of
/// `G` are the responsibility of whoever chose the parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParams {
    p: BigUint,
    g: BigUint,
}

impl DomainParams {
    /// Validate and wrap domain parameters.
    pub fn new(p: BigUint, g: BigUint) -> Result<Self, ConfigError> {
        validate_prime_shape(&p).map_err(ConfigError::InvalidDomainParams)?;
        let p_minus_one = &p - 1u32;
        if g <= BigUint::one() || g >= p_minus_one {
            return Err(ConfigError::InvalidDomainParams(format!(
                "generator {g} must lie strictly between 1 and P-1"
            )));
        }
        Ok(Self { p, g })
    }

    /// Prime modulus.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// Generator.
    pub fn g(&self) -> &BigUint {
        &self.g
    }
}

/// Structural checks on a prime modulus: odd and at least 5.
pub(crate) fn validate_prime_shape(p: &BigUint) -> Result<(), String> {
    if *p < BigUint::from(5u32) {
        return Err(format!("modulus {p} is too small"));
    }
    if p.is_even() {
        return Err(format!("modulus {p} is even"));
    }
    Ok(())
}

/// Private exponent with its public value `G^secret mod P`.
///
/// The secret never leaves process memory and is never printed.
#[derive(Clone)]
pub struct Keypair {
    secret: BigUint,
    public: BigUint,
}

impl Keypair {
    /// Draw a secret uniformly from `[1, P-2]`.
    pub fn generate<R>(params: &DomainParams, rng: &mut R) -> Self
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let secret = random_in_range(rng, &BigUint::one(), &(params.p() - 1u32));
        Self::from_secret(params, secret)
    }

    /// Build a keypair from a known secret.
    pub fn from_secret(params: &DomainParams, secret: BigUint) -> Self {
        let public = params.g().modpow(&secret, params.p());
        Self { secret, public }
    }

    /// Public value.
    pub fn public(&self) -> &BigUint {
        &self.public
    }

    /// Private exponent.
    ///
    /// # Security
    /// Handle with care - this exposes the secret exponent.
    pub fn secret(&self) -> &BigUint {
        &self.secret
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("secret", &"<redacted>")
            .field("public", &self.public)
            .finish()
    }
}

/// File holding one public value as raw big-endian bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyFile {
    path: PathBuf,
}

impl PublicKeyFile {
    /// Point at a key file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a public value, replacing any previous content.
    pub fn write(&self, value: &BigUint) -> Result<(), ConfigError> {
        fs::write(&self.path, value.to_bytes_be()).map_err(|source| ConfigError::KeyFile {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), "public key saved");
        Ok(())
    }

    /// Load a public value.
    pub fn read(&self) -> Result<BigUint, ConfigError> {
        let bytes = fs::read(&self.path).map_err(|source| ConfigError::KeyFile {
            path: self.path.clone(),
            source,
        })?;
        let value = BigUint::from_bytes_be(&bytes);
        if value.is_zero() {
            return Err(ConfigError::MalformedKey(self.path.clone()));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn params(p: u64, g: u64) -> Result<DomainParams, ConfigError> {
        DomainParams::new(BigUint::from(p), BigUint::from(g))
    }

    #[test]
    fn test_domain_params_validation() {
        assert!(params(23, 5).is_ok());
        assert!(matches!(params(3, 2), Err(ConfigError::InvalidDomainParams(_))));
        assert!(matches!(params(24, 5), Err(ConfigError::InvalidDomainParams(_))));
        assert!(matches!(params(23, 1), Err(ConfigError::InvalidDomainParams(_))));
        assert!(matches!(params(23, 22), Err(ConfigError::InvalidDomainParams(_))));
    }

    #[test]
    fn test_keypair_from_secret() {
        let params = params(23, 5).unwrap();
        let kp = Keypair::from_secret(&params, BigUint::from(6u32));
        assert_eq!(kp.public(), &BigUint::from(8u32));
    }

    #[test]
    fn test_keypair_generation_range() {
        let params = params(23, 5).unwrap();
        for _ in 0..64 {
            let kp = Keypair::generate(&params, &mut OsRng);
            assert!(*kp.secret() >= BigUint::one());
            assert!(*kp.secret() <= BigUint::from(21u32));
            assert_eq!(kp.public(), &params.g().modpow(kp.secret(), params.p()));
        }
    }

    #[test]
    fn test_debug_redacts_secret() {
        let params = params(23, 5).unwrap();
        let kp = Keypair::from_secret(&params, BigUint::from(6u32));
        let rendered = format!("{kp:?}");
        assert!(rendered.contains("redacted"));
        assert!(!rendered.contains("secret: 6"));
    }

    #[test]
    fn test_key_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let file = PublicKeyFile::new(dir.path().join("bob.key"));
        let value = BigUint::from(0xDEAD_BEEF_u64);

        file.write(&value).unwrap();
        assert_eq!(file.read().unwrap(), value);
        assert_eq!(fs::read(file.path()).unwrap(), hex::decode("deadbeef").unwrap());
    }

    #[test]
    fn test_key_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = PublicKeyFile::new(dir.path().join("absent.key"));
        assert!(matches!(file.read(), Err(ConfigError::KeyFile { .. })));
    }

    #[test]
    fn test_key_file_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.key");
        fs::write(&path, b"").unwrap();
        assert!(matches!(
            PublicKeyFile::new(&path).read(),
            Err(ConfigError::MalformedKey(_))
        ));
    }
}

//! Textbook RSA with the fixed public exponent 65537.
//!
//! Only the modulus is published; the exponent is a protocol constant.

use std::fmt;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;

use super::arith::mod_inverse;
use crate::core::{ConfigError, CryptoError, RSA_PUBLIC_EXPONENT};

/// Public half: modulus `n` and exponent `e`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    n: BigUint,
    e: BigUint,
}

impl RsaPublicKey {
    /// Wrap a published modulus.
    pub fn new(n: BigUint) -> Result<Self, ConfigError> {
        if n <= BigUint::from(RSA_PUBLIC_EXPONENT) {
            return Err(ConfigError::InvalidRsaKey(format!(
                "modulus {n} is smaller than the public exponent"
            )));
        }
        Ok(Self {
            n,
            e: BigUint::from(RSA_PUBLIC_EXPONENT),
        })
    }

    /// Modulus.
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// `message^e mod n`.
    pub fn encrypt(&self, message: &BigUint) -> Result<BigUint, CryptoError> {
        if *message >= self.n {
            return Err(CryptoError::MessageOutOfRange);
        }
        Ok(message.modpow(&self.e, &self.n))
    }
}

/// Private half, derived from the two primes.
#[derive(Clone)]
pub struct RsaPrivateKey {
    public: RsaPublicKey,
    d: BigUint,
}

impl RsaPrivateKey {
    /// Derive `n = p*q` and `d = e^-1 mod (p-1)(q-1)`.
    pub fn from_primes(p: &BigUint, q: &BigUint) -> Result<Self, ConfigError> {
        let three = BigUint::from(3u32);
        if *p < three || *q < three || p.is_even() || q.is_even() {
            return Err(ConfigError::InvalidRsaKey("primes must be odd and at least 3".to_string()));
        }
        if p == q {
            return Err(ConfigError::InvalidRsaKey("primes must differ".to_string()));
        }

        let phi = (p - 1u32) * (q - 1u32);
        let e = BigUint::from(RSA_PUBLIC_EXPONENT);
        let d = mod_inverse(&e, &phi).map_err(|_| {
            ConfigError::InvalidRsaKey(format!("public exponent {e} is not coprime to phi(n)"))
        })?;

        let public = RsaPublicKey::new(p * q)?;
        debug_assert!(((&e * &d) % &phi).is_one());
        Ok(Self { public, d })
    }

    /// Public half to publish.
    pub fn public(&self) -> &RsaPublicKey {
        &self.public
    }

    /// `ciphertext^d mod n`.
    pub fn decrypt(&self, ciphertext: &BigUint) -> Result<BigUint, CryptoError> {
        if *ciphertext >= self.public.n {
            return Err(CryptoError::MessageOutOfRange);
        }
        Ok(ciphertext.modpow(&self.d, &self.public.n))
    }
}

impl fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("public", &self.public)
            .field("d", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn twin_primes() -> (BigUint, BigUint) {
        (BigUint::from(65_537u32), BigUint::from(65_539u32))
    }

    #[test]
    fn test_modulus_below_exponent_rejected() {
        // n = 61 * 53 = 3233
        let key = RsaPrivateKey::from_primes(&BigUint::from(61u32), &BigUint::from(53u32));
        assert!(matches!(key, Err(ConfigError::InvalidRsaKey(_))));
    }

    #[test]
    fn test_roundtrip() {
        let (p, q) = twin_primes();
        let key = RsaPrivateKey::from_primes(&p, &q).unwrap();
        assert_eq!(key.public().n(), &BigUint::from(4_295_229_443u64));

        for m in [0u32, 1, 2, 0x41, 0xFFFF_FFFF] {
            let m = BigUint::from(m);
            let c = key.public().encrypt(&m).unwrap();
            assert_eq!(key.decrypt(&c).unwrap(), m);
        }
    }

    #[test]
    fn test_invalid_primes() {
        let p = BigUint::from(65_537u32);
        assert!(RsaPrivateKey::from_primes(&p, &p).is_err());
        assert!(RsaPrivateKey::from_primes(&p, &BigUint::from(65_538u32)).is_err());
    }

    #[test]
    fn test_exponent_not_coprime() {
        // q - 1 = 2 * 65537, so e divides phi(n)
        let q = BigUint::from(131_075u32);
        let err = RsaPrivateKey::from_primes(&BigUint::from(65_539u32), &q).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRsaKey(_)));
    }

    #[test]
    fn test_message_out_of_range() {
        let (p, q) = twin_primes();
        let key = RsaPrivateKey::from_primes(&p, &q).unwrap();
        let n = key.public().n().clone();
        assert_eq!(key.public().encrypt(&n), Err(CryptoError::MessageOutOfRange));
    }
}

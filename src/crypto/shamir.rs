//! Shamir three-pass commutative locking.
//!
//! Each party holds a single-use exponent coprime to `P-1` and its inverse.
//! Per block:
//!
//! ```text
//! Alice                                   Bob
//!   pass1 = M^a          ───────────►
//!                        ◄───────────     pass2 = pass1^b
//!   pass3 = pass2^(a^-1) ───────────►
//!                                         M = pass3^(b^-1)
//! ```
//!
//! Locking commutes because exponents multiply:
//! `((M^a)^b)^(a^-1) = M^b mod P`.

use std::fmt;

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};

use super::arith::{mod_inverse, random_coprime};
use super::keys::validate_prime_shape;
use crate::core::CryptoError;

/// Check that a received or configured prime can carry the exchange.
pub fn validate_shared_prime(prime: &BigUint) -> Result<(), String> {
    validate_prime_shape(prime)
}

/// One party's single-use exponent pair for one block.
#[derive(Clone)]
pub struct ThreePassKey {
    prime: BigUint,
    exponent: BigUint,
    inverse: BigUint,
}

impl ThreePassKey {
    /// Draw a fresh exponent coprime to `P-1`.
    ///
    /// `prime` must already satisfy [`validate_shared_prime`].
    pub fn generate<R>(prime: &BigUint, rng: &mut R) -> Result<Self, CryptoError>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let order = prime - 1u32;
        let exponent = random_coprime(rng, &order);
        Self::from_exponent(prime, exponent)
    }

    /// Build from a caller-chosen exponent.
    ///
    /// Fails with [`CryptoError::NotInvertible`] if the exponent shares a
    /// factor with `P-1`.
    pub fn from_exponent(prime: &BigUint, exponent: BigUint) -> Result<Self, CryptoError> {
        let order = prime - 1u32;
        let inverse = mod_inverse(&exponent, &order)?;
        Ok(Self {
            prime: prime.clone(),
            exponent,
            inverse,
        })
    }

    /// Add this party's lock: `value^exponent mod P`.
    ///
    /// Alice uses it for pass 1, Bob for pass 2.
    pub fn lock(&self, value: &BigUint) -> Result<BigUint, CryptoError> {
        if *value >= self.prime {
            return Err(CryptoError::MessageOutOfRange);
        }
        Ok(value.modpow(&self.exponent, &self.prime))
    }

    /// Remove this party's lock: `value^(exponent^-1) mod P`.
    ///
    /// Alice uses it for pass 3, Bob to recover the message.
    pub fn unlock(&self, value: &BigUint) -> Result<BigUint, CryptoError> {
        if *value >= self.prime {
            return Err(CryptoError::MessageOutOfRange);
        }
        Ok(value.modpow(&self.inverse, &self.prime))
    }
}

impl fmt::Debug for ThreePassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreePassKey")
            .field("prime", &self.prime)
            .finish_non_exhaustive()
    }
}

//! ElGamal encryption over a shared discrete-log domain.
//!
//! Encryption (Alice), with a fresh ephemeral `r` per message:
//!
//! ```text
//! R = G^r mod P
//! E = M * Pub^r mod P
//! ```
//!
//! Decryption (Bob, secret `s`) uses `R^(P-1-s) = R^(-s) mod P`, so no
//! separate inverse is needed:
//!
//! ```text
//! M = E * R^(P-1-s) mod P
//! ```

use num_bigint::BigUint;
use num_traits::One;
use rand::{CryptoRng, RngCore};

use super::arith::random_in_range;
use super::keys::{DomainParams, Keypair};
use crate::core::{ConfigError, CryptoError};

/// One encrypted message, consumed once by decryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    /// Ephemeral public value `G^r mod P`.
    pub r: BigUint,
    /// Masked message `M * Pub^r mod P`.
    pub e: BigUint,
}

/// Sending side: the domain plus the receiver's public value.
#[derive(Debug, Clone)]
pub struct ElGamalEncryptor {
    params: DomainParams,
    peer_public: BigUint,
}

impl ElGamalEncryptor {
    /// Create an encryptor for the given receiver.
    pub fn new(params: DomainParams, peer_public: BigUint) -> Result<Self, ConfigError> {
        if peer_public <= BigUint::one() || peer_public >= *params.p() {
            return Err(ConfigError::InvalidDomainParams(
                "peer public value outside (1, P)".to_string(),
            ));
        }
        Ok(Self {
            params,
            peer_public,
        })
    }

    /// Domain parameters in use.
    pub fn params(&self) -> &DomainParams {
        &self.params
    }

    /// Receiver's public value.
    pub fn peer_public(&self) -> &BigUint {
        &self.peer_public
    }

    /// Encrypt under a freshly drawn ephemeral secret in `[1, P-2]`.
    pub fn encrypt<R>(&self, message: &BigUint, rng: &mut R) -> Result<Ciphertext, CryptoError>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let ephemeral = random_in_range(rng, &BigUint::one(), &(self.params.p() - 1u32));
        self.encrypt_with_ephemeral(message, &ephemeral)
    }

    /// Encrypt under a caller-chosen ephemeral secret.
    ///
    /// Reusing an ephemeral secret across messages breaks semantic security.
    pub fn encrypt_with_ephemeral(
        &self,
        message: &BigUint,
        ephemeral: &BigUint,
    ) -> Result<Ciphertext, CryptoError> {
        let p = self.params.p();
        if message >= p {
            return Err(CryptoError::MessageOutOfRange);
        }
        let r = self.params.g().modpow(ephemeral, p);
        let e = (message * self.peer_public.modpow(ephemeral, p)) % p;
        Ok(Ciphertext { r, e })
    }
}

/// Receiving side: a keypair drawn once and reused for every block.
#[derive(Debug, Clone)]
pub struct ElGamalDecryptor {
    params: DomainParams,
    keypair: Keypair,
}

impl ElGamalDecryptor {
    /// Generate a fresh receiver keypair.
    pub fn generate<R>(params: DomainParams, rng: &mut R) -> Self
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let keypair = Keypair::generate(&params, rng);
        Self { params, keypair }
    }

    /// Build a receiver around an existing keypair.
    pub fn from_keypair(params: DomainParams, keypair: Keypair) -> Self {
        Self { params, keypair }
    }

    /// Domain parameters in use.
    pub fn params(&self) -> &DomainParams {
        &self.params
    }

    /// Public value to publish to senders.
    pub fn public(&self) -> &BigUint {
        self.keypair.public()
    }

    /// Recover the message.
    pub fn decrypt(&self, ciphertext: &Ciphertext) -> BigUint {
        let p = self.params.p();
        let order = p - 1u32;
        let exponent = &order - (self.keypair.secret() % &order);
        (&ciphertext.e * ciphertext.r.modpow(&exponent, p)) % p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn small_domain() -> DomainParams {
        DomainParams::new(BigUint::from(23u32), BigUint::from(5u32)).unwrap()
    }

    #[test]
    fn test_known_vector() {
        let params = small_domain();
        let bob = ElGamalDecryptor::from_keypair(
            params.clone(),
            Keypair::from_secret(&params, BigUint::from(6u32)),
        );
        assert_eq!(bob.public(), &BigUint::from(8u32));

        let alice = ElGamalEncryptor::new(params, bob.public().clone()).unwrap();
        let ct = alice
            .encrypt_with_ephemeral(&BigUint::from(10u32), &BigUint::from(3u32))
            .unwrap();
        assert_eq!(ct.r, BigUint::from(10u32));
        assert_eq!(ct.e, BigUint::from(14u32));

        assert_eq!(bob.decrypt(&ct), BigUint::from(10u32));
    }

    #[test]
    fn test_rerandomization() {
        let params = DomainParams::new(
            BigUint::from(crate::core::DEFAULT_SHAMIR_PRIME),
            BigUint::from(3u32),
        )
        .unwrap();
        let bob = ElGamalDecryptor::generate(params.clone(), &mut OsRng);
        let alice = ElGamalEncryptor::new(params, bob.public().clone()).unwrap();

        let message = BigUint::from(0x42u32);
        let first = alice.encrypt(&message, &mut OsRng).unwrap();
        let second = alice.encrypt(&message, &mut OsRng).unwrap();

        assert_ne!(first, second);
        assert_eq!(bob.decrypt(&first), message);
        assert_eq!(bob.decrypt(&second), message);
    }

    #[test]
    fn test_every_byte_value() {
        let params = DomainParams::new(BigUint::from(1019u32), BigUint::from(2u32)).unwrap();
        let bob = ElGamalDecryptor::generate(params.clone(), &mut OsRng);
        let alice = ElGamalEncryptor::new(params, bob.public().clone()).unwrap();

        for byte in 0u32..=255 {
            let message = BigUint::from(byte);
            let ct = alice.encrypt(&message, &mut OsRng).unwrap();
            assert_eq!(bob.decrypt(&ct), message);
        }
    }

    #[test]
    fn test_message_out_of_range() {
        let params = small_domain();
        let alice = ElGamalEncryptor::new(params, BigUint::from(8u32)).unwrap();
        assert_eq!(
            alice.encrypt(&BigUint::from(23u32), &mut OsRng),
            Err(CryptoError::MessageOutOfRange)
        );
    }

    #[test]
    fn test_invalid_peer_public() {
        assert!(ElGamalEncryptor::new(small_domain(), BigUint::one()).is_err());
        assert!(ElGamalEncryptor::new(small_domain(), BigUint::from(23u32)).is_err());
    }
}

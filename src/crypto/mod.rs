//! Blockwire - Security Layer
//!
//! Pure scheme mathematics over arbitrary-precision integers, kept free of
//! I/O so every scheme can be tested without a connection:
//!
//! - [`arith`]: random draws, modular inverse, fixed-width block export
//! - [`keys`]: domain parameters, role keypairs, the public-key file store
//! - [`elgamal`]: re-randomized ElGamal encryption
//! - [`shamir`]: commutative three-pass locking
//! - [`rsa`]: textbook RSA with a fixed public exponent

pub mod arith;
pub mod elgamal;
pub mod keys;
pub mod rsa;
pub mod shamir;

pub use elgamal::{Ciphertext, ElGamalDecryptor, ElGamalEncryptor};
pub use keys::{DomainParams, Keypair, PublicKeyFile};
pub use rsa::{RsaPrivateKey, RsaPublicKey};
pub use shamir::ThreePassKey;

//! Protocol constants.
//!
//! These values are part of the wire format and MUST NOT be changed without
//! breaking compatibility with existing peers.

use std::time::Duration;

// =============================================================================
// PROTOCOL CODES
// =============================================================================

/// Shamir three-pass exchange.
pub const PROTOCOL_SHAMIR: u32 = 0;

/// ElGamal encryption under the receiver's public value.
pub const PROTOCOL_ELGAMAL: u32 = 1;

/// Textbook RSA under the receiver's published modulus.
pub const PROTOCOL_RSA: u32 = 2;

// =============================================================================
// WIRE SIZES
// =============================================================================

/// Width of the connection preamble carrying the protocol code.
pub const PROTOCOL_CODE_SIZE: usize = 4;

/// Width of the length prefix in front of every big-integer field.
pub const BIGINT_LENGTH_PREFIX_SIZE: usize = 4;

/// Largest big-integer field accepted from a peer (64 KiB).
pub const MAX_BIGINT_FIELD_SIZE: usize = 64 * 1024;

/// Width of the meta byte preceding each block.
pub const META_BYTE_SIZE: usize = 1;

/// Largest block the one-byte meta indicator can describe.
pub const MAX_BLOCK_SIZE: usize = u8::MAX as usize;

// =============================================================================
// BLOCK SIZES
// =============================================================================

/// Plaintext bytes per ElGamal block.
pub const ELGAMAL_BLOCK_SIZE: usize = 1;

/// Plaintext bytes per Shamir three-pass block.
pub const SHAMIR_BLOCK_SIZE: usize = 4;

/// Plaintext bytes per RSA block.
pub const RSA_BLOCK_SIZE: usize = 4;

// =============================================================================
// KEY MATERIAL
// =============================================================================

/// Fixed RSA public exponent (F4).
pub const RSA_PUBLIC_EXPONENT: u32 = 65_537;

/// Mersenne prime 2^61 - 1, the default shared prime for the three-pass exchange.
pub const DEFAULT_SHAMIR_PRIME: u64 = 2_305_843_009_213_693_951;

/// Default file the ElGamal receiver publishes its public value to.
pub const DEFAULT_ELGAMAL_KEY_FILE: &str = "bob_elgamal.key";

/// Default file the RSA receiver publishes its modulus to.
pub const DEFAULT_RSA_KEY_FILE: &str = "bob_rsa.key";

// =============================================================================
// NETWORK DEFAULTS
// =============================================================================

/// Default listen/dial host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default listen/dial port.
pub const DEFAULT_PORT: u16 = 4444;

/// Connect timeout for the sending side.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on concurrently served connections.
pub const DEFAULT_MAX_CONNECTIONS: usize = 256;

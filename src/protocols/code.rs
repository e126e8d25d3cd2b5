//! Wire-level protocol codes.

use std::fmt;

use crate::core::{ConfigError, PROTOCOL_ELGAMAL, PROTOCOL_RSA, PROTOCOL_SHAMIR};

/// Scheme governing one connection, sent as the 4-byte connection preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ProtocolCode {
    /// Shamir three-pass exchange.
    Shamir = PROTOCOL_SHAMIR,
    /// ElGamal encryption.
    ElGamal = PROTOCOL_ELGAMAL,
    /// Textbook RSA.
    Rsa = PROTOCOL_RSA,
}

impl ProtocolCode {
    /// All registered codes.
    pub const ALL: [ProtocolCode; 3] = [ProtocolCode::Shamir, ProtocolCode::ElGamal, ProtocolCode::Rsa];

    /// Parse a code received from the wire.
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            PROTOCOL_SHAMIR => Some(Self::Shamir),
            PROTOCOL_ELGAMAL => Some(Self::ElGamal),
            PROTOCOL_RSA => Some(Self::Rsa),
            _ => None,
        }
    }

    /// Wire representation.
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Lower-case scheme name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Shamir => "shamir",
            Self::ElGamal => "elgamal",
            Self::Rsa => "rsa",
        }
    }
}

impl TryFrom<u32> for ProtocolCode {
    type Error = ConfigError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Self::from_u32(code).ok_or(ConfigError::UnknownProtocol(code))
    }
}

impl std::str::FromStr for ProtocolCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown protocol '{s}' (expected shamir, elgamal or rsa)"))
    }
}

impl fmt::Display for ProtocolCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u32())
    }
}

//! Blockwire - Scheme codecs and protocol dispatch.
//!
//! One module per scheme adapts the pure mathematics in [`crate::crypto`] to
//! the [`BlockEncoder`](crate::core::BlockEncoder) /
//! [`BlockDecoder`](crate::core::BlockDecoder) seams, owning the scheme's
//! wire representation and round trips. [`SchemeEncoder`] and
//! [`SchemeDecoder`] close over the set of schemes; [`Registry`] maps a
//! protocol code to one of them.
//!
//! | Code | Scheme  | Block | Preamble | Per block on the wire               |
//! |------|---------|-------|----------|-------------------------------------|
//! | 0    | Shamir  | 4     | prime P  | pass1 ►, ◄ pass2, pass3 ►           |
//! | 1    | ElGamal | 1     | -        | R ►, E ►                            |
//! | 2    | RSA     | 4     | -        | C ►                                 |

mod code;
mod elgamal;
mod registry;
mod rsa;
mod scheme;
mod shamir;

pub use code::ProtocolCode;
pub use elgamal::{ElGamalDecoder, ElGamalEncoder};
pub use registry::{Registry, SenderSetup};
pub use rsa::{RsaDecoder, RsaEncoder};
pub use scheme::{SchemeDecoder, SchemeEncoder};
pub use shamir::{ShamirDecoder, ShamirEncoder};

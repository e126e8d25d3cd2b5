//! Blockwire - Core traits, types, and constants.
//!
//! This module provides the foundational abstractions shared by every layer:
//! wire constants, the error taxonomy and the collaborator traits that keep
//! block framing decoupled from the cryptographic schemes.

mod constants;
mod error;
mod traits;

pub use constants::*;
pub use error::*;
pub use traits::*;

//! Blockwire - Receiver Library
//!
//! High-level API for the receiving ("Bob") role.

mod receiver;
#[allow(clippy::module_inception)]
mod server;
mod session;
mod sink;

pub use receiver::*;
pub use server::*;
pub use session::*;
pub use sink::*;

//! Blockwire - Sender Library
//!
//! High-level API for the sending ("Alice") role.

#[allow(clippy::module_inception)]
mod client;

pub use client::*;

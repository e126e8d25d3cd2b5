//! Connection state management for the receiving side.
//!
//! ```text
//! AwaitingProtocolCode ──► AwaitingSchemeSetup ──► StreamingBlocks ──► Closed
//!          │                        │                      │
//!          └────────────────────────┴──────────────────────┴──► Closed (on error)
//! ```

use std::fmt;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use super::block::TransferStats;

/// Connection lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    /// Waiting for the 4-byte protocol code.
    AwaitingProtocolCode,
    /// Reading the scheme preamble (e.g. the shared prime).
    AwaitingSchemeSetup,
    /// Framed blocks are flowing.
    StreamingBlocks,
    /// Connection and sink released.
    Closed,
}

impl ConnectionPhase {
    /// Check if `next` is a legal successor of this phase.
    pub fn can_advance_to(self, next: ConnectionPhase) -> bool {
        use ConnectionPhase::*;
        matches!(
            (self, next),
            (AwaitingProtocolCode, AwaitingSchemeSetup)
                | (AwaitingSchemeSetup, StreamingBlocks)
                | (AwaitingProtocolCode | AwaitingSchemeSetup | StreamingBlocks, Closed)
        )
    }
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionPhase::AwaitingProtocolCode => "awaiting protocol code",
            ConnectionPhase::AwaitingSchemeSetup => "awaiting scheme setup",
            ConnectionPhase::StreamingBlocks => "streaming blocks",
            ConnectionPhase::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Per-connection state tracked by the receiver.
#[derive(Debug)]
pub struct ConnectionState {
    /// Remote peer address.
    pub peer: SocketAddr,
    /// Current phase.
    pub phase: ConnectionPhase,
    /// Protocol code, once read.
    pub protocol_code: Option<u32>,
    /// Blocks received so far.
    pub stats: TransferStats,
    /// Phase in which the connection failed, if it did.
    pub failed_in: Option<ConnectionPhase>,
    opened_at: Instant,
}

impl ConnectionState {
    /// Create the state for a freshly accepted connection.
    pub fn new(peer: SocketAddr) -> Self {
        Self {
            peer,
            phase: ConnectionPhase::AwaitingProtocolCode,
            protocol_code: None,
            stats: TransferStats::default(),
            failed_in: None,
            opened_at: Instant::now(),
        }
    }

    /// Move to the next phase.
    ///
    /// Returns `false` and stays put if the transition is not legal.
    pub fn advance(&mut self, next: ConnectionPhase) -> bool {
        if !self.phase.can_advance_to(next) {
            return false;
        }
        self.phase = next;
        true
    }

    /// Abort to `Closed`, remembering where the failure happened.
    pub fn fail(&mut self) {
        if self.phase != ConnectionPhase::Closed {
            self.failed_in = Some(self.phase);
            self.phase = ConnectionPhase::Closed;
        }
    }

    /// Check if the connection ended without error.
    pub fn is_clean(&self) -> bool {
        self.phase == ConnectionPhase::Closed && self.failed_in.is_none()
    }

    /// Time since the connection was accepted.
    pub fn age(&self) -> Duration {
        self.opened_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "127.0.0.1:4444".parse().unwrap()
    }

    #[test]
    fn test_happy_path() {
        let mut state = ConnectionState::new(peer());
        assert_eq!(state.phase, ConnectionPhase::AwaitingProtocolCode);
        assert!(state.advance(ConnectionPhase::AwaitingSchemeSetup));
        assert!(state.advance(ConnectionPhase::StreamingBlocks));
        assert!(state.advance(ConnectionPhase::Closed));
        assert!(state.is_clean());
    }

    #[test]
    fn test_no_skipping_phases() {
        let mut state = ConnectionState::new(peer());
        assert!(!state.advance(ConnectionPhase::StreamingBlocks));
        assert_eq!(state.phase, ConnectionPhase::AwaitingProtocolCode);
    }

    #[test]
    fn test_closed_is_terminal() {
        let mut state = ConnectionState::new(peer());
        state.fail();
        assert!(!state.advance(ConnectionPhase::AwaitingSchemeSetup));
        assert!(!state.advance(ConnectionPhase::Closed));
    }

    #[test]
    fn test_fail_records_phase() {
        let mut state = ConnectionState::new(peer());
        state.advance(ConnectionPhase::AwaitingSchemeSetup);
        state.fail();
        assert_eq!(state.phase, ConnectionPhase::Closed);
        assert_eq!(state.failed_in, Some(ConnectionPhase::AwaitingSchemeSetup));
        assert!(!state.is_clean());

        // A second failure does not overwrite the first
        state.fail();
        assert_eq!(state.failed_in, Some(ConnectionPhase::AwaitingSchemeSetup));
    }
}

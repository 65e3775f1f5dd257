//! Bolt protocol handshake implementation.
//!
//! The Bolt handshake consists of:
//! 1. Client sends 4-byte magic number (0x6060B017)
//! 2. Client sends 4 x 4-byte version proposals (preferred first, zero padded)
//! 3. Server responds with 4-byte agreed version (or 0 if none)

mod negotiation;

pub use negotiation::ClientHandshake;

pub use super::error::HandshakeError;

/// Bolt protocol magic number: 0x6060B017
pub const BOLT_MAGIC: [u8; 4] = [0x60, 0x60, 0xB0, 0x17];

/// Size of the complete handshake message from client (magic + 4 versions)
pub const HANDSHAKE_SIZE: usize = 20;

/// Size of server response (negotiated version)
pub const HANDSHAKE_RESPONSE_SIZE: usize = 4;

/// Protocol versions this crate speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BoltVersion {
    /// Bolt 1
    V1 = 1,
}

impl BoltVersion {
    /// Versions proposed in the handshake, in order of preference.
    pub const ALL: [BoltVersion; 1] = [BoltVersion::V1];

    /// Map a raw handshake value to a known version.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(BoltVersion::V1),
            _ => None,
        }
    }

    /// Get the raw u32 value.
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl std::fmt::Display for BoltVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bolt v{}", self.as_u32())
    }
}

//! Bolt protocol error types.

use std::io;

use thiserror::Error;

use super::packstream::PackStreamError;

/// Result type for Bolt operations.
pub type BoltResult<T> = Result<T, BoltError>;

/// Bolt protocol errors.
#[derive(Debug, Error)]
pub enum BoltError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Handshake error
    #[error("Handshake error: {0}")]
    Handshake(#[from] HandshakeError),

    /// PackStream serialization error
    #[error("PackStream error: {0}")]
    PackStream(#[from] PackStreamError),

    /// Well-formed PackStream that is not a valid Bolt message
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Message larger than the configured limit
    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge {
        /// Accumulated size
        size: usize,
        /// Configured limit
        max: usize,
    },
}

impl BoltError {
    /// Create a protocol error.
    pub fn protocol(msg: impl Into<String>) -> Self {
        BoltError::Protocol(msg.into())
    }
}

/// Handshake-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    /// Server supports none of the proposed versions
    #[error("Server does not support any of the proposed protocol versions")]
    NoCompatibleVersion,

    /// Server picked a version that was never proposed
    #[error("Server selected unproposed protocol version 0x{0:08X}")]
    UnexpectedVersion(u32),

    /// Server answered with something that is not a Bolt handshake reply
    #[error("Invalid handshake response: {0}")]
    InvalidData(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_error_display() {
        let err = HandshakeError::UnexpectedVersion(0x0004_0000);
        assert_eq!(err.to_string(), "Server selected unproposed protocol version 0x00040000");

        let err: BoltError = HandshakeError::NoCompatibleVersion.into();
        assert!(err.to_string().starts_with("Handshake error: Server does not support"));
    }

    #[test]
    fn test_bolt_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "refused");
        let bolt_err: BoltError = io_err.into();
        assert!(matches!(bolt_err, BoltError::Io(_)));
    }

    #[test]
    fn test_bolt_error_from_packstream() {
        let err: BoltError = PackStreamError::UnexpectedEof.into();
        assert!(matches!(err, BoltError::PackStream(PackStreamError::UnexpectedEof)));
    }

    #[test]
    fn test_message_too_large_display() {
        let err = BoltError::MessageTooLarge { size: 20, max: 10 };
        assert_eq!(err.to_string(), "Message too large: 20 bytes (max: 10)");
    }
}

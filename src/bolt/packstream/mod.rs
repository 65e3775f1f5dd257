//! PackStream serialization format.
//!
//! PackStream is the binary serialization format used by the Bolt protocol
//! to encode every message field exchanged between client and server.
//!
//! # Supported Types
//!
//! - **Null**: Single byte marker
//! - **Boolean**: True/False markers
//! - **Integer**: Variable-length encoding (-2^63 to 2^63-1)
//! - **Float**: 64-bit IEEE 754
//! - **String**: UTF-8 encoded, variable length prefix
//! - **List**: Heterogeneous collections
//! - **Map**: String keys to arbitrary values
//! - **Structure**: Tagged structures for messages and graph types
//!
//! # Graph Structures
//!
//! - **Node**: id, labels, properties
//! - **Relationship**: id, start_id, end_id, type, properties
//! - **UnboundRelationship**: id, type, properties
//! - **Path**: nodes, unbound relationships, indices

pub mod decoder;
pub mod encoder;
pub mod marker;
pub mod structures;
pub mod types;

pub use decoder::{decode, PackStreamDecoder};
pub use encoder::{encode, PackStreamEncoder};
pub use structures::{
    PackStreamNode, PackStreamPath, PackStreamRelationship, PackStreamUnboundRelationship,
};
pub use types::{PackStreamStructure, PackStreamValue};

use thiserror::Error;

/// PackStream errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PackStreamError {
    /// Input ended inside a value
    #[error("Unexpected end of PackStream data")]
    UnexpectedEof,

    /// Marker byte not part of the format
    #[error("Unknown PackStream marker: 0x{0:02X}")]
    UnknownMarker(u8),

    /// Invalid UTF-8 in string
    #[error("Invalid UTF-8 in string: {0}")]
    InvalidUtf8(String),

    /// Map key that is not a string
    #[error("Map keys must be strings")]
    InvalidMapKey,

    /// Container too large for the format
    #[error("{0} too large: {1} entries")]
    ValueTooLarge(&'static str, usize),

    /// Nesting beyond the decoder limit
    #[error("Value nested deeper than {0} levels")]
    TooDeep(usize),

    /// Bytes left over after a complete value
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// Structure with wrong signature, arity or field types
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

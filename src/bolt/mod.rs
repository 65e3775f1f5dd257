//! # Bolt Protocol Implementation
//!
//! Wire-level pieces of the Bolt v1 protocol, free of any I/O.
//!
//! - **PackStream** - Binary serialization format for all message fields
//! - **Message Types** - INIT, RUN, PULL_ALL, DISCARD_ALL, RESET, ACK_FAILURE
//!   requests and SUCCESS, RECORD, FAILURE, IGNORED responses
//! - **Handshake** - Magic preamble and version negotiation
//! - **Codec** - Chunked message framing over `tokio_util` codec traits
//!
//! ## Note
//!
//! Most users should use the connection engine in [`crate::driver`] instead
//! of interacting with the Bolt protocol directly.

pub mod codec;
pub mod error;
pub mod handshake;
pub mod message;
pub mod packstream;

pub use codec::{ChunkedCodec, ClientCodec, ServerCodec};
pub use error::{BoltError, BoltResult, HandshakeError};
pub use handshake::{BoltVersion, ClientHandshake, BOLT_MAGIC, HANDSHAKE_RESPONSE_SIZE};
pub use message::{
    BoltRequest, BoltResponse, FailureMessage, InitMessage, RecordMessage, RunMessage,
    SuccessMessage,
};
pub use packstream::{
    PackStreamDecoder, PackStreamEncoder, PackStreamError, PackStreamNode, PackStreamPath,
    PackStreamRelationship, PackStreamStructure, PackStreamUnboundRelationship, PackStreamValue,
};

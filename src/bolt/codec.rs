//! Bolt message framing on top of the `tokio_util` codec traits.
//!
//! A message is split into chunks, each prefixed with a 2-byte big-endian
//! length, and terminated by an empty chunk (`0x00 0x00`). The traits are
//! driven synchronously over a `BytesMut`; nothing here performs I/O.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::message::{BoltRequest, BoltResponse};
use super::packstream::{decode, PackStreamEncoder, PackStreamStructure, PackStreamValue};
use super::BoltError;

/// Largest chunk this codec writes. Readers accept any 16-bit length.
pub const MAX_CHUNK_SIZE: usize = 16384;

/// Size of a chunk header.
pub const CHUNK_HEADER_SIZE: usize = 2;

/// End of message marker (0x00 0x00)
pub const END_MARKER: [u8; 2] = [0x00, 0x00];

/// Default limit on an assembled message (16 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Framing codec for single PackStream values.
#[derive(Debug)]
pub struct ChunkedCodec {
    max_message_size: usize,
    chunk_size: usize,
    /// Payload of the message currently being assembled
    pending: BytesMut,
}

impl ChunkedCodec {
    /// Create a new codec with default settings.
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_MESSAGE_SIZE)
    }

    /// Create a codec with custom max message size.
    pub fn with_max_size(max_message_size: usize) -> Self {
        Self {
            max_message_size,
            chunk_size: MAX_CHUNK_SIZE,
            pending: BytesMut::with_capacity(4096),
        }
    }

    /// Split outgoing messages into chunks of at most `chunk_size` bytes.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, u16::MAX as usize);
        self
    }

    /// Bytes buffered for a message whose end marker has not arrived.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn write_chunks(&self, payload: &[u8], dst: &mut BytesMut) {
        dst.reserve(payload.len() + (payload.len() / self.chunk_size + 2) * CHUNK_HEADER_SIZE);
        for chunk in payload.chunks(self.chunk_size) {
            dst.put_u16(chunk.len() as u16);
            dst.put_slice(chunk);
        }
        dst.put_slice(&END_MARKER);
    }
}

impl Default for ChunkedCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ChunkedCodec {
    type Item = PackStreamValue;
    type Error = BoltError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if src.len() < CHUNK_HEADER_SIZE {
                return Ok(None);
            }
            let chunk_size = u16::from_be_bytes([src[0], src[1]]) as usize;

            if chunk_size == 0 {
                src.advance(CHUNK_HEADER_SIZE);
                if self.pending.is_empty() {
                    // an end marker with no payload is a keep-alive
                    continue;
                }
                let payload = self.pending.split();
                return Ok(Some(decode(&payload)?));
            }

            if src.len() < CHUNK_HEADER_SIZE + chunk_size {
                return Ok(None);
            }

            let size = self.pending.len() + chunk_size;
            if size > self.max_message_size {
                self.pending.clear();
                return Err(BoltError::MessageTooLarge {
                    size,
                    max: self.max_message_size,
                });
            }

            src.advance(CHUNK_HEADER_SIZE);
            self.pending.extend_from_slice(&src[..chunk_size]);
            src.advance(chunk_size);
        }
    }
}

impl Encoder<PackStreamValue> for ChunkedCodec {
    type Error = BoltError;

    fn encode(&mut self, item: PackStreamValue, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut payload = BytesMut::with_capacity(256);
        PackStreamEncoder::new(&mut payload).encode(&item)?;
        if payload.len() > self.max_message_size {
            return Err(BoltError::MessageTooLarge {
                size: payload.len(),
                max: self.max_message_size,
            });
        }
        self.write_chunks(&payload, dst);
        Ok(())
    }
}

fn into_structure(value: PackStreamValue) -> Result<PackStreamStructure, BoltError> {
    match value {
        PackStreamValue::Structure(s) => Ok(s),
        other => Err(BoltError::protocol(format!(
            "expected a message structure, got {}",
            other.type_name()
        ))),
    }
}

/// Client side: encodes requests, decodes responses.
#[derive(Debug, Default)]
pub struct ClientCodec {
    inner: ChunkedCodec,
}

impl ClientCodec {
    /// Create a client codec with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client codec with a custom inbound message limit.
    pub fn with_max_size(max_message_size: usize) -> Self {
        Self {
            inner: ChunkedCodec::with_max_size(max_message_size),
        }
    }

    /// True when part of an inbound message is buffered.
    pub fn is_mid_message(&self) -> bool {
        self.inner.pending_len() > 0
    }
}

impl Decoder for ClientCodec {
    type Item = BoltResponse;
    type Error = BoltError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.inner.decode(src)? {
            Some(value) => {
                let structure = into_structure(value)?;
                Ok(Some(BoltResponse::from_structure(&structure)?))
            }
            None => Ok(None),
        }
    }
}

impl Encoder<&BoltRequest> for ClientCodec {
    type Error = BoltError;

    fn encode(&mut self, item: &BoltRequest, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.inner.encode(PackStreamValue::Structure(item.to_structure()), dst)
    }
}

/// Server side: decodes requests, encodes responses. Used to script peers.
#[derive(Debug, Default)]
pub struct ServerCodec {
    inner: ChunkedCodec,
}

impl ServerCodec {
    /// Create a server codec with default limits.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for ServerCodec {
    type Item = BoltRequest;
    type Error = BoltError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.inner.decode(src)? {
            Some(value) => {
                let structure = into_structure(value)?;
                Ok(Some(BoltRequest::from_structure(&structure)?))
            }
            None => Ok(None),
        }
    }
}

impl Encoder<BoltResponse> for ServerCodec {
    type Error = BoltError;

    fn encode(&mut self, item: BoltResponse, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.inner.encode(PackStreamValue::Structure(item.to_structure()), dst)
    }
}

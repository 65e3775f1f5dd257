//! Socket Client
//!
//! Handshake, batched request sending and single response receiving over a channel.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use super::channel::{blocking_read, blocking_write, ByteChannel};
use crate::bolt::codec::CHUNK_HEADER_SIZE;
use crate::bolt::handshake::HANDSHAKE_RESPONSE_SIZE;
use crate::bolt::{BoltError, BoltRequest, BoltResponse, BoltVersion, ClientCodec, ClientHandshake};
use crate::driver::error::{DriverError, DriverResult};

/// Initial buffer capacity
const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

// ============================================================================
// SocketClient
// ============================================================================

/// Client that handles Bolt framing
pub struct SocketClient<C> {
    channel: C,
    codec: ClientCodec,
    read_buf: BytesMut,
    write_buf: BytesMut,
    version: Option<BoltVersion>,
}

impl<C: ByteChannel> SocketClient<C> {
    /// Create a client
    pub fn new(channel: C, max_message_size: usize) -> Self {
        Self {
            channel,
            codec: ClientCodec::with_max_size(max_message_size),
            read_buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            write_buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            version: None,
        }
    }

    /// Perform the handshake
    pub fn start(&mut self) -> DriverResult<BoltVersion> {
        let handshake = ClientHandshake::new();
        blocking_write(&mut self.channel, &handshake.request())?;

        let mut reply = [0u8; HANDSHAKE_RESPONSE_SIZE];
        blocking_read(&mut self.channel, &mut reply)?;
        let version = handshake.accept(reply).map_err(BoltError::from)?;

        debug!(version = %version, "Bolt handshake completed");
        self.version = Some(version);
        Ok(version)
    }

    /// Encode a batch of requests and send it with one write
    pub fn send(&mut self, requests: &[BoltRequest]) -> DriverResult<usize> {
        self.write_buf.clear();
        for request in requests {
            self.codec.encode(request, &mut self.write_buf)?;
        }
        blocking_write(&mut self.channel, &self.write_buf)?;
        trace!(count = requests.len(), bytes = self.write_buf.len(), "requests sent");
        Ok(requests.len())
    }

    /// Receive one response message
    ///
    /// Reads chunk by chunk, so bytes of the next message are never consumed.
    pub fn receive_one(&mut self) -> DriverResult<BoltResponse> {
        loop {
            if let Some(response) = self.codec.decode(&mut self.read_buf)? {
                return Ok(response);
            }

            let mut header = [0u8; CHUNK_HEADER_SIZE];
            blocking_read(&mut self.channel, &mut header)?;
            self.read_buf.extend_from_slice(&header);

            let chunk_size = u16::from_be_bytes(header) as usize;
            if chunk_size > 0 {
                let start = self.read_buf.len();
                self.read_buf.resize(start + chunk_size, 0);
                blocking_read(&mut self.channel, &mut self.read_buf[start..])?;
            }
        }
    }

    /// Negotiated version
    pub fn version(&self) -> Option<BoltVersion> {
        self.version
    }

    /// Whether the channel is open
    pub fn is_open(&self) -> bool {
        self.channel.is_open()
    }

    /// Close the channel
    pub fn stop(&mut self) -> DriverResult<()> {
        self.read_buf.clear();
        self.channel.close().map_err(DriverError::from)
    }

    /// The underlying channel
    pub fn channel(&self) -> &C {
        &self.channel
    }
}

impl<C> std::fmt::Debug for SocketClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketClient")
            .field("version", &self.version)
            .field("buffered", &self.read_buf.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bolt::codec::DEFAULT_MAX_MESSAGE_SIZE;
    use crate::bolt::{RecordMessage, RunMessage, SuccessMessage, BOLT_MAGIC};
    use crate::driver::bolt::testing::{
        decode_requests, handshake_then, server_bytes, ScriptedChannel,
    };

    #[test]
    fn test_handshake_bytes() {
        let channel = ScriptedChannel::new(handshake_then(1, vec![]));
        let written = channel.written();
        let mut client = SocketClient::new(channel, DEFAULT_MAX_MESSAGE_SIZE);

        assert_eq!(client.start().unwrap(), BoltVersion::V1);
        assert_eq!(client.version(), Some(BoltVersion::V1));

        let bytes = written.lock().clone();
        assert_eq!(&bytes[..4], &BOLT_MAGIC);
        assert_eq!(&bytes[4..], &[0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_handshake_no_version() {
        let channel = ScriptedChannel::new(handshake_then(0, vec![]));
        let mut client = SocketClient::new(channel, DEFAULT_MAX_MESSAGE_SIZE);
        let err = client.start().unwrap_err();
        assert!(matches!(err, DriverError::Protocol(_)));
    }

    #[test]
    fn test_handshake_peer_closed() {
        let channel = ScriptedChannel::new(vec![0, 0]);
        let mut client = SocketClient::new(channel, DEFAULT_MAX_MESSAGE_SIZE);
        let err = client.start().unwrap_err();
        assert!(err.to_string().ends_with("Expected 4 bytes, received 00 00."));
    }

    #[test]
    fn test_send_batch() {
        let channel = ScriptedChannel::new(vec![]);
        let written = channel.written();
        let mut client = SocketClient::new(channel, DEFAULT_MAX_MESSAGE_SIZE);

        let batch = vec![BoltRequest::Run(RunMessage::new("RETURN 1")), BoltRequest::PullAll];
        assert_eq!(client.send(&batch).unwrap(), 2);
        assert_eq!(decode_requests(&written.lock()), batch);
    }

    #[test]
    fn test_receive_in_order_one_byte_at_a_time() {
        let bytes = server_bytes(vec![
            BoltResponse::Record(RecordMessage::new(vec![1i64.into()])),
            BoltResponse::Success(SuccessMessage::new()),
        ]);
        let channel = ScriptedChannel::new(bytes).one_byte_at_a_time();
        let mut client = SocketClient::new(channel, DEFAULT_MAX_MESSAGE_SIZE);

        assert!(matches!(client.receive_one().unwrap(), BoltResponse::Record(_)));
        assert!(matches!(client.receive_one().unwrap(), BoltResponse::Success(_)));
        assert!(matches!(
            client.receive_one().unwrap_err(),
            DriverError::ConnectionTerminated(_)
        ));
        assert!(!client.is_open());
    }

    #[test]
    fn test_receive_too_large() {
        let bytes = server_bytes(vec![BoltResponse::Record(RecordMessage::new(vec![
            "x".repeat(64).into(),
        ]))]);
        let channel = ScriptedChannel::new(bytes);
        let mut client = SocketClient::new(channel, 16);
        let err = client.receive_one().unwrap_err();
        assert!(matches!(err, DriverError::Protocol(_)));
        assert!(err.is_fatal());
    }
}

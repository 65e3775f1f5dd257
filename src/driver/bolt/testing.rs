//! Scripted channel for tests
//!
//! Replays prepared server bytes and records what the client writes.

use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

use bytes::BytesMut;
use parking_lot::{Condvar, Mutex};
use tokio_util::codec::{Decoder, Encoder};

use super::channel::ByteChannel;
use crate::bolt::handshake::HANDSHAKE_SIZE;
use crate::bolt::{BoltRequest, BoltResponse, BoltVersion, ServerCodec};

/// Encode server replies as chunked frames
pub(crate) fn server_bytes(responses: Vec<BoltResponse>) -> Vec<u8> {
    let mut codec = ServerCodec::new();
    let mut buf = BytesMut::new();
    for response in responses {
        codec.encode(response, &mut buf).unwrap();
    }
    buf.to_vec()
}

/// Handshake reply followed by server replies
pub(crate) fn handshake_then(version: u32, responses: Vec<BoltResponse>) -> Vec<u8> {
    let mut bytes = version.to_be_bytes().to_vec();
    bytes.extend(server_bytes(responses));
    bytes
}

/// Default handshake reply followed by server replies
pub(crate) fn negotiated_then(responses: Vec<BoltResponse>) -> Vec<u8> {
    handshake_then(BoltVersion::V1.as_u32(), responses)
}

/// Decode the bytes the client wrote into requests
pub(crate) fn decode_requests(bytes: &[u8]) -> Vec<BoltRequest> {
    let mut codec = ServerCodec::new();
    let mut buf = BytesMut::from(bytes);
    let mut requests = Vec::new();
    while let Some(request) = codec.decode(&mut buf).unwrap() {
        requests.push(request);
    }
    assert!(buf.is_empty(), "trailing bytes after last request");
    requests
}

/// Decode only the requests after the handshake
pub(crate) fn decode_requests_after_handshake(bytes: &[u8]) -> Vec<BoltRequest> {
    decode_requests(&bytes[HANDSHAKE_SIZE..])
}

// ============================================================================
// Gate
// ============================================================================

#[derive(Default)]
struct GateState {
    entered: bool,
    released: bool,
}

/// Blocks the next read until the test releases it
#[derive(Clone, Default)]
pub(crate) struct Gate {
    inner: Arc<(Mutex<GateState>, Condvar)>,
}

impl Gate {
    /// Wait until a read reaches the gate
    pub(crate) fn wait_entered(&self) {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock();
        while !state.entered {
            cvar.wait(&mut state);
        }
    }

    /// Release the blocked read
    pub(crate) fn release(&self) {
        let (lock, cvar) = &*self.inner;
        lock.lock().released = true;
        cvar.notify_all();
    }

    pub(crate) fn pass(&self) {
        let (lock, cvar) = &*self.inner;
        let mut state = lock.lock();
        state.entered = true;
        cvar.notify_all();
        while !state.released {
            cvar.wait(&mut state);
        }
    }
}

// ============================================================================
// ScriptedChannel
// ============================================================================

/// In-memory channel
pub(crate) struct ScriptedChannel {
    input: VecDeque<u8>,
    written: Arc<Mutex<Vec<u8>>>,
    one_at_a_time: bool,
    write_limit: Option<usize>,
    gate: Option<Gate>,
    open: Arc<Mutex<bool>>,
}

impl ScriptedChannel {
    pub(crate) fn new(input: Vec<u8>) -> Self {
        Self {
            input: input.into(),
            written: Arc::new(Mutex::new(Vec::new())),
            one_at_a_time: false,
            write_limit: None,
            gate: None,
            open: Arc::new(Mutex::new(true)),
        }
    }

    /// Transfer one byte per call
    pub(crate) fn one_byte_at_a_time(mut self) -> Self {
        self.one_at_a_time = true;
        self
    }

    /// Behave as closed after `limit` bytes are written
    pub(crate) fn close_writes_after(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }

    /// Park the first read at the gate
    pub(crate) fn with_gate(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Handle to the written bytes
    pub(crate) fn written(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.written)
    }

    /// Handle to the open flag
    pub(crate) fn open_flag(&self) -> Arc<Mutex<bool>> {
        Arc::clone(&self.open)
    }
}

impl ByteChannel for ScriptedChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        if let Some(gate) = self.gate.take() {
            gate.pass();
        }
        if self.input.is_empty() {
            *self.open.lock() = false;
            return Ok(None);
        }
        let mut n = buf.len().min(self.input.len());
        if self.one_at_a_time {
            n = n.min(1);
        }
        for slot in buf.iter_mut().take(n) {
            *slot = self.input.pop_front().unwrap();
        }
        Ok(Some(n))
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<Option<usize>> {
        let mut written = self.written.lock();
        let mut n = buf.len();
        if let Some(limit) = self.write_limit {
            let room = limit.saturating_sub(written.len());
            if room == 0 && !buf.is_empty() {
                *self.open.lock() = false;
                return Ok(None);
            }
            n = n.min(room);
        }
        if self.one_at_a_time {
            n = n.min(1);
        }
        written.extend_from_slice(&buf[..n]);
        Ok(Some(n))
    }

    fn is_open(&self) -> bool {
        *self.open.lock()
    }

    fn close(&mut self) -> io::Result<()> {
        *self.open.lock() = false;
        Ok(())
    }
}

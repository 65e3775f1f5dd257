//! Transport
//!
//! Duplex byte channels and blocking reads and writes that either transfer
//! the whole buffer or fail with a typed error.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::driver::config::ServerAddress;
use crate::driver::error::{DriverError, DriverResult};

// ============================================================================
// ByteChannel
// ============================================================================

/// Duplex byte channel
///
/// A single call may transfer fewer bytes than requested, including zero.
/// `None` is returned only when the peer has closed.
pub trait ByteChannel: Send {
    /// Read some bytes. `None` means end of stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>>;

    /// Write some bytes. `None` means the channel is closed.
    fn write(&mut self, buf: &[u8]) -> io::Result<Option<usize>>;

    /// Whether the channel is open
    fn is_open(&self) -> bool;

    /// Close the channel
    fn close(&mut self) -> io::Result<()>;
}

// ============================================================================
// TcpChannel
// ============================================================================

/// TCP socket channel
#[derive(Debug)]
pub struct TcpChannel {
    stream: TcpStream,
    open: bool,
}

impl TcpChannel {
    /// Connect to a server. A `None` timeout uses the OS default.
    pub fn connect(address: &ServerAddress, timeout: Option<Duration>) -> DriverResult<Self> {
        let stream = match timeout {
            Some(timeout) => {
                let mut last_err = None;
                let mut connected = None;
                for addr in address.to_socket_addr().to_socket_addrs()? {
                    match TcpStream::connect_timeout(&addr, timeout) {
                        Ok(stream) => {
                            connected = Some(stream);
                            break;
                        }
                        Err(e) => last_err = Some(e),
                    }
                }
                match (connected, last_err) {
                    (Some(stream), _) => stream,
                    (None, Some(e)) => return Err(e.into()),
                    (None, None) => {
                        return Err(DriverError::configuration(format!(
                            "Address {} did not resolve to any socket address",
                            address
                        )))
                    }
                }
            }
            None => TcpStream::connect(address.to_socket_addr())?,
        };
        debug!(address = %address, "TCP connection established");
        Ok(Self::from_stream(stream))
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream) -> Self {
        Self { stream, open: true }
    }

    /// Set TCP_NODELAY
    pub fn set_nodelay(&self, nodelay: bool) -> DriverResult<()> {
        self.stream.set_nodelay(nodelay)?;
        Ok(())
    }
}

impl ByteChannel for TcpChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        match self.stream.read(buf)? {
            0 if !buf.is_empty() => {
                self.open = false;
                Ok(None)
            }
            n => Ok(Some(n)),
        }
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<Option<usize>> {
        match self.stream.write(buf) {
            Ok(0) if !buf.is_empty() => {
                self.open = false;
                Ok(None)
            }
            Ok(n) => Ok(Some(n)),
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                self.open = false;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) -> io::Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        match self.stream.shutdown(std::net::Shutdown::Both) {
            Err(e) if e.kind() != ErrorKind::NotConnected => Err(e),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// blocking_read / blocking_write
// ============================================================================

/// Read until the buffer is full
pub fn blocking_read<C: ByteChannel + ?Sized>(channel: &mut C, buf: &mut [u8]) -> DriverResult<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match channel.read(&mut buf[filled..]) {
            Ok(Some(n)) => filled += n,
            Ok(None) => {
                return Err(DriverError::terminated_receiving(
                    buf.len(),
                    describe_transferred(&buf[..filled]),
                ))
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Write the whole buffer
pub fn blocking_write<C: ByteChannel + ?Sized>(channel: &mut C, buf: &[u8]) -> DriverResult<()> {
    let mut written = 0;
    while written < buf.len() {
        match channel.write(&buf[written..]) {
            Ok(Some(n)) => written += n,
            Ok(None) => {
                return Err(DriverError::terminated_sending(
                    buf.len(),
                    describe_transferred(&buf[..written]),
                ))
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Bytes transferred so far, in hex
fn describe_transferred(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "none".to_string();
    }
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Tests
// ============================================================================

//! Bolt connection engine
//!
//! Connection layer that pipelines Bolt v1 requests over a socket and dispatches replies FIFO.
//!
//! # Architecture
//!
//! ```text
//! SocketConnector
//!   └── ConcurrencyGuard          (rejects concurrent use)
//!         └── SocketConnection    (outbox, failed state, observers)
//!               ├── ResponseHandler ── ResponseDispatcher (FIFO)
//!               │                  └── LoggingResponseHandler
//!               └── SocketClient  (handshake, chunked framing)
//!                     └── ByteChannel ── TcpChannel
//! ```

pub mod channel;
pub mod client;
pub mod collector;
pub mod connection;
pub mod connector;
pub mod guard;
pub mod handler;
pub mod logging;

#[cfg(test)]
pub(crate) mod testing;

pub use channel::{blocking_read, blocking_write, ByteChannel, TcpChannel};
pub use client::SocketClient;
pub use collector::{Collector, NoOpCollector, ResultCollector, ResultOutcome};
pub use connection::{Connection, ErrorObserver, SocketConnection};
pub use connector::{SocketConnector, TcpConnection};
pub use guard::ConcurrencyGuard;
pub use handler::{PendingResult, RequestKind, ResponseDispatcher, ResponseHandler};
pub use logging::{LogSink, LoggingResponseHandler, MessageLogger, TracingSink};

/// Default client name sent with INIT
pub const CLIENT_USER_AGENT: &str = concat!("bolt-client/", env!("CARGO_PKG_VERSION"));

//! Connection Engine
//!
//! Connection that queues requests, sends them together (pipelining) and hands
//! replies back to collectors in the order the requests were sent.
//!
//! ```text
//! run / pull_all / ...  ──► outbox ──flush──► SocketClient ──► channel
//!                        └─► handler queue
//! receive_one ◄── SocketClient ◄── channel
//!     └─► handler (FIFO) ──► collector
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::channel::ByteChannel;
use super::client::SocketClient;
use super::collector::{Collector, NoOpCollector};
use super::handler::{PendingResult, RequestKind, ResponseDispatcher, ResponseHandler};
use super::logging::{LoggingResponseHandler, MessageLogger};
use crate::bolt::{BoltRequest, BoltVersion, InitMessage, PackStreamValue, RunMessage};
use crate::driver::config::{AuthToken, Config};
use crate::driver::error::{DriverError, DriverResult};
use crate::driver::types::Value;

/// Error observer
pub type ErrorObserver = Box<dyn FnMut() + Send>;

// ============================================================================
// Connection trait
// ============================================================================

/// Operations offered by one connection
///
/// `run`, `pull_all`, `discard_all`, `reset` and `ack_failure` only queue requests.
/// `flush`, `sync`, `receive_one` and `init` perform the I/O.
pub trait Connection: Send {
    /// Send INIT and wait for the reply. Must be the first operation.
    fn init(&mut self, client_name: &str, auth_token: &AuthToken) -> DriverResult<()>;

    /// Queue a RUN
    fn run(
        &mut self,
        statement: &str,
        parameters: HashMap<String, Value>,
        collector: Box<dyn Collector>,
    ) -> DriverResult<()>;

    /// Queue a DISCARD_ALL
    fn discard_all(&mut self, collector: Box<dyn Collector>) -> DriverResult<()>;

    /// Queue a PULL_ALL
    fn pull_all(&mut self, collector: Box<dyn Collector>) -> DriverResult<()>;

    /// Queue a RESET. An IGNORED reply is fatal.
    fn reset(&mut self) -> DriverResult<()>;

    /// Queue an ACK_FAILURE. Any reply other than SUCCESS is fatal.
    fn ack_failure(&mut self) -> DriverResult<()>;

    /// Flush, then wait for the replies of every queued request
    fn sync(&mut self) -> DriverResult<()>;

    /// Send every queued request and return how many were sent
    fn flush(&mut self) -> DriverResult<usize>;

    /// Receive and dispatch one reply
    fn receive_one(&mut self) -> DriverResult<()>;

    /// Close the connection. Safe to call more than once.
    fn close(&mut self) -> DriverResult<()>;

    /// Whether the transport is still open
    fn is_open(&self) -> bool;

    /// Register an error observer
    fn on_error(&mut self, observer: ErrorObserver);

    /// Whether an unrecoverable error has occurred
    fn has_unrecoverable_errors(&self) -> bool;
}

// ============================================================================
// SocketConnection
// ============================================================================

/// Captures `server` from the INIT SUCCESS
struct ServerAgentCollector {
    agent: Arc<Mutex<Option<String>>>,
}

impl Collector for ServerAgentCollector {
    fn on_summary(&mut self, metadata: HashMap<String, PackStreamValue>) -> DriverResult<()> {
        *self.agent.lock() = metadata
            .get("server")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Ok(())
    }
}

/// Socket-backed connection
pub struct SocketConnection<C> {
    client: SocketClient<C>,
    handler: Box<dyn ResponseHandler>,
    outbox: Vec<BoltRequest>,
    logger: Option<MessageLogger>,
    observers: Vec<ErrorObserver>,
    server: Option<String>,
    /// A server failure has not been acknowledged
    failed: bool,
    unrecoverable: bool,
    closed: bool,
}

impl<C: ByteChannel> SocketConnection<C> {
    /// Create from config. Messages are logged through `tracing` when `log_messages` is set.
    pub fn new(client: SocketClient<C>, config: &Config) -> Self {
        let logger = config.log_messages.then(MessageLogger::default);
        Self::with_logger(client, logger)
    }

    /// Create with an explicit logger
    pub fn with_logger(client: SocketClient<C>, logger: Option<MessageLogger>) -> Self {
        let handler: Box<dyn ResponseHandler> = match &logger {
            Some(logger) => Box::new(LoggingResponseHandler::new(
                ResponseDispatcher::new(),
                logger.clone(),
            )),
            None => Box::new(ResponseDispatcher::new()),
        };
        Self {
            client,
            handler,
            outbox: Vec::new(),
            logger,
            observers: Vec::new(),
            server: None,
            failed: false,
            unrecoverable: false,
            closed: false,
        }
    }

    /// Server agent from the INIT reply
    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    /// Negotiated protocol version
    pub fn protocol_version(&self) -> Option<BoltVersion> {
        self.client.version()
    }

    /// Requests not yet sent
    pub fn queued(&self) -> usize {
        self.outbox.len()
    }

    /// Requests awaiting a reply
    pub fn pending(&self) -> usize {
        self.handler.pending()
    }

    /// Whether a server failure has not been acknowledged
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    fn ensure_usable(&self) -> DriverResult<()> {
        if self.closed {
            return Err(DriverError::client("The connection has been closed"));
        }
        if self.unrecoverable {
            return Err(DriverError::client(
                "The connection has unrecoverable errors and must be closed",
            ));
        }
        Ok(())
    }

    fn ensure_acknowledged(&self, request: &BoltRequest) -> DriverResult<()> {
        if self.failed {
            return Err(DriverError::client(format!(
                "Cannot queue {} before the previous failure is acknowledged with ACK_FAILURE or RESET",
                request.name()
            )));
        }
        Ok(())
    }

    fn queue(&mut self, request: BoltRequest, collector: Box<dyn Collector>) -> DriverResult<()> {
        self.ensure_usable()?;
        let kind = RequestKind::of(&request);
        match kind {
            RequestKind::Run | RequestKind::PullAll | RequestKind::DiscardAll => {
                self.ensure_acknowledged(&request)?
            }
            RequestKind::Reset | RequestKind::AckFailure => self.failed = false,
            RequestKind::Init => {}
        }
        if let Some(logger) = &self.logger {
            logger.client(&request);
        }
        self.handler.enqueue(PendingResult::new(kind, collector));
        self.outbox.push(request);
        Ok(())
    }

    fn notify_observers(&mut self) {
        for observer in &mut self.observers {
            observer();
        }
    }

    /// Record a fatal error. Observers are notified only the first time.
    fn fatal(&mut self, err: DriverError) -> DriverError {
        if !self.unrecoverable {
            self.unrecoverable = true;
            warn!(error = %err, code = err.code(), "connection marked unrecoverable");
            self.notify_observers();
        }
        err
    }

    fn server_failure(&mut self) {
        if !self.failed {
            self.failed = true;
            self.notify_observers();
        }
    }
}

impl<C: ByteChannel> Connection for SocketConnection<C> {
    fn init(&mut self, client_name: &str, auth_token: &AuthToken) -> DriverResult<()> {
        let token = auth_token.to_wire()?;
        let agent = Arc::new(Mutex::new(None));
        self.queue(
            BoltRequest::Init(InitMessage::new(client_name, token)),
            Box::new(ServerAgentCollector {
                agent: Arc::clone(&agent),
            }),
        )?;

        match self.sync() {
            Ok(()) => {
                self.server = agent.lock().take();
                debug!(client = client_name, server = ?self.server, "connection initialized");
                Ok(())
            }
            Err(DriverError::Server(e)) if e.is_authentication_error() => {
                Err(DriverError::Authentication(e))
            }
            Err(e) => Err(e),
        }
    }

    fn run(
        &mut self,
        statement: &str,
        parameters: HashMap<String, Value>,
        collector: Box<dyn Collector>,
    ) -> DriverResult<()> {
        let parameters = parameters
            .into_iter()
            .map(|(k, v)| (k, PackStreamValue::from(v)))
            .collect();
        self.queue(
            BoltRequest::Run(RunMessage::new(statement).with_parameters(parameters)),
            collector,
        )
    }

    fn discard_all(&mut self, collector: Box<dyn Collector>) -> DriverResult<()> {
        self.queue(BoltRequest::DiscardAll, collector)
    }

    fn pull_all(&mut self, collector: Box<dyn Collector>) -> DriverResult<()> {
        self.queue(BoltRequest::PullAll, collector)
    }

    fn reset(&mut self) -> DriverResult<()> {
        self.queue(BoltRequest::Reset, Box::new(NoOpCollector))
    }

    fn ack_failure(&mut self) -> DriverResult<()> {
        self.queue(BoltRequest::AckFailure, Box::new(NoOpCollector))
    }

    fn sync(&mut self) -> DriverResult<()> {
        self.flush()?;
        let mut first_failure = None;
        while self.handler.pending() > 0 {
            match self.receive_one() {
                Ok(()) => {}
                Err(DriverError::Server(e)) => {
                    first_failure.get_or_insert(e);
                }
                Err(e) => return Err(e),
            }
        }
        match first_failure {
            Some(e) => Err(DriverError::Server(e)),
            None => Ok(()),
        }
    }

    fn flush(&mut self) -> DriverResult<usize> {
        self.ensure_usable()?;
        if self.outbox.is_empty() {
            return Ok(0);
        }
        let requests = std::mem::take(&mut self.outbox);
        match self.client.send(&requests) {
            Ok(sent) => Ok(sent),
            Err(e) => Err(self.fatal(e)),
        }
    }

    fn receive_one(&mut self) -> DriverResult<()> {
        self.ensure_usable()?;
        let response = match self.client.receive_one() {
            Ok(response) => response,
            Err(e) => return Err(self.fatal(e)),
        };
        let head = self.handler.head_kind();
        match self.handler.handle(response) {
            Ok(()) => {
                // A failure received after RESET / ACK_FAILURE was queued is
                // only acknowledged once the server answers that request.
                if matches!(head, Some(RequestKind::Reset | RequestKind::AckFailure)) {
                    self.failed = false;
                }
                Ok(())
            }
            Err(e) if e.is_fatal() => Err(self.fatal(e)),
            Err(DriverError::Server(e)) => {
                self.server_failure();
                Err(DriverError::Server(e))
            }
            Err(e) => Err(e),
        }
    }

    fn close(&mut self) -> DriverResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.outbox.clear();
        debug!(pending = self.handler.pending(), "closing connection");
        self.client.stop()
    }

    fn is_open(&self) -> bool {
        self.client.is_open()
    }

    fn on_error(&mut self, observer: ErrorObserver) {
        self.observers.push(observer);
    }

    fn has_unrecoverable_errors(&self) -> bool {
        self.unrecoverable
    }
}

impl<C> fmt::Debug for SocketConnection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketConnection")
            .field("client", &self.client)
            .field("queued", &self.outbox.len())
            .field("pending", &self.handler.pending())
            .field("server", &self.server)
            .field("failed", &self.failed)
            .field("unrecoverable", &self.unrecoverable)
            .field("closed", &self.closed)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

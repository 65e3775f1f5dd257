//! Response Dispatcher
//!
//! Pending requests are queued FIFO and each incoming reply goes to the
//! collector of the request at the head.

use std::collections::VecDeque;
use std::fmt;

use super::collector::Collector;
use crate::bolt::BoltRequest;
use crate::bolt::BoltResponse;
use crate::driver::error::{DriverError, DriverResult, ServerError};

// ============================================================================
// RequestKind / PendingResult
// ============================================================================

/// Kind of request awaiting a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// INIT
    Init,
    /// RUN
    Run,
    /// PULL_ALL
    PullAll,
    /// DISCARD_ALL
    DiscardAll,
    /// RESET
    Reset,
    /// ACK_FAILURE
    AckFailure,
}

impl RequestKind {
    /// Kind of a request message
    pub fn of(request: &BoltRequest) -> Self {
        match request {
            BoltRequest::Init(_) => Self::Init,
            BoltRequest::Run(_) => Self::Run,
            BoltRequest::PullAll => Self::PullAll,
            BoltRequest::DiscardAll => Self::DiscardAll,
            BoltRequest::Reset => Self::Reset,
            BoltRequest::AckFailure => Self::AckFailure,
        }
    }

    /// Message name
    pub fn name(self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::Run => "RUN",
            Self::PullAll => "PULL_ALL",
            Self::DiscardAll => "DISCARD_ALL",
            Self::Reset => "RESET",
            Self::AckFailure => "ACK_FAILURE",
        }
    }

    /// Whether the request can receive RECORDs
    pub fn is_streaming(self) -> bool {
        self == Self::PullAll
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One request awaiting its terminal reply
pub struct PendingResult {
    kind: RequestKind,
    collector: Box<dyn Collector>,
}

impl PendingResult {
    /// Create a pending entry
    pub fn new(kind: RequestKind, collector: Box<dyn Collector>) -> Self {
        Self { kind, collector }
    }

    /// Request kind
    pub fn kind(&self) -> RequestKind {
        self.kind
    }
}

impl fmt::Debug for PendingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingResult").field("kind", &self.kind).finish()
    }
}

// ============================================================================
// ResponseHandler trait
// ============================================================================

/// Response handler
pub trait ResponseHandler: Send {
    /// Add a pending entry
    fn enqueue(&mut self, pending: PendingResult);

    /// Handle one reply
    ///
    /// A FAILURE is delivered to the collector, then returned as `DriverError::Server`.
    fn handle(&mut self, response: BoltResponse) -> DriverResult<()>;

    /// Number of pending entries
    fn pending(&self) -> usize;

    /// Kind of the head entry
    fn head_kind(&self) -> Option<RequestKind>;
}

// ============================================================================
// ResponseDispatcher
// ============================================================================

/// FIFO response dispatcher
#[derive(Debug, Default)]
pub struct ResponseDispatcher {
    queue: VecDeque<PendingResult>,
}

impl ResponseDispatcher {
    /// Empty dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    fn pop(&mut self, reply: &str) -> DriverResult<PendingResult> {
        self.queue.pop_front().ok_or_else(|| {
            DriverError::unexpected_reply(format!(
                "Received {} but no request is waiting for a reply",
                reply
            ))
        })
    }
}

impl ResponseHandler for ResponseDispatcher {
    fn enqueue(&mut self, pending: PendingResult) {
        self.queue.push_back(pending);
    }

    fn handle(&mut self, response: BoltResponse) -> DriverResult<()> {
        match response {
            BoltResponse::Record(record) => {
                let head = self.queue.front_mut().ok_or_else(|| {
                    DriverError::unexpected_reply("Received RECORD but no request is waiting")
                })?;
                if !head.kind.is_streaming() {
                    return Err(DriverError::unexpected_reply(format!(
                        "Received RECORD while waiting for the reply to {}",
                        head.kind
                    )));
                }
                head.collector.on_record(record.fields)
            }
            BoltResponse::Success(success) => {
                let mut head = self.pop("SUCCESS")?;
                match head.kind {
                    RequestKind::Run => head.collector.on_run_success(success.metadata),
                    _ => head.collector.on_summary(success.metadata),
                }
            }
            BoltResponse::Failure(failure) => {
                let mut head = self.pop("FAILURE")?;
                let error = ServerError::from(failure);
                head.collector.on_failure(&error);
                match head.kind {
                    RequestKind::AckFailure => Err(DriverError::unexpected_reply(format!(
                        "Invalid server response message `FAILURE {}` received for ACK_FAILURE",
                        error
                    ))),
                    _ => Err(DriverError::Server(error)),
                }
            }
            BoltResponse::Ignored => {
                let mut head = self.pop("IGNORED")?;
                head.collector.on_ignored();
                match head.kind {
                    RequestKind::Reset | RequestKind::AckFailure => {
                        Err(DriverError::unexpected_reply(format!(
                            "Invalid server response message `IGNORED` received for {}",
                            head.kind
                        )))
                    }
                    _ => Ok(()),
                }
            }
        }
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }

    fn head_kind(&self) -> Option<RequestKind> {
        self.queue.front().map(|p| p.kind)
    }
}

// ============================================================================
// Tests
// ============================================================================

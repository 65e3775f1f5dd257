//! Message logging
//!
//! Outgoing messages are logged one per line with a `C: ` prefix, incoming ones with `S: `.

use std::fmt;
use std::sync::Arc;

use super::handler::{PendingResult, RequestKind, ResponseHandler};
use crate::bolt::{BoltRequest, BoltResponse};
use crate::driver::error::DriverResult;

/// Target for message logs
pub const MESSAGE_LOG_TARGET: &str = "bolt::messages";

// ============================================================================
// LogSink
// ============================================================================

/// Sink receiving log lines
pub trait LogSink: Send + Sync {
    /// One debug-level line
    fn debug(&self, line: &str);
}

/// Default sink that forwards to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn debug(&self, line: &str) {
        tracing::debug!(target: MESSAGE_LOG_TARGET, "{}", line);
    }
}

/// Writes messages to the sink in the canonical format
#[derive(Clone)]
pub struct MessageLogger {
    sink: Arc<dyn LogSink>,
}

impl MessageLogger {
    /// Create a logger
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Outgoing message
    pub fn client(&self, request: &BoltRequest) {
        self.sink.debug(&format!("C: {}", request));
    }

    /// Incoming message
    pub fn server(&self, response: &BoltResponse) {
        self.sink.debug(&format!("S: {}", response));
    }
}

impl Default for MessageLogger {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl fmt::Debug for MessageLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageLogger").finish_non_exhaustive()
    }
}

// ============================================================================
// LoggingResponseHandler
// ============================================================================

/// Decorator that logs incoming messages, then hands them to the inner handler
///
/// The inner handler's result, errors included, is returned unchanged.
pub struct LoggingResponseHandler<H> {
    inner: H,
    logger: MessageLogger,
}

impl<H: ResponseHandler> LoggingResponseHandler<H> {
    /// Create the decorator
    pub fn new(inner: H, logger: MessageLogger) -> Self {
        Self { inner, logger }
    }

    /// Inner handler
    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H: ResponseHandler> ResponseHandler for LoggingResponseHandler<H> {
    fn enqueue(&mut self, pending: PendingResult) {
        self.inner.enqueue(pending);
    }

    fn handle(&mut self, response: BoltResponse) -> DriverResult<()> {
        self.logger.server(&response);
        self.inner.handle(response)
    }

    fn pending(&self) -> usize {
        self.inner.pending()
    }

    fn head_kind(&self) -> Option<RequestKind> {
        self.inner.head_kind()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use parking_lot::Mutex;

    use super::*;
    use crate::bolt::{
        FailureMessage, InitMessage, PackStreamValue, RecordMessage, RunMessage, SuccessMessage,
    };
    use crate::driver::bolt::collector::NoOpCollector;
    use crate::driver::bolt::handler::ResponseDispatcher;
    use crate::driver::error::DriverError;

    #[derive(Default)]
    struct RecordingSink {
        lines: Mutex<Vec<String>>,
    }

    impl LogSink for RecordingSink {
        fn debug(&self, line: &str) {
            self.lines.lock().push(line.to_string());
        }
    }

    fn logger() -> (MessageLogger, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        (MessageLogger::new(sink.clone()), sink)
    }

    fn last_line(sink: &RecordingSink) -> String {
        sink.lines.lock().last().cloned().unwrap_or_default()
    }

    #[test]
    fn test_request_lines() {
        let (logger, sink) = logger();

        logger.client(&BoltRequest::Init(InitMessage::new("client", HashMap::new())));
        assert_eq!(last_line(&sink), "C: [INIT \"client\"]");

        let mut params = HashMap::new();
        params.insert(
            "value".to_string(),
            PackStreamValue::List(vec!["cat".into(), "cat".into(), "cat".into()]),
        );
        logger.client(&BoltRequest::Run(RunMessage::new("stat").with_parameters(params)));
        assert_eq!(last_line(&sink), "C: [RUN \"stat\" {value=[\"cat\", \"cat\", \"cat\"]}]");

        logger.client(&BoltRequest::PullAll);
        assert_eq!(last_line(&sink), "C: [PULL_ALL]");
        logger.client(&BoltRequest::DiscardAll);
        assert_eq!(last_line(&sink), "C: [DISCARD_ALL]");
        logger.client(&BoltRequest::Reset);
        assert_eq!(last_line(&sink), "C: [RESET]");
        logger.client(&BoltRequest::AckFailure);
        assert_eq!(last_line(&sink), "C: [ACK_FAILURE]");
    }

    #[test]
    fn test_response_lines() {
        let (logger, sink) = logger();
        let mut handler = LoggingResponseHandler::new(ResponseDispatcher::new(), logger);
        for _ in 0..3 {
            handler.enqueue(PendingResult::new(RequestKind::PullAll, Box::new(NoOpCollector)));
        }

        handler.handle(BoltResponse::Record(RecordMessage::new(vec![]))).unwrap();
        assert_eq!(last_line(&sink), "S: [RECORD []]");

        handler.handle(BoltResponse::Success(SuccessMessage::new())).unwrap();
        assert_eq!(last_line(&sink), "S: [SUCCESS {}]");

        handler.handle(BoltResponse::Ignored).unwrap();
        assert_eq!(last_line(&sink), "S: [IGNORED]");

        handler.enqueue(PendingResult::new(RequestKind::Run, Box::new(NoOpCollector)));
        let _ = handler.handle(BoltResponse::Failure(FailureMessage::new("code.error", "message")));
        assert_eq!(last_line(&sink), "S: [FAILURE code.error \"message\"]");
        assert_eq!(sink.lines.lock().len(), 4);
    }

    #[test]
    fn test_inner_error_passes_through_after_logging() {
        let (logger, sink) = logger();
        let mut handler = LoggingResponseHandler::new(ResponseDispatcher::new(), logger);
        handler.enqueue(PendingResult::new(RequestKind::Run, Box::new(NoOpCollector)));

        let err = handler
            .handle(BoltResponse::Failure(FailureMessage::new("code.error", "message")))
            .unwrap_err();
        assert!(matches!(err, DriverError::Server(ref e) if e.code == "code.error"));
        assert_eq!(last_line(&sink), "S: [FAILURE code.error \"message\"]");

        let err = handler.handle(BoltResponse::Ignored).unwrap_err();
        assert!(matches!(err, DriverError::UnexpectedReply(_)));
        assert_eq!(last_line(&sink), "S: [IGNORED]");
        assert_eq!(handler.pending(), 0);
    }
}

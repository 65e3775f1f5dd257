//! Result Collector
//!
//! Caller-side sinks that receive the replies of pending requests.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::bolt::PackStreamValue;
use crate::driver::error::{DriverError, DriverResult, ServerError};
use crate::driver::record::Record;
use crate::driver::summary::ResultSummary;
use crate::driver::types::Value;

// ============================================================================
// Collector trait
// ============================================================================

/// Response sink
///
/// Each request gets exactly one terminal reply (SUCCESS, FAILURE or IGNORED).
/// RECORDs are delivered zero or more times, only for PULL_ALL results.
pub trait Collector: Send {
    /// SUCCESS metadata of a RUN
    fn on_run_success(&mut self, _metadata: HashMap<String, PackStreamValue>) -> DriverResult<()> {
        Ok(())
    }

    /// RECORD fields
    fn on_record(&mut self, _fields: Vec<PackStreamValue>) -> DriverResult<()> {
        Ok(())
    }

    /// SUCCESS metadata of any request other than RUN
    fn on_summary(&mut self, _metadata: HashMap<String, PackStreamValue>) -> DriverResult<()> {
        Ok(())
    }

    /// FAILURE
    fn on_failure(&mut self, _error: &ServerError) {}

    /// IGNORED
    fn on_ignored(&mut self) {}
}

/// Sink that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCollector;

impl Collector for NoOpCollector {}

/// Convert metadata into a Value map
pub(crate) fn to_metadata(
    metadata: HashMap<String, PackStreamValue>,
) -> DriverResult<HashMap<String, Value>> {
    metadata
        .into_iter()
        .map(|(k, v)| Value::try_from(v).map(|v| (k, v)))
        .collect()
}

// ============================================================================
// ResultCollector
// ============================================================================

/// Result state
#[derive(Debug, Clone, PartialEq)]
pub enum ResultOutcome {
    /// No reply yet
    Pending,
    /// RUN succeeded, waiting for the stream
    Streaming,
    /// Stream completed
    Completed,
    /// Server failure
    Failed(ServerError),
    /// Ignored
    Ignored,
}

#[derive(Debug)]
struct ResultState {
    keys: Arc<[String]>,
    records: Vec<Record>,
    summary: ResultSummary,
    outcome: ResultOutcome,
}

/// Sink that buffers records and the summary
///
/// Clones share state, so the same collector is passed to RUN and PULL_ALL
/// and the caller reads the result through another clone.
#[derive(Debug, Clone)]
pub struct ResultCollector {
    state: Arc<Mutex<ResultState>>,
}

impl ResultCollector {
    /// Create a collector
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ResultState {
                keys: Arc::from(Vec::new()),
                records: Vec::new(),
                summary: ResultSummary::new(statement),
                outcome: ResultOutcome::Pending,
            })),
        }
    }

    /// Result keys
    pub fn keys(&self) -> Arc<[String]> {
        Arc::clone(&self.state.lock().keys)
    }

    /// Records received so far
    pub fn records(&self) -> Vec<Record> {
        self.state.lock().records.clone()
    }

    /// Take the received records
    pub fn take_records(&self) -> Vec<Record> {
        std::mem::take(&mut self.state.lock().records)
    }

    /// Result summary
    pub fn summary(&self) -> ResultSummary {
        self.state.lock().summary.clone()
    }

    /// Current outcome
    pub fn outcome(&self) -> ResultOutcome {
        self.state.lock().outcome.clone()
    }

    /// Whether a terminal reply has arrived
    pub fn is_done(&self) -> bool {
        !matches!(
            self.state.lock().outcome,
            ResultOutcome::Pending | ResultOutcome::Streaming
        )
    }

    /// Server failure, if any
    pub fn error(&self) -> Option<ServerError> {
        match &self.state.lock().outcome {
            ResultOutcome::Failed(e) => Some(e.clone()),
            _ => None,
        }
    }

    /// Whether IGNORED was received
    pub fn was_ignored(&self) -> bool {
        self.state.lock().outcome == ResultOutcome::Ignored
    }
}

impl Collector for ResultCollector {
    fn on_run_success(&mut self, metadata: HashMap<String, PackStreamValue>) -> DriverResult<()> {
        let metadata = to_metadata(metadata)?;
        let keys = match metadata.get("fields") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::List(fields)) => fields
                .iter()
                .map(|f| {
                    f.as_str().map(str::to_string).ok_or_else(|| {
                        DriverError::protocol(format!(
                            "Expected result field name to be a string, got {}",
                            f.type_name()
                        ))
                    })
                })
                .collect::<DriverResult<Vec<_>>>()?,
            Some(other) => {
                return Err(DriverError::protocol(format!(
                    "Expected `fields` to be a list, got {}",
                    other.type_name()
                )))
            }
        };

        let mut state = self.state.lock();
        state.summary.apply_run_metadata(&metadata)?;
        state.keys = keys.into();
        state.outcome = ResultOutcome::Streaming;
        Ok(())
    }

    fn on_record(&mut self, fields: Vec<PackStreamValue>) -> DriverResult<()> {
        let mut state = self.state.lock();
        let record = Record::from_fields(Arc::clone(&state.keys), fields)?;
        state.records.push(record);
        Ok(())
    }

    fn on_summary(&mut self, metadata: HashMap<String, PackStreamValue>) -> DriverResult<()> {
        let metadata = to_metadata(metadata)?;
        let mut state = self.state.lock();
        state.summary.apply_stream_metadata(&metadata)?;
        state.outcome = ResultOutcome::Completed;
        Ok(())
    }

    fn on_failure(&mut self, error: &ServerError) {
        self.state.lock().outcome = ResultOutcome::Failed(error.clone());
    }

    fn on_ignored(&mut self) {
        let mut state = self.state.lock();
        // RUN's FAILURE stays visible when the paired PULL_ALL is ignored.
        if matches!(state.outcome, ResultOutcome::Pending | ResultOutcome::Streaming) {
            state.outcome = ResultOutcome::Ignored;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::summary::StatementType;

    fn run_metadata() -> HashMap<String, PackStreamValue> {
        let mut metadata = HashMap::new();
        metadata.insert(
            "fields".to_string(),
            PackStreamValue::List(vec!["n".into(), "name".into()]),
        );
        metadata.insert("result_available_after".to_string(), 12i64.into());
        metadata
    }

    #[test]
    fn test_collects_records_and_summary() {
        let handle = ResultCollector::new("MATCH (n) RETURN n, n.name AS name");
        let mut run = handle.clone();
        let mut pull = handle.clone();

        run.on_run_success(run_metadata()).unwrap();
        assert_eq!(handle.outcome(), ResultOutcome::Streaming);
        assert_eq!(&*handle.keys(), &["n".to_string(), "name".to_string()]);

        pull.on_record(vec![1i64.into(), "Alice".into()]).unwrap();
        pull.on_record(vec![2i64.into(), "Bob".into()]).unwrap();

        let mut summary = HashMap::new();
        summary.insert("type".to_string(), "r".into());
        pull.on_summary(summary).unwrap();

        assert!(handle.is_done());
        let records = handle.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get_string("name").unwrap(), "Bob");

        let summary = handle.summary();
        assert_eq!(summary.statement_type, Some(StatementType::ReadOnly));
        assert_eq!(
            summary.result_available_after,
            Some(std::time::Duration::from_millis(12))
        );
    }

    #[test]
    fn test_record_width_mismatch() {
        let mut collector = ResultCollector::new("RETURN 1");
        collector.on_run_success(run_metadata()).unwrap();
        let err = collector.on_record(vec![1i64.into()]).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_bad_fields_metadata() {
        let mut collector = ResultCollector::new("RETURN 1");
        let mut metadata = HashMap::new();
        metadata.insert("fields".to_string(), PackStreamValue::List(vec![1i64.into()]));
        assert!(matches!(
            collector.on_run_success(metadata),
            Err(DriverError::Protocol(_))
        ));
    }

    #[test]
    fn test_failure_and_ignored() {
        let handle = ResultCollector::new("RETURN 1");
        let mut collector = handle.clone();
        collector.on_failure(&ServerError::new("Neo.ClientError.Statement.SyntaxError", "bad"));
        assert!(handle.is_done());
        assert_eq!(
            handle.error().map(|e| e.code),
            Some("Neo.ClientError.Statement.SyntaxError".to_string())
        );

        let handle = ResultCollector::new("RETURN 1");
        let mut collector = handle.clone();
        collector.on_ignored();
        assert!(handle.was_ignored());
        assert!(handle.error().is_none());
    }

    #[test]
    fn test_ignored_keeps_earlier_failure() {
        let handle = ResultCollector::new("RETURN");
        let mut run = handle.clone();
        let mut pull = handle.clone();
        run.on_failure(&ServerError::new("Neo.ClientError.Statement.SyntaxError", "bad"));
        pull.on_ignored();

        assert!(!handle.was_ignored());
        assert_eq!(handle.error().map(|e| e.message), Some("bad".to_string()));
    }

    #[test]
    fn test_no_op_collector_accepts_everything() {
        let mut collector = NoOpCollector;
        assert!(collector.on_record(vec![PackStreamValue::Null]).is_ok());
        assert!(collector.on_summary(HashMap::new()).is_ok());
        collector.on_ignored();
    }
}

//! Concurrency Guard
//!
//! Rejects concurrent use of one connection immediately instead of waiting.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, MutexGuard};

use super::collector::Collector;
use super::connection::{Connection, ErrorObserver};
use crate::driver::config::AuthToken;
use crate::driver::error::{DriverError, DriverResult};
use crate::driver::types::Value;

const CONCURRENT_USE: &str = "Multiple threads are using the same connection at the same time. \
    A connection can only be driven by one thread at a time; use a distinct connection per thread.";

/// Connection decorator that fails fast on concurrent use
///
/// The `&self` methods take an in-use marker and delegate, returning
/// `DriverError::Concurrency` when the marker is already held. The marker is
/// released when the delegated call returns, even on failure. The
/// [`Connection`] impl delegates directly since `&mut self` already proves
/// exclusive access.
pub struct ConcurrencyGuard<C> {
    inner: Mutex<C>,
    /// Last observed `has_unrecoverable_errors` of the inner connection
    unrecoverable: AtomicBool,
}

impl<C: Connection> ConcurrencyGuard<C> {
    /// Wrap a connection
    pub fn new(inner: C) -> Self {
        let unrecoverable = AtomicBool::new(inner.has_unrecoverable_errors());
        Self {
            inner: Mutex::new(inner),
            unrecoverable,
        }
    }

    /// Unwrap the inner connection
    pub fn into_inner(self) -> C {
        self.inner.into_inner()
    }

    /// Mutable access to the inner connection
    pub fn get_mut(&mut self) -> &mut C {
        self.inner.get_mut()
    }

    fn acquire(&self) -> DriverResult<MutexGuard<'_, C>> {
        self.inner
            .try_lock()
            .ok_or_else(|| DriverError::concurrency(CONCURRENT_USE))
    }

    /// Run `op` while holding the in-use marker
    pub fn with<T>(&self, op: impl FnOnce(&mut C) -> DriverResult<T>) -> DriverResult<T> {
        let mut conn = self.acquire()?;
        let result = op(&mut conn);
        self.observe(&conn);
        result
    }

    fn observe(&self, conn: &C) {
        if conn.has_unrecoverable_errors() {
            self.unrecoverable.store(true, Ordering::Release);
        }
    }

    fn delegate<T>(&mut self, op: impl FnOnce(&mut C) -> T) -> T {
        let conn = self.inner.get_mut();
        let result = op(&mut *conn);
        if conn.has_unrecoverable_errors() {
            *self.unrecoverable.get_mut() = true;
        }
        result
    }

    /// INIT
    pub fn init(&self, client_name: &str, auth_token: &AuthToken) -> DriverResult<()> {
        self.with(|c| c.init(client_name, auth_token))
    }

    /// RUN
    pub fn run(
        &self,
        statement: &str,
        parameters: HashMap<String, Value>,
        collector: Box<dyn Collector>,
    ) -> DriverResult<()> {
        self.with(|c| c.run(statement, parameters, collector))
    }

    /// DISCARD_ALL
    pub fn discard_all(&self, collector: Box<dyn Collector>) -> DriverResult<()> {
        self.with(|c| c.discard_all(collector))
    }

    /// PULL_ALL
    pub fn pull_all(&self, collector: Box<dyn Collector>) -> DriverResult<()> {
        self.with(|c| c.pull_all(collector))
    }

    /// RESET
    pub fn reset(&self) -> DriverResult<()> {
        self.with(|c| c.reset())
    }

    /// ACK_FAILURE
    pub fn ack_failure(&self) -> DriverResult<()> {
        self.with(|c| c.ack_failure())
    }

    /// sync
    pub fn sync(&self) -> DriverResult<()> {
        self.with(|c| c.sync())
    }

    /// flush
    pub fn flush(&self) -> DriverResult<usize> {
        self.with(|c| c.flush())
    }

    /// receive_one
    pub fn receive_one(&self) -> DriverResult<()> {
        self.with(|c| c.receive_one())
    }

    /// close
    pub fn close(&self) -> DriverResult<()> {
        self.with(|c| c.close())
    }

    /// Whether the transport is still open
    pub fn is_open(&self) -> DriverResult<bool> {
        self.with(|c| Ok(c.is_open()))
    }

    /// Register an error observer
    pub fn on_error(&self, observer: ErrorObserver) -> DriverResult<()> {
        self.with(|c| {
            c.on_error(observer);
            Ok(())
        })
    }

    /// Whether an unrecoverable error has occurred
    pub fn has_unrecoverable_errors(&self) -> DriverResult<bool> {
        self.with(|c| Ok(c.has_unrecoverable_errors()))
    }
}

impl<C: Connection> Connection for ConcurrencyGuard<C> {
    fn init(&mut self, client_name: &str, auth_token: &AuthToken) -> DriverResult<()> {
        self.delegate(|c| c.init(client_name, auth_token))
    }

    fn run(
        &mut self,
        statement: &str,
        parameters: HashMap<String, Value>,
        collector: Box<dyn Collector>,
    ) -> DriverResult<()> {
        self.delegate(|c| c.run(statement, parameters, collector))
    }

    fn discard_all(&mut self, collector: Box<dyn Collector>) -> DriverResult<()> {
        self.delegate(|c| c.discard_all(collector))
    }

    fn pull_all(&mut self, collector: Box<dyn Collector>) -> DriverResult<()> {
        self.delegate(|c| c.pull_all(collector))
    }

    fn reset(&mut self) -> DriverResult<()> {
        self.delegate(|c| c.reset())
    }

    fn ack_failure(&mut self) -> DriverResult<()> {
        self.delegate(|c| c.ack_failure())
    }

    fn sync(&mut self) -> DriverResult<()> {
        self.delegate(|c| c.sync())
    }

    fn flush(&mut self) -> DriverResult<usize> {
        self.delegate(|c| c.flush())
    }

    fn receive_one(&mut self) -> DriverResult<()> {
        self.delegate(|c| c.receive_one())
    }

    fn close(&mut self) -> DriverResult<()> {
        self.delegate(|c| c.close())
    }

    fn is_open(&self) -> bool {
        // A connection busy on another thread counts as open.
        self.inner.try_lock().map_or(true, |c| c.is_open())
    }

    fn on_error(&mut self, observer: ErrorObserver) {
        self.get_mut().on_error(observer)
    }

    fn has_unrecoverable_errors(&self) -> bool {
        self.unrecoverable.load(Ordering::Acquire)
            || self
                .inner
                .try_lock()
                .map_or(false, |c| c.has_unrecoverable_errors())
    }
}

impl<C: fmt::Debug> fmt::Debug for ConcurrencyGuard<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(conn) => f.debug_struct("ConcurrencyGuard").field("inner", &*conn).finish(),
            None => f.debug_struct("ConcurrencyGuard").field("inner", &"<in use>").finish(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::bolt::codec::DEFAULT_MAX_MESSAGE_SIZE;
    use crate::bolt::{BoltResponse, SuccessMessage};
    use crate::driver::bolt::client::SocketClient;
    use crate::driver::bolt::collector::NoOpCollector;
    use crate::driver::bolt::connection::SocketConnection;
    use crate::driver::bolt::testing::{decode_requests, server_bytes, Gate, ScriptedChannel};
    use crate::driver::config::Config;

    fn guarded(channel: ScriptedChannel) -> ConcurrencyGuard<SocketConnection<ScriptedChannel>> {
        let client = SocketClient::new(channel, DEFAULT_MAX_MESSAGE_SIZE);
        ConcurrencyGuard::new(SocketConnection::new(client, &Config::default()))
    }

    #[test]
    fn test_sequential_use_is_allowed() {
        let channel = ScriptedChannel::new(server_bytes(vec![
            BoltResponse::Success(SuccessMessage::new()),
            BoltResponse::Success(SuccessMessage::new()),
        ]));
        let guard = guarded(channel);

        guard.run("RETURN 1", HashMap::new(), Box::new(NoOpCollector)).unwrap();
        guard.discard_all(Box::new(NoOpCollector)).unwrap();
        guard.sync().unwrap();
        assert!(!guard.has_unrecoverable_errors().unwrap());
    }

    #[test]
    fn test_concurrent_use_fails_fast() {
        let gate = Gate::default();
        let channel = ScriptedChannel::new(server_bytes(vec![BoltResponse::Success(
            SuccessMessage::new(),
        )]))
        .with_gate(gate.clone());
        let written = channel.written();
        let guard = Arc::new(guarded(channel));

        guard.reset().unwrap();
        let worker = {
            let guard = Arc::clone(&guard);
            thread::spawn(move || guard.sync())
        };

        // worker is parked in its first read
        gate.wait_entered();
        let before = written.lock().clone();

        let err = guard.run("RETURN 1", HashMap::new(), Box::new(NoOpCollector)).unwrap_err();
        assert!(matches!(err, DriverError::Concurrency(_)));
        assert_eq!(err.code(), "concurrency");
        assert!(matches!(guard.flush(), Err(DriverError::Concurrency(_))));
        assert!(matches!(guard.is_open(), Err(DriverError::Concurrency(_))));
        assert_eq!(*written.lock(), before);

        gate.release();
        worker.join().unwrap().unwrap();

        // usable again once the marker is released
        assert_eq!(guard.flush().unwrap(), 0);
        assert_eq!(decode_requests(&written.lock()).len(), 1);
    }

    #[test]
    fn test_marker_cleared_after_failure() {
        let guard = guarded(ScriptedChannel::new(vec![]));
        guard.reset().unwrap();
        assert!(matches!(guard.sync(), Err(DriverError::ConnectionTerminated(_))));
        assert!(guard.has_unrecoverable_errors().unwrap());
        guard.close().unwrap();
    }

    #[test]
    fn test_unrecoverable_visible_while_busy() {
        let guard = Arc::new(guarded(ScriptedChannel::new(vec![])));
        guard.reset().unwrap();
        assert!(guard.sync().is_err());

        let gate = Gate::default();
        let worker = {
            let guard = Arc::clone(&guard);
            let gate = gate.clone();
            thread::spawn(move || {
                guard.with(|_| {
                    gate.pass();
                    Ok(())
                })
            })
        };

        gate.wait_entered();
        assert!(Connection::has_unrecoverable_errors(&*guard));
        assert!(matches!(
            guard.has_unrecoverable_errors(),
            Err(DriverError::Concurrency(_))
        ));
        gate.release();
        worker.join().unwrap().unwrap();
        assert!(Connection::has_unrecoverable_errors(&*guard));
    }

    #[test]
    fn test_exclusive_access_delegates() {
        let mut guard = guarded(ScriptedChannel::new(server_bytes(vec![BoltResponse::Success(
            SuccessMessage::new(),
        )])));
        Connection::reset(&mut guard).unwrap();
        Connection::sync(&mut guard).unwrap();
        assert!(Connection::is_open(&guard));
        assert!(!Connection::has_unrecoverable_errors(&guard));
        assert_eq!(guard.get_mut().pending(), 0);
    }
}

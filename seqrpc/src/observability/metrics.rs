//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Counters for routers and transports.
//!
//! Counters are plain atomics so they are always available. With the
//! `observability` feature enabled every increment is also forwarded to the
//! `metrics` facade under the `seqrpc.` prefix.

use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! export {
    ($name:literal, $amount:expr) => {
        #[cfg(feature = "observability")]
        ::metrics::counter!(concat!("seqrpc.", $name)).increment($amount);
    };
}

/// Metrics for one transport's connection and traffic.
///
/// # Examples
///
/// ```rust
/// use seqrpc::observability::TransportMetrics;
///
/// let metrics = TransportMetrics::new();
/// metrics.record_connection_opened();
/// metrics.record_bytes_sent(1024);
///
/// assert_eq!(metrics.active_connections(), 1);
/// assert_eq!(metrics.total_bytes_sent(), 1024);
/// ```
#[derive(Debug, Default)]
pub struct TransportMetrics {
    connections_opened: AtomicU64,
    connections_closed: AtomicU64,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
    connection_errors: AtomicU64,
    read_errors: AtomicU64,
    write_errors: AtomicU64,
}

impl TransportMetrics {
    /// Creates zeroed metrics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a connection being established.
    pub fn record_connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
        export!("transport.connections.opened", 1);
    }

    /// Records a connection being closed.
    pub fn record_connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
        export!("transport.connections.closed", 1);
    }

    /// Records bytes written.
    pub fn record_bytes_sent(&self, bytes: u64) {
        self.bytes_sent.fetch_add(bytes, Ordering::Relaxed);
        export!("transport.bytes.sent", bytes);
    }

    /// Records bytes read.
    pub fn record_bytes_received(&self, bytes: u64) {
        self.bytes_received.fetch_add(bytes, Ordering::Relaxed);
        export!("transport.bytes.received", bytes);
    }

    /// Records a failed connection attempt.
    pub fn record_connection_error(&self) {
        self.connection_errors.fetch_add(1, Ordering::Relaxed);
        export!("transport.errors.connection", 1);
    }

    /// Records a failed read.
    pub fn record_read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
        export!("transport.errors.read", 1);
    }

    /// Records a failed write.
    pub fn record_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
        export!("transport.errors.write", 1);
    }

    /// Connections opened and not yet closed.
    pub fn active_connections(&self) -> u64 {
        let opened = self.connections_opened.load(Ordering::Relaxed);
        let closed = self.connections_closed.load(Ordering::Relaxed);
        opened.saturating_sub(closed)
    }

    /// Total connections opened.
    pub fn total_connections_opened(&self) -> u64 {
        self.connections_opened.load(Ordering::Relaxed)
    }

    /// Total bytes written.
    pub fn total_bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    /// Total bytes read.
    pub fn total_bytes_received(&self) -> u64 {
        self.bytes_received.load(Ordering::Relaxed)
    }

    /// Total failed connection attempts.
    pub fn total_connection_errors(&self) -> u64 {
        self.connection_errors.load(Ordering::Relaxed)
    }

    /// Total failed reads.
    pub fn total_read_errors(&self) -> u64 {
        self.read_errors.load(Ordering::Relaxed)
    }

    /// Total failed writes.
    pub fn total_write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }
}

/// A point-in-time copy of [`RouterMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterMetricsSnapshot {
    /// Calls handed to `push`
    pub calls_pushed: u64,
    /// Calls written to the transport
    pub calls_sent: u64,
    /// Returns matched to a waiting call
    pub returns_matched: u64,
    /// Returns that matched no waiting call
    pub returns_unmatched: u64,
    /// Returns that arrived after their call timed out
    pub late_returns: u64,
    /// Inbound calls executed
    pub calls_dispatched: u64,
    /// Inbound calls answered with a remote error
    pub dispatch_failures: u64,
    /// Outbound calls that timed out
    pub timeouts: u64,
    /// Uncollected void returns evicted
    pub void_evictions: u64,
    /// Messages dropped because they could not be encoded or decoded
    pub protocol_errors: u64,
    /// Teardowns caused by transport failure
    pub teardowns: u64,
}

/// Counters describing what a router has done.
#[derive(Debug, Default)]
pub struct RouterMetrics {
    calls_pushed: AtomicU64,
    calls_sent: AtomicU64,
    returns_matched: AtomicU64,
    returns_unmatched: AtomicU64,
    late_returns: AtomicU64,
    calls_dispatched: AtomicU64,
    dispatch_failures: AtomicU64,
    timeouts: AtomicU64,
    void_evictions: AtomicU64,
    protocol_errors: AtomicU64,
    teardowns: AtomicU64,
}

impl RouterMetrics {
    /// Creates zeroed metrics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_pushed(&self) {
        self.calls_pushed.fetch_add(1, Ordering::Relaxed);
        export!("router.calls.pushed", 1);
    }

    pub(crate) fn record_sent(&self) {
        self.calls_sent.fetch_add(1, Ordering::Relaxed);
        export!("router.calls.sent", 1);
    }

    pub(crate) fn record_return_matched(&self) {
        self.returns_matched.fetch_add(1, Ordering::Relaxed);
        export!("router.returns.matched", 1);
    }

    pub(crate) fn record_return_unmatched(&self) {
        self.returns_unmatched.fetch_add(1, Ordering::Relaxed);
        export!("router.returns.unmatched", 1);
    }

    pub(crate) fn record_late_return(&self) {
        self.late_returns.fetch_add(1, Ordering::Relaxed);
        export!("router.returns.late", 1);
    }

    pub(crate) fn record_dispatched(&self, failed: bool) {
        self.calls_dispatched.fetch_add(1, Ordering::Relaxed);
        export!("router.calls.dispatched", 1);
        if failed {
            self.dispatch_failures.fetch_add(1, Ordering::Relaxed);
            export!("router.calls.dispatch_failures", 1);
        }
    }

    pub(crate) fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
        export!("router.calls.timeouts", 1);
    }

    pub(crate) fn record_void_eviction(&self) {
        self.void_evictions.fetch_add(1, Ordering::Relaxed);
        export!("router.returns.void_evictions", 1);
    }

    pub(crate) fn record_protocol_error(&self) {
        self.protocol_errors.fetch_add(1, Ordering::Relaxed);
        export!("router.protocol_errors", 1);
    }

    pub(crate) fn record_teardown(&self) {
        self.teardowns.fetch_add(1, Ordering::Relaxed);
        export!("router.teardowns", 1);
    }

    /// Copies the current counter values.
    pub fn snapshot(&self) -> RouterMetricsSnapshot {
        RouterMetricsSnapshot {
            calls_pushed: self.calls_pushed.load(Ordering::Relaxed),
            calls_sent: self.calls_sent.load(Ordering::Relaxed),
            returns_matched: self.returns_matched.load(Ordering::Relaxed),
            returns_unmatched: self.returns_unmatched.load(Ordering::Relaxed),
            late_returns: self.late_returns.load(Ordering::Relaxed),
            calls_dispatched: self.calls_dispatched.load(Ordering::Relaxed),
            dispatch_failures: self.dispatch_failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            void_evictions: self.void_evictions.load(Ordering::Relaxed),
            protocol_errors: self.protocol_errors.load(Ordering::Relaxed),
            teardowns: self.teardowns.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_connection_accounting() {
        let metrics = TransportMetrics::new();
        metrics.record_connection_opened();
        metrics.record_connection_opened();
        metrics.record_connection_closed();
        assert_eq!(metrics.active_connections(), 1);
        assert_eq!(metrics.total_connections_opened(), 2);
    }

    #[test]
    fn test_transport_errors() {
        let metrics = TransportMetrics::new();
        metrics.record_read_error();
        metrics.record_write_error();
        metrics.record_connection_error();
        assert_eq!(metrics.total_read_errors(), 1);
        assert_eq!(metrics.total_write_errors(), 1);
        assert_eq!(metrics.total_connection_errors(), 1);
    }

    #[test]
    fn test_router_snapshot() {
        let metrics = RouterMetrics::new();
        metrics.record_pushed();
        metrics.record_dispatched(false);
        metrics.record_dispatched(true);
        metrics.record_timeout();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.calls_pushed, 1);
        assert_eq!(snapshot.calls_dispatched, 2);
        assert_eq!(snapshot.dispatch_failures, 1);
        assert_eq!(snapshot.timeouts, 1);
        assert_eq!(snapshot.teardowns, 0);
    }
}

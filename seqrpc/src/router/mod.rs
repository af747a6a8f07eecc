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

//! The call router.
//!
//! A [`Router`] owns one [`Transport`] and four background tasks:
//!
//! - **receive** reads messages, queues inbound calls and matches returns
//! - **transmit** sends pushed calls in push order
//! - **dispatch** executes inbound calls one at a time and replies
//! - **sweep** times out stale outbound calls and evicts unclaimed void returns
//!
//! Callers push calls and later collect results by sequence number, either
//! by polling with [`Router::get_return`] or by waiting with
//! [`Router::get_return_blocking`].
//!
//! A fatal transport error tears the router down once: every task stops, the
//! transport is shut down, blocked waiters are released, and the failure
//! callback runs if the error came from the receive side.
//!
//! # Examples
//!
//! ```rust
//! use seqrpc::codec::Value;
//! use seqrpc::router::{Router, RouterConfig, TargetObject};
//! use seqrpc::transport::MemoryTransport;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let router = Router::new(Arc::new(MemoryTransport::loopback()), RouterConfig::default());
//! router.register_target_object(
//!     "svc",
//!     TargetObject::new().rpc_method("echo", |mut args: Vec<Value>| async move {
//!         Ok(args.pop().unwrap_or(Value::Null))
//!     }),
//! );
//! router.start(None);
//!
//! let value = router
//!     .invoke("svc", "echo", vec![Value::Int(42)], Duration::from_secs(1))
//!     .await?;
//! assert_eq!(value, Value::Int(42));
//!
//! router.stop(true).await;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod loops;
mod registry;
mod table;

pub use self::config::RouterConfig;
pub use self::error::{CallError, DispatchError};
pub use self::registry::{Handler, HandlerFuture, Method, TargetObject, TargetRegistry};

use self::table::{CallTable, Taken};
use crate::codec::{SequenceGenerator, Value};
use crate::error::RpcError;
use crate::message::CallMessage;
use crate::observability::RouterMetrics;
use crate::tracker::{CallQueue, CallRecord, CallStatus, WaitOutcome};
use crate::transport::{Transport, TransportError};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Called once when a receive-side transport failure tears the router down.
pub type FailureCallback = Arc<dyn Fn(&TransportError) + Send + Sync>;

/// State shared between the router handle and its tasks.
pub(crate) struct Shared {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) config: RouterConfig,
    pub(crate) call_timeout: Mutex<Duration>,
    pub(crate) registry: TargetRegistry,
    pub(crate) out_wait: CallTable,
    pub(crate) in_wait: CallTable,
    pub(crate) outbound: CallQueue<Arc<CallRecord>>,
    pub(crate) inbound: CallQueue<Arc<CallRecord>>,
    pub(crate) sequences: Arc<SequenceGenerator>,
    pub(crate) killed: AtomicBool,
    pub(crate) lifecycle: Mutex<CancellationToken>,
    pub(crate) failure_callback: Mutex<Option<FailureCallback>>,
    pub(crate) metrics: RouterMetrics,
}

impl Shared {
    pub(crate) fn call_timeout(&self) -> Duration {
        *self.call_timeout.lock()
    }

    /// Releases every caller blocked on an outbound record.
    fn interrupt_waiters(&self) {
        for record in self.out_wait.snapshot() {
            record.interrupt();
        }
    }

    /// Stops the router after a fatal transport error.
    ///
    /// Returns `true` for the one call that actually performed the teardown.
    pub(crate) async fn teardown(&self, cause: &TransportError) -> bool {
        if self.killed.swap(true, Ordering::SeqCst) {
            return false;
        }
        error!(
            transport_id = %self.transport.metadata().id,
            error = %cause,
            "fatal transport error, tearing down router"
        );
        self.lifecycle.lock().cancel();
        self.interrupt_waiters();
        self.transport.shutdown().await;
        self.metrics.record_teardown();
        true
    }

    pub(crate) fn notify_failure(&self, cause: &TransportError) {
        let callback = self.failure_callback.lock().clone();
        if let Some(callback) = callback {
            callback(cause);
        }
    }
}

/// Moves calls between this process and one peer.
///
/// See the [module documentation](self) for an overview.
pub struct Router {
    shared: Arc<Shared>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Router {
    /// Creates a stopped router with its own sequence generator.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, config: RouterConfig) -> Self {
        Self::with_sequence_generator(transport, config, Arc::new(SequenceGenerator::new()))
    }

    /// Creates a stopped router that numbers its calls from `sequences`.
    ///
    /// Routers sharing a generator never reuse each other's sequence numbers.
    #[must_use]
    pub fn with_sequence_generator(
        transport: Arc<dyn Transport>,
        config: RouterConfig,
        sequences: Arc<SequenceGenerator>,
    ) -> Self {
        let lifecycle = CancellationToken::new();
        lifecycle.cancel();
        Self {
            shared: Arc::new(Shared {
                transport,
                call_timeout: Mutex::new(config.call_timeout),
                config,
                registry: TargetRegistry::new(),
                out_wait: CallTable::new(),
                in_wait: CallTable::new(),
                outbound: CallQueue::new(),
                inbound: CallQueue::new(),
                sequences,
                killed: AtomicBool::new(true),
                lifecycle: Mutex::new(lifecycle),
                failure_callback: Mutex::new(None),
                metrics: RouterMetrics::new(),
            }),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Installs the callback run when a receive failure tears the router down.
    #[must_use]
    pub fn with_failure_callback<F>(self, callback: F) -> Self
    where
        F: Fn(&TransportError) + Send + Sync + 'static,
    {
        *self.shared.failure_callback.lock() = Some(Arc::new(callback));
        self
    }

    /// Serves `target` under `name`, returning the target it replaces.
    pub fn register_target_object(
        &self,
        name: impl Into<String>,
        target: TargetObject,
    ) -> Option<Arc<TargetObject>> {
        let name = name.into();
        debug!(target_name = %name, "registering target object");
        self.shared.registry.register(name, target)
    }

    /// Stops serving the target registered under `name`.
    pub fn unregister_target_object(&self, name: &str) -> Option<Arc<TargetObject>> {
        debug!(target_name = %name, "unregistering target object");
        self.shared.registry.unregister(name)
    }

    /// Builds a call numbered from this router's generator and pushes it.
    ///
    /// Returns the call's sequence number.
    pub fn call(
        &self,
        target: impl Into<String>,
        method: impl Into<String>,
        args: Vec<Value>,
    ) -> u64 {
        self.push(CallMessage::new(&self.shared.sequences, target, method, args))
    }

    /// Tracks `call` and queues it for transmission.
    ///
    /// The call is registered for return matching before it is queued, so a
    /// return can never arrive ahead of its registration. Returns the call's
    /// sequence number.
    pub fn push(&self, call: CallMessage) -> u64 {
        let sequence = call.sequence();
        let record = Arc::new(CallRecord::new(call));
        self.shared.out_wait.insert(record.clone());
        self.shared.outbound.offer(record);
        self.shared.metrics.record_pushed();
        debug!(sequence, "call pushed");
        sequence
    }

    /// Collects the result of call `sequence` without waiting.
    ///
    /// A collected result is forgotten, so asking again yields
    /// [`CallError::UnknownCall`]. A call still in flight stays tracked.
    ///
    /// # Errors
    ///
    /// - [`CallError::NotAvailable`] if the call has not completed
    /// - [`CallError::UnknownCall`] if the call is not tracked
    /// - [`CallError::Timeout`] if the call timed out
    /// - [`CallError::Remote`] if the peer answered with an error
    pub fn get_return(&self, sequence: u64) -> Result<Value, CallError> {
        let record = match self.shared.out_wait.take_terminal(sequence) {
            Taken::Record(record) => record,
            Taken::Pending => return Err(CallError::NotAvailable { sequence }),
            Taken::Missing => return Err(CallError::UnknownCall { sequence }),
        };
        match (record.status(), record.value()) {
            (CallStatus::TimedOut, _) => Err(CallError::Timeout { sequence }),
            (_, Some(Value::RemoteError(error))) => Err(CallError::Remote { sequence, error }),
            (_, Some(value)) => Ok(value),
            (_, None) => Err(CallError::NotAvailable { sequence }),
        }
    }

    /// Waits for call `sequence` to complete, then collects it.
    ///
    /// With `timeout` set, gives up after that long and reports
    /// [`CallError::NotAvailable`]. Returns `Ok(None)` if the router stops,
    /// or is not running, while the call is incomplete.
    ///
    /// # Errors
    ///
    /// As for [`get_return`](Self::get_return).
    pub async fn get_return_blocking(
        &self,
        sequence: u64,
        timeout: Option<Duration>,
    ) -> Result<Option<Value>, CallError> {
        let record = self
            .shared
            .out_wait
            .get(sequence)
            .ok_or(CallError::UnknownCall { sequence })?;
        let lifecycle = self.shared.lifecycle.lock().clone();

        let outcome = tokio::select! {
            biased;
            outcome = record.wait(timeout) => outcome,
            _ = lifecycle.cancelled() => {
                if record.status().is_terminal() {
                    WaitOutcome::Terminal
                } else {
                    WaitOutcome::Interrupted
                }
            }
        };
        match outcome {
            WaitOutcome::Interrupted => {
                debug!(sequence, "wait for return interrupted");
                Ok(None)
            }
            WaitOutcome::Terminal | WaitOutcome::Elapsed => self.get_return(sequence).map(Some),
        }
    }

    /// Calls `method` on the peer's `target` and waits up to `timeout` for
    /// the result.
    ///
    /// If `timeout` runs out first the call is abandoned and forgotten.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Call`] for any [`CallError`], including
    /// [`CallError::Interrupted`] if the router stops while waiting.
    pub async fn invoke(
        &self,
        target: impl Into<String>,
        method: impl Into<String>,
        args: Vec<Value>,
        timeout: Duration,
    ) -> Result<Value, RpcError> {
        let sequence = self.call(target, method, args);
        match self.get_return_blocking(sequence, Some(timeout)).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(CallError::Interrupted { sequence }.into()),
            Err(CallError::NotAvailable { sequence }) => {
                self.shared.out_wait.remove(sequence);
                Err(CallError::Timeout { sequence }.into())
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Starts the four router tasks.
    ///
    /// `call_timeout` replaces the configured call timeout; `None` or zero
    /// keeps [`RouterConfig::call_timeout`]. Outbound calls preserved by an
    /// earlier [`stop`](Self::stop) have their age reset. Does nothing if
    /// the router is already running.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start(&self, call_timeout: Option<Duration>) {
        let mut tasks = self.tasks.lock();
        if self.alive(&tasks) {
            debug!("router already running");
            return;
        }
        self.shared.lifecycle.lock().cancel();
        for task in tasks.drain(..) {
            task.abort();
        }

        let timeout = call_timeout
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or(self.shared.config.call_timeout);
        *self.shared.call_timeout.lock() = timeout;
        for record in self.shared.out_wait.snapshot() {
            record.reset_age();
        }

        let cancel = CancellationToken::new();
        *self.shared.lifecycle.lock() = cancel.clone();
        self.shared.killed.store(false, Ordering::SeqCst);

        tasks.push(tokio::spawn(loops::receive(self.shared.clone(), cancel.clone())));
        tasks.push(tokio::spawn(loops::transmit(self.shared.clone(), cancel.clone())));
        tasks.push(tokio::spawn(loops::dispatch(self.shared.clone(), cancel.clone())));
        tasks.push(tokio::spawn(loops::sweep(self.shared.clone(), cancel)));

        info!(
            transport_id = %self.shared.transport.metadata().id,
            call_timeout = ?timeout,
            preserved_calls = self.shared.out_wait.len(),
            "router started"
        );
    }

    /// Stops the router tasks and waits for them to finish.
    ///
    /// Callers blocked in [`get_return_blocking`](Self::get_return_blocking)
    /// are released. With `flush` set, every queued and tracked call is
    /// discarded; otherwise calls survive until the next
    /// [`start`](Self::start). The transport is left open.
    pub async fn stop(&self, flush: bool) {
        let tasks = std::mem::take(&mut *self.tasks.lock());
        let was_running = !self.shared.killed.swap(true, Ordering::SeqCst);
        self.shared.lifecycle.lock().cancel();

        for task in tasks {
            if let Err(error) = task.await {
                if error.is_panic() {
                    warn!(%error, "router task panicked");
                }
            }
        }
        self.shared.interrupt_waiters();

        if flush {
            self.shared.outbound.clear();
            self.shared.inbound.clear();
            self.shared.out_wait.clear();
            self.shared.in_wait.clear();
        }
        if was_running {
            info!(flush, "router stopped");
        }
    }

    /// Returns `true` while the router runs and all four tasks are alive.
    pub fn is_alive(&self) -> bool {
        self.alive(&self.tasks.lock())
    }

    fn alive(&self, tasks: &[JoinHandle<()>]) -> bool {
        !self.shared.killed.load(Ordering::SeqCst)
            && tasks.len() == 4
            && tasks.iter().all(|task| !task.is_finished())
    }

    /// Returns `true` if call `sequence` is tracked and not yet collected.
    pub fn has_call(&self, sequence: u64) -> bool {
        self.shared.out_wait.contains(sequence)
    }

    /// Calls waiting for transmission.
    pub fn outbound_queue_len(&self) -> usize {
        self.shared.outbound.len()
    }

    /// Outbound calls tracked for return matching.
    pub fn outbound_waiting(&self) -> usize {
        self.shared.out_wait.len()
    }

    /// Inbound calls received but not yet answered.
    pub fn inbound_waiting(&self) -> usize {
        self.shared.in_wait.len()
    }

    /// The call timeout in effect.
    pub fn call_timeout(&self) -> Duration {
        self.shared.call_timeout()
    }

    /// Router counters.
    pub fn metrics(&self) -> &RouterMetrics {
        &self.shared.metrics
    }

    /// The configuration the router was created with.
    pub fn config(&self) -> &RouterConfig {
        &self.shared.config
    }

    /// The transport the router drives.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.shared.transport
    }

    /// The generator numbering this router's calls.
    pub fn sequences(&self) -> &Arc<SequenceGenerator> {
        &self.shared.sequences
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("transport", self.shared.transport.metadata())
            .field("config", &self.shared.config)
            .field("alive", &self.is_alive())
            .field("outbound_waiting", &self.outbound_waiting())
            .field("inbound_waiting", &self.inbound_waiting())
            .finish_non_exhaustive()
    }
}

impl Drop for Router {
    fn drop(&mut self) {
        self.shared.killed.store(true, Ordering::SeqCst);
        self.shared.lifecycle.lock().cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    fn router() -> Router {
        Router::new(Arc::new(MemoryTransport::loopback()), RouterConfig::default())
    }

    #[tokio::test]
    async fn test_push_registers_before_transmission() {
        let router = router();
        let sequence = router.call("svc", "echo", vec![Value::Int(1)]);

        assert!(router.has_call(sequence));
        assert_eq!(router.outbound_queue_len(), 1);
        assert_eq!(router.outbound_waiting(), 1);
        assert_eq!(
            router.get_return(sequence),
            Err(CallError::NotAvailable { sequence })
        );
        assert!(router.has_call(sequence));
        assert_eq!(router.metrics().snapshot().calls_pushed, 1);
    }

    #[tokio::test]
    async fn test_unknown_sequence() {
        let router = router();
        assert_eq!(router.get_return(99), Err(CallError::UnknownCall { sequence: 99 }));
        assert_eq!(
            router.get_return_blocking(99, None).await,
            Err(CallError::UnknownCall { sequence: 99 })
        );
    }

    #[tokio::test]
    async fn test_blocking_wait_on_stopped_router_returns_none() {
        let router = router();
        let sequence = router.call("svc", "echo", vec![]);
        assert_eq!(router.get_return_blocking(sequence, None).await, Ok(None));
        assert!(router.has_call(sequence));
    }

    #[tokio::test]
    async fn test_start_and_stop_are_idempotent() {
        let router = router();
        assert!(!router.is_alive());

        router.start(None);
        router.start(Some(Duration::from_secs(60)));
        assert!(router.is_alive());
        assert_eq!(router.call_timeout(), Duration::from_secs(5));

        router.stop(false).await;
        router.stop(false).await;
        assert!(!router.is_alive());

        router.start(Some(Duration::from_secs(60)));
        assert_eq!(router.call_timeout(), Duration::from_secs(60));
        router.stop(false).await;

        router.start(Some(Duration::ZERO));
        assert_eq!(router.call_timeout(), Duration::from_secs(5));
        router.stop(true).await;
    }

    #[tokio::test]
    async fn test_shared_sequence_generator() {
        let sequences = Arc::new(SequenceGenerator::new());
        let a = Router::with_sequence_generator(
            Arc::new(MemoryTransport::loopback()),
            RouterConfig::default(),
            sequences.clone(),
        );
        let b = Router::with_sequence_generator(
            Arc::new(MemoryTransport::loopback()),
            RouterConfig::default(),
            sequences,
        );
        let first = a.call("svc", "m", vec![]);
        let second = b.call("svc", "m", vec![]);
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_stop_flush_discards_everything() {
        let router = router();
        let sequence = router.call("svc", "echo", vec![]);
        router.stop(true).await;
        assert_eq!(router.outbound_queue_len(), 0);
        assert_eq!(router.get_return(sequence), Err(CallError::UnknownCall { sequence }));
    }

    #[test]
    fn test_debug_output() {
        let router = router();
        let debug = format!("{:?}", router);
        assert!(debug.contains("Router"));
        assert!(debug.contains("alive: false"));
    }
}

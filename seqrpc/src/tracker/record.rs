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

//! Per-call progress tracking.

use crate::codec::Value;
use crate::message::CallMessage;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Where a call is in its lifecycle.
///
/// ```text
/// Unprocessed --> Pending --> Returned
///                        \--> TimedOut
/// ```
///
/// `Returned` and `TimedOut` are terminal: once reached, the status never
/// changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallStatus {
    /// Created but not yet picked up by a loop.
    Unprocessed,
    /// Being transmitted, awaiting a return, or executing.
    Pending,
    /// A result is available.
    Returned,
    /// No result arrived within the call timeout.
    TimedOut,
}

impl CallStatus {
    /// Returns `true` for `Returned` and `TimedOut`.
    pub fn is_terminal(self) -> bool {
        matches!(self, CallStatus::Returned | CallStatus::TimedOut)
    }
}

/// How a [`CallRecord::wait`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The record reached a terminal status.
    Terminal,
    /// The wait bound elapsed first.
    Elapsed,
    /// The wait was interrupted, for example by the router stopping.
    Interrupted,
}

#[derive(Debug)]
struct RecordState {
    status: CallStatus,
    value: Option<Value>,
    entered_at: Instant,
    interrupts: u64,
}

/// Status and result holder for one call.
///
/// A record owns its [`CallMessage`] and is shared between the router's
/// loops and any caller waiting on it. Status changes happen under the
/// record's own lock; terminal transitions and interrupts wake every task
/// blocked in [`wait`](Self::wait).
///
/// # Examples
///
/// ```rust
/// use seqrpc::codec::Value;
/// use seqrpc::message::CallMessage;
/// use seqrpc::tracker::{CallRecord, CallStatus};
///
/// let record = CallRecord::new(CallMessage::from_parts(1, 0, "svc", "echo", vec![]));
/// assert_eq!(record.status(), CallStatus::Unprocessed);
///
/// assert!(record.set_pending());
/// assert!(record.set_returned(Value::Int(42)));
/// assert_eq!(record.status(), CallStatus::Returned);
/// assert_eq!(record.value(), Some(Value::Int(42)));
///
/// // terminal states stick
/// assert!(!record.set_timed_out());
/// ```
#[derive(Debug)]
pub struct CallRecord {
    call: CallMessage,
    state: Mutex<RecordState>,
    changed: Notify,
}

impl CallRecord {
    /// Creates an `Unprocessed` record whose age starts now.
    #[must_use]
    pub fn new(call: CallMessage) -> Self {
        Self {
            call,
            state: Mutex::new(RecordState {
                status: CallStatus::Unprocessed,
                value: None,
                entered_at: Instant::now(),
                interrupts: 0,
            }),
            changed: Notify::new(),
        }
    }

    /// The tracked call.
    pub fn call(&self) -> &CallMessage {
        &self.call
    }

    /// Sequence number of the tracked call.
    pub fn sequence(&self) -> u64 {
        self.call.sequence()
    }

    /// Current status.
    pub fn status(&self) -> CallStatus {
        self.state.lock().status
    }

    /// The returned value, once there is one.
    pub fn value(&self) -> Option<Value> {
        self.state.lock().value.clone()
    }

    /// Returns `true` if the record returned the void sentinel.
    pub fn is_void_return(&self) -> bool {
        let state = self.state.lock();
        state.status == CallStatus::Returned && state.value.as_ref().is_some_and(Value::is_void)
    }

    /// Marks the call as being actively processed.
    ///
    /// Returns `false` if the record is already terminal.
    pub fn set_pending(&self) -> bool {
        let mut state = self.state.lock();
        if state.status.is_terminal() {
            return false;
        }
        state.status = CallStatus::Pending;
        true
    }

    /// Stores the result and wakes waiters.
    ///
    /// Returns `false`, leaving the record untouched, if it is already terminal.
    pub fn set_returned(&self, value: Value) -> bool {
        {
            let mut state = self.state.lock();
            if state.status.is_terminal() {
                return false;
            }
            state.status = CallStatus::Returned;
            state.value = Some(value);
        }
        self.changed.notify_waiters();
        true
    }

    /// Marks the call timed out and wakes waiters.
    ///
    /// Returns `false` if the record is already terminal.
    pub fn set_timed_out(&self) -> bool {
        {
            let mut state = self.state.lock();
            if state.status.is_terminal() {
                return false;
            }
            state.status = CallStatus::TimedOut;
        }
        self.changed.notify_waiters();
        true
    }

    /// Time since the record entered its table (or was last reset).
    pub fn age(&self) -> Duration {
        self.state.lock().entered_at.elapsed()
    }

    /// Restarts the age clock.
    pub fn reset_age(&self) {
        self.state.lock().entered_at = Instant::now();
    }

    /// Wakes every current waiter with [`WaitOutcome::Interrupted`].
    ///
    /// The status is left unchanged; later waits behave normally.
    pub fn interrupt(&self) {
        self.state.lock().interrupts += 1;
        self.changed.notify_waiters();
    }

    /// Waits until the record is terminal, `timeout` elapses, or the wait
    /// is interrupted. Returns immediately if already terminal.
    pub async fn wait(&self, timeout: Option<Duration>) -> WaitOutcome {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        let epoch = self.state.lock().interrupts;

        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(outcome) = self.check(epoch) {
                return outcome;
            }

            match deadline {
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        return self.check(epoch).unwrap_or(WaitOutcome::Elapsed);
                    }
                }
                None => notified.await,
            }
        }
    }

    fn check(&self, epoch: u64) -> Option<WaitOutcome> {
        let state = self.state.lock();
        if state.status.is_terminal() {
            Some(WaitOutcome::Terminal)
        } else if state.interrupts != epoch {
            Some(WaitOutcome::Interrupted)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record() -> CallRecord {
        CallRecord::new(CallMessage::from_parts(1, 0, "svc", "m", vec![]))
    }

    #[test]
    fn test_lifecycle() {
        let record = record();
        assert_eq!(record.status(), CallStatus::Unprocessed);
        assert!(record.set_pending());
        assert_eq!(record.status(), CallStatus::Pending);
        assert!(record.set_timed_out());
        assert_eq!(record.status(), CallStatus::TimedOut);
        assert!(!record.set_returned(Value::Int(1)));
        assert!(!record.set_pending());
        assert_eq!(record.value(), None);
    }

    #[test]
    fn test_void_return() {
        let record = record();
        assert!(!record.is_void_return());
        record.set_returned(Value::void());
        assert!(record.is_void_return());
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_terminal() {
        let record = record();
        record.set_returned(Value::Null);
        assert_eq!(record.wait(None).await, WaitOutcome::Terminal);
    }

    #[tokio::test]
    async fn test_wait_wakes_on_return() {
        let record = Arc::new(record());
        let waiter = {
            let record = record.clone();
            tokio::spawn(async move { record.wait(None).await })
        };
        tokio::task::yield_now().await;
        record.set_returned(Value::Int(42));
        assert_eq!(waiter.await.unwrap(), WaitOutcome::Terminal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_bound_elapses() {
        let record = record();
        let outcome = record.wait(Some(Duration::from_millis(50))).await;
        assert_eq!(outcome, WaitOutcome::Elapsed);
    }

    #[tokio::test]
    async fn test_interrupt_wakes_waiter_without_changing_status() {
        let record = Arc::new(record());
        let waiter = {
            let record = record.clone();
            tokio::spawn(async move { record.wait(None).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        record.interrupt();
        assert_eq!(waiter.await.unwrap(), WaitOutcome::Interrupted);
        assert_eq!(record.status(), CallStatus::Unprocessed);

        // an earlier interrupt does not affect a fresh wait
        let outcome = record.wait(Some(Duration::from_millis(10))).await;
        assert_eq!(outcome, WaitOutcome::Elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_age_and_reset() {
        let record = record();
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(record.age() >= Duration::from_secs(3));
        record.reset_age();
        assert!(record.age() < Duration::from_secs(1));
    }
}

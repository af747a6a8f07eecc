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

//! The reconnection strategy trait and its bookkeeping.

use crate::transport::TransportError;
use async_trait::async_trait;
use std::time::Duration;

/// Decides whether and when a failed connection is retried.
///
/// `attempt` counts the connection attempts that have failed so far in the
/// current recovery, starting at 1.
#[async_trait]
pub trait ReconnectionStrategy: Send + Sync + std::fmt::Debug {
    /// Whether another attempt should be made after `attempt` failures.
    async fn should_reconnect(&self, attempt: u32, last_error: &TransportError) -> bool;

    /// How long to wait before the next attempt, after `attempt` failures.
    async fn next_delay(&self, attempt: u32) -> Duration;

    /// Called once a connection has been established.
    fn on_connected(&self);

    /// Called after each failed attempt.
    fn on_disconnected(&self, error: &TransportError);

    /// Clears accumulated state.
    fn reset(&self);

    /// Strategy name, for logs.
    fn name(&self) -> &str;
}

/// Counters kept by a strategy across recoveries.
#[derive(Debug, Clone, Default)]
pub struct ReconnectionMetrics {
    /// Attempts made
    pub total_attempts: u64,
    /// Attempts that connected
    pub successful_reconnections: u64,
    /// Attempts that failed
    pub failed_reconnections: u64,
    /// Failures since the last success
    pub consecutive_failures: u32,
    /// Text of the most recent failure
    pub last_error: Option<String>,
}

impl ReconnectionMetrics {
    /// Creates zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful connection.
    pub fn record_success(&mut self) {
        self.total_attempts += 1;
        self.successful_reconnections += 1;
        self.consecutive_failures = 0;
        self.last_error = None;
    }

    /// Records a failed attempt.
    pub fn record_failure(&mut self, error: &TransportError) {
        self.total_attempts += 1;
        self.failed_reconnections += 1;
        self.consecutive_failures += 1;
        self.last_error = Some(error.to_string());
    }

    /// Zeroes every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

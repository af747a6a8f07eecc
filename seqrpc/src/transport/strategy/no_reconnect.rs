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

//! A strategy that never retries.

use super::traits::{ReconnectionMetrics, ReconnectionStrategy};
use crate::transport::TransportError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

/// Gives up after the first failed attempt.
///
/// Useful for tests and for deployments where an outside supervisor
/// restarts failed connections.
///
/// # Examples
///
/// ```
/// use seqrpc::transport::strategy::NoReconnect;
///
/// let strategy = NoReconnect::new();
/// ```
#[derive(Debug, Default)]
pub struct NoReconnect {
    metrics: Mutex<ReconnectionMetrics>,
}

impl NoReconnect {
    /// Creates the strategy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the strategy's counters.
    pub fn metrics(&self) -> ReconnectionMetrics {
        self.metrics.lock().clone()
    }
}

#[async_trait]
impl ReconnectionStrategy for NoReconnect {
    async fn should_reconnect(&self, _attempt: u32, _last_error: &TransportError) -> bool {
        false
    }

    async fn next_delay(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }

    fn on_connected(&self) {
        self.metrics.lock().record_success();
    }

    fn on_disconnected(&self, error: &TransportError) {
        self.metrics.lock().record_failure(error);
    }

    fn reset(&self) {
        self.metrics.lock().reset();
    }

    fn name(&self) -> &str {
        "NoReconnect"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_never_reconnects() {
        let strategy = NoReconnect::new();
        let error = TransportError::connection_failed("127.0.0.1:1");
        assert!(!strategy.should_reconnect(0, &error).await);
        assert_eq!(strategy.next_delay(1).await, Duration::ZERO);
    }

    #[test]
    fn test_records_failures() {
        let strategy = NoReconnect::new();
        strategy.on_disconnected(&TransportError::connection_failed("x"));
        assert_eq!(strategy.metrics().consecutive_failures, 1);
        assert_eq!(strategy.name(), "NoReconnect");
    }
}

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

//! Exponential backoff.

use super::traits::{ReconnectionMetrics, ReconnectionStrategy};
use crate::transport::TransportError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

/// Retries with geometrically growing delays.
///
/// After the `n`th failure the delay is `initial_delay * multiplier^(n-1)`,
/// capped at `max_delay`. With jitter enabled the delay is drawn uniformly
/// from zero up to that value instead.
///
/// The default matches the legacy connector: four attempts, waiting 1 s, 2 s
/// and 4 s between them, without jitter.
///
/// # Examples
///
/// ```
/// use seqrpc::transport::strategy::ExponentialBackoff;
/// use std::time::Duration;
///
/// let strategy = ExponentialBackoff::builder()
///     .initial_delay(Duration::from_millis(50))
///     .max_attempts(Some(10))
///     .build();
/// assert_eq!(strategy.max_attempts(), Some(10));
/// ```
#[derive(Debug)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter: bool,
    max_attempts: Option<u32>,
    metrics: Mutex<ReconnectionMetrics>,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        ExponentialBackoffBuilder::default().build()
    }
}

impl ExponentialBackoff {
    /// Creates a builder starting from the defaults.
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// Snapshot of the strategy's counters.
    pub fn metrics(&self) -> ReconnectionMetrics {
        self.metrics.lock().clone()
    }

    /// The attempt limit, if any.
    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let base = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = if base.is_finite() && base < self.max_delay.as_secs_f64() {
            Duration::from_secs_f64(base.max(0.0))
        } else {
            self.max_delay
        };

        if self.jitter {
            capped.mul_f64(rand::random::<f64>())
        } else {
            capped
        }
    }
}

#[async_trait]
impl ReconnectionStrategy for ExponentialBackoff {
    async fn should_reconnect(&self, attempt: u32, last_error: &TransportError) -> bool {
        if !last_error.is_recoverable() {
            return false;
        }
        self.max_attempts.map_or(true, |max| attempt < max)
    }

    async fn next_delay(&self, attempt: u32) -> Duration {
        self.calculate_delay(attempt)
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
        "ExponentialBackoff"
    }
}

/// Builder for [`ExponentialBackoff`].
#[derive(Debug, Clone)]
pub struct ExponentialBackoffBuilder {
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter: bool,
    max_attempts: Option<u32>,
}

impl Default for ExponentialBackoffBuilder {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
            jitter: false,
            max_attempts: Some(4),
        }
    }
}

impl ExponentialBackoffBuilder {
    /// Delay after the first failure.
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Upper bound on any single delay.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Growth factor between consecutive delays.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Randomize each delay between zero and its computed value.
    pub fn jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Total attempts before giving up (`None` retries forever).
    pub fn max_attempts(mut self, max: Option<u32>) -> Self {
        self.max_attempts = max;
        self
    }

    /// Builds the strategy.
    pub fn build(self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_delay: self.initial_delay,
            max_delay: self.max_delay,
            multiplier: self.multiplier,
            jitter: self.jitter,
            max_attempts: self.max_attempts,
            metrics: Mutex::new(ReconnectionMetrics::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_legacy_schedule() {
        let strategy = ExponentialBackoff::default();
        assert_eq!(strategy.initial_delay, Duration::from_secs(1));
        assert_eq!(strategy.multiplier, 2.0);
        assert!(!strategy.jitter);
        assert_eq!(strategy.max_attempts, Some(4));
    }

    #[tokio::test]
    async fn test_delays_double() {
        let strategy = ExponentialBackoff::default();
        assert_eq!(strategy.next_delay(1).await, Duration::from_secs(1));
        assert_eq!(strategy.next_delay(2).await, Duration::from_secs(2));
        assert_eq!(strategy.next_delay(3).await, Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_delay_capped() {
        let strategy = ExponentialBackoff::builder()
            .initial_delay(Duration::from_millis(100))
            .max_delay(Duration::from_millis(250))
            .build();
        assert_eq!(strategy.next_delay(10).await, Duration::from_millis(250));
        assert_eq!(strategy.next_delay(u32::MAX).await, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_jitter_stays_within_bound() {
        let strategy = ExponentialBackoff::builder()
            .initial_delay(Duration::from_millis(100))
            .jitter(true)
            .build();
        for _ in 0..50 {
            assert!(strategy.next_delay(2).await <= Duration::from_millis(200));
        }
    }

    #[tokio::test]
    async fn test_attempt_limit() {
        let strategy = ExponentialBackoff::default();
        let error = TransportError::connection_failed("127.0.0.1:1");
        assert!(strategy.should_reconnect(3, &error).await);
        assert!(!strategy.should_reconnect(4, &error).await);

        let unlimited = ExponentialBackoff::builder().max_attempts(None).build();
        assert!(unlimited.should_reconnect(1_000, &error).await);
    }

    #[tokio::test]
    async fn test_invalid_configuration_never_retried() {
        let strategy = ExponentialBackoff::default();
        let error = TransportError::invalid_configuration("no address");
        assert!(!strategy.should_reconnect(1, &error).await);
    }

    #[tokio::test]
    async fn test_unrecoverable_errors_never_retried() {
        let strategy = ExponentialBackoff::default();
        let bind = TransportError::BindFailed {
            address: "127.0.0.1:1".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        };
        assert!(!strategy.should_reconnect(1, &bind).await);
        assert!(!strategy.should_reconnect(1, &TransportError::Closed).await);

        let reset = TransportError::Io {
            source: std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
        };
        assert!(strategy.should_reconnect(1, &reset).await);
    }

    #[test]
    fn test_metrics_tracking() {
        let strategy = ExponentialBackoff::default();
        strategy.on_disconnected(&TransportError::connection_failed("x"));
        strategy.on_connected();
        let metrics = strategy.metrics();
        assert_eq!(metrics.failed_reconnections, 1);
        assert_eq!(metrics.successful_reconnections, 1);
        strategy.reset();
        assert_eq!(strategy.metrics().total_attempts, 0);
        assert_eq!(strategy.name(), "ExponentialBackoff");
    }
}

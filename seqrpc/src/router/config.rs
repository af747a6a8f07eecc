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

//! Router configuration.

use std::time::Duration;

/// Timing knobs for a [`Router`](crate::router::Router).
///
/// # Examples
///
/// ```rust
/// use seqrpc::router::RouterConfig;
/// use std::time::Duration;
///
/// let config = RouterConfig {
///     call_timeout: Duration::from_secs(1),
///     ..Default::default()
/// };
/// assert_eq!(config.void_retention(), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// How long an outbound call may wait for its return before it times out.
    ///
    /// Default: 5 seconds
    pub call_timeout: Duration,

    /// Period of the timeout sweep.
    ///
    /// Default: 100 milliseconds
    pub sweep_interval: Duration,

    /// Pause before the single retry when a return matches no outbound call.
    ///
    /// Default: 2 milliseconds
    pub return_match_retry: Duration,

    /// Uncollected void returns are evicted after this many call timeouts.
    ///
    /// Default: 2
    pub void_retention_factor: u32,
}

impl RouterConfig {
    /// How long an uncollected void return is kept.
    #[must_use]
    pub fn void_retention(&self) -> Duration {
        self.call_timeout.saturating_mul(self.void_retention_factor)
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(5),
            sweep_interval: Duration::from_millis(100),
            return_match_retry: Duration::from_millis(2),
            void_retention_factor: 2,
        }
    }
}

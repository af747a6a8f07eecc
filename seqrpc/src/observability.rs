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

//! Metrics and structured error logging.
//!
//! Logging goes through [`tracing`] and is always on; install a subscriber
//! (for example `tracing-subscriber`) to see it. Counters are kept in
//! [`RouterMetrics`] and [`TransportMetrics`]. With the `observability`
//! feature enabled they are also forwarded to the [`metrics`] facade under
//! the `seqrpc.` prefix.
//!
//! [`metrics`]: https://docs.rs/metrics

mod metrics;

pub use self::metrics::{RouterMetrics, RouterMetricsSnapshot, TransportMetrics};

use crate::error::RpcError;
use crate::router::CallError;

/// Logs `error` with structured fields at a level chosen by its layer.
///
/// Transport errors log at ERROR, remote failures at INFO, everything else
/// at WARN.
///
/// # Examples
///
/// ```rust
/// use seqrpc::observability::log_error;
/// use seqrpc::router::CallError;
///
/// log_error(&CallError::Timeout { sequence: 7 }.into());
/// ```
pub fn log_error(error: &RpcError) {
    match error {
        RpcError::Transport(e) => {
            tracing::error!(
                error = %e,
                recoverable = error.is_recoverable(),
                should_close_transport = error.should_close_transport(),
                "Transport error occurred"
            );
        }
        RpcError::Call(CallError::Remote { sequence, error: remote }) => {
            tracing::info!(
                sequence,
                class = remote.class(),
                message = remote.message(),
                "Call failed remotely"
            );
        }
        RpcError::Call(e) => {
            tracing::warn!(
                error = %e,
                sequence = e.sequence(),
                recoverable = error.is_recoverable(),
                "Call error occurred"
            );
        }
        RpcError::Encode(e) => {
            tracing::warn!(error = %e, "Encode error occurred");
        }
        RpcError::Decode(e) => {
            tracing::warn!(error = %e, "Decode error occurred");
        }
    }
}

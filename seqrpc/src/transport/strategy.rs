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

//! Reconnection strategies used by [`TcpTransport::recover`](super::TcpTransport).
//!
//! A strategy decides whether another connection attempt should be made after
//! a failure and how long to wait before making it.
//!
//! - [`ExponentialBackoff`]: delays grow geometrically, optionally with jitter
//! - [`NoReconnect`]: gives up immediately
//!
//! # Examples
//!
//! ```rust
//! use seqrpc::transport::strategy::ExponentialBackoff;
//! use std::time::Duration;
//!
//! let strategy = ExponentialBackoff::builder()
//!     .initial_delay(Duration::from_millis(100))
//!     .max_delay(Duration::from_secs(30))
//!     .multiplier(2.0)
//!     .jitter(true)
//!     .max_attempts(Some(10))
//!     .build();
//! ```

mod exponential;
mod no_reconnect;
mod traits;

pub use self::exponential::{ExponentialBackoff, ExponentialBackoffBuilder};
pub use self::no_reconnect::NoReconnect;
pub use self::traits::{ReconnectionMetrics, ReconnectionStrategy};

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

//! Configuration for outgoing TCP connections.

use crate::message::MAX_PAYLOAD_SIZE;
use crate::transport::strategy::{ExponentialBackoff, ReconnectionStrategy};
use std::sync::Arc;

/// How a [`TcpTransport`](super::TcpTransport) connects and reconnects.
///
/// # Examples
///
/// ```rust
/// use seqrpc::transport::TcpTransportConfig;
/// use seqrpc::transport::strategy::NoReconnect;
/// use std::sync::Arc;
///
/// let config = TcpTransportConfig::new("127.0.0.1:9000")
///     .with_reconnection_strategy(Arc::new(NoReconnect::new()))
///     .with_nodelay(false);
///
/// assert_eq!(config.address(), "127.0.0.1:9000");
/// assert!(!config.nodelay());
/// ```
#[derive(Debug, Clone)]
pub struct TcpTransportConfig {
    address: String,
    reconnection_strategy: Arc<dyn ReconnectionStrategy>,
    nodelay: bool,
    max_payload: usize,
}

impl TcpTransportConfig {
    /// Creates a configuration for `address` with the default settings:
    /// exponential backoff over four attempts, `TCP_NODELAY` on and a 16 MiB
    /// payload limit.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            reconnection_strategy: Arc::new(ExponentialBackoff::default()),
            nodelay: true,
            max_payload: MAX_PAYLOAD_SIZE,
        }
    }

    /// Replaces the reconnection strategy.
    pub fn with_reconnection_strategy(mut self, strategy: Arc<dyn ReconnectionStrategy>) -> Self {
        self.reconnection_strategy = strategy;
        self
    }

    /// Sets `TCP_NODELAY` on every connection.
    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }

    /// Sets the largest message body accepted in either direction.
    pub fn with_max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = max_payload;
        self
    }

    /// The address connections are made to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The reconnection strategy.
    pub fn reconnection_strategy(&self) -> &Arc<dyn ReconnectionStrategy> {
        &self.reconnection_strategy
    }

    /// Whether `TCP_NODELAY` is set.
    pub fn nodelay(&self) -> bool {
        self.nodelay
    }

    /// The payload limit.
    pub fn max_payload(&self) -> usize {
        self.max_payload
    }
}

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

//! In-memory transport.
//!
//! Messages are fully encoded to bytes on send and decoded again on receive,
//! so everything above the socket behaves exactly as it would over TCP. Used
//! for tests, benchmarks and wiring two routers together in one process.

use crate::message::Message;
use crate::transport::{Transport, TransportError, TransportMetadata};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Loopback,
    Peer,
}

/// A transport backed by in-process channels.
///
/// # Examples
///
/// ```rust
/// use seqrpc::codec::Value;
/// use seqrpc::message::{Message, ReturnMessage};
/// use seqrpc::transport::{MemoryTransport, Transport};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (a, b) = MemoryTransport::pair();
/// let message = Message::from(ReturnMessage::from_parts(1, 0, Value::Int(7)));
///
/// a.send(&message).await?;
/// assert_eq!(b.recv().await?, message);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryTransport {
    metadata: TransportMetadata,
    link: Link,
    outgoing: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    incoming: tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
    closed: Mutex<CancellationToken>,
}

impl MemoryTransport {
    /// Creates a transport that receives everything it sends.
    ///
    /// A router on a loopback transport calls its own targets, which makes
    /// it the simplest way to exercise a full call path.
    #[must_use]
    pub fn loopback() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self::new(Link::Loopback, tx, rx)
    }

    /// Creates two connected transports.
    ///
    /// Dropping one end makes the other fail with
    /// [`TransportError::ConnectionLost`]. Shutting one end down makes the
    /// other see end of stream once already sent messages are drained.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        (
            Self::new(Link::Peer, a_tx, b_rx),
            Self::new(Link::Peer, b_tx, a_rx),
        )
    }

    fn new(
        link: Link,
        tx: mpsc::UnboundedSender<Vec<u8>>,
        rx: mpsc::UnboundedReceiver<Vec<u8>>,
    ) -> Self {
        Self {
            metadata: TransportMetadata::new("memory"),
            link,
            outgoing: Mutex::new(Some(tx)),
            incoming: tokio::sync::Mutex::new(rx),
            closed: Mutex::new(CancellationToken::new()),
        }
    }

    /// Returns `true` once [`shutdown`](Transport::shutdown) has been called
    /// and the transport has not been recovered since.
    pub fn is_closed(&self) -> bool {
        self.closed.lock().is_cancelled()
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn metadata(&self) -> &TransportMetadata {
        &self.metadata
    }

    async fn send(&self, message: &Message) -> Result<(), TransportError> {
        let tx = self.outgoing.lock().clone().ok_or(TransportError::Closed)?;
        let bytes = message.encode()?;
        tx.send(bytes)
            .map_err(|_| TransportError::connection_lost("peer endpoint dropped"))
    }

    async fn recv(&self) -> Result<Message, TransportError> {
        let closed = self.closed.lock().clone();
        let mut incoming = tokio::select! {
            _ = closed.cancelled() => return Err(TransportError::Closed),
            guard = self.incoming.lock() => guard,
        };
        tokio::select! {
            biased;
            _ = closed.cancelled() => Err(TransportError::Closed),
            bytes = incoming.recv() => match bytes {
                Some(bytes) => Ok(Message::decode(&bytes)?),
                None => Err(TransportError::connection_lost("peer endpoint closed")),
            },
        }
    }

    async fn shutdown(&self) {
        self.closed.lock().cancel();
        if self.outgoing.lock().take().is_some() {
            debug!(transport_id = %self.metadata.id, "memory transport shut down");
        }
    }

    async fn recover(&self) -> bool {
        if !self.is_closed() {
            return self
                .outgoing
                .lock()
                .as_ref()
                .is_some_and(|tx| !tx.is_closed());
        }
        match self.link {
            Link::Loopback => {
                let (tx, rx) = mpsc::unbounded_channel();
                *self.incoming.lock().await = rx;
                *self.outgoing.lock() = Some(tx);
                *self.closed.lock() = CancellationToken::new();
                debug!(transport_id = %self.metadata.id, "loopback transport recovered");
                true
            }
            // the other end has no way to learn about a new channel
            Link::Peer => false,
        }
    }
}

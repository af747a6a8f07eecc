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

//! The contract between the router and the byte stream it talks over.

use crate::message::Message;
use crate::transport::{TransportError, TransportMetadata};
use async_trait::async_trait;

/// A duplex channel carrying whole messages.
///
/// Transports own framing, connection lifecycle and reconnection; the router
/// only ever sees complete [`Message`]s. All methods take `&self` because the
/// router's receive loop sits in [`recv`](Self::recv) while its transmit and
/// dispatch loops call [`send`](Self::send) concurrently; implementations
/// keep their read and write halves behind separate locks.
///
/// # Errors
///
/// An error for which [`TransportError::is_protocol_error`] is `true` means a
/// single message was lost and the channel is still usable. Any other error
/// means the connection is gone.
///
/// # Cancellation
///
/// `recv` must be cancel safe: if its future is dropped before completing,
/// no part of any message may be lost.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Describes this transport.
    fn metadata(&self) -> &TransportMetadata;

    /// Writes one complete message.
    async fn send(&self, message: &Message) -> Result<(), TransportError>;

    /// Waits for the next complete message.
    async fn recv(&self) -> Result<Message, TransportError>;

    /// Releases the connection. Idempotent; pending and later `recv`/`send`
    /// calls fail with [`TransportError::Closed`].
    async fn shutdown(&self);

    /// Tries to make the transport usable again after a failure or shutdown.
    ///
    /// Returns whether it succeeded. Retry and backoff policy are up to the
    /// implementation.
    async fn recover(&self) -> bool;
}

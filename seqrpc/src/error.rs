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

//! Crate-level error type.
//!
//! Errors come from three layers, each handled differently:
//!
//! 1. **Transport** ([`TransportError`]): the connection failed; a router
//!    that sees one tears itself down
//! 2. **Call** ([`CallError`]): a particular call has no usable result
//! 3. **Codec** ([`EncodeError`], [`DecodeError`]): a value or message could
//!    not be translated
//!
//! [`RpcError`] wraps all of them for callers that want a single type.
//!
//! # Examples
//!
//! ```rust
//! use seqrpc::RpcError;
//! use seqrpc::router::CallError;
//! use seqrpc::transport::TransportError;
//!
//! let error: RpcError = TransportError::Closed.into();
//! assert!(error.is_transport());
//!
//! let error: RpcError = CallError::Timeout { sequence: 3 }.into();
//! assert!(error.is_timeout());
//! ```

use crate::codec::{DecodeError, EncodeError, RemoteError};
use crate::router::CallError;
use crate::transport::TransportError;
use std::error::Error as StdError;
use std::fmt;

/// Any error produced by this crate.
#[derive(Debug)]
pub enum RpcError {
    /// The transport failed.
    ///
    /// ```rust
    /// use seqrpc::RpcError;
    /// use seqrpc::transport::TransportError;
    ///
    /// let error = RpcError::Transport(TransportError::Closed);
    /// assert!(error.should_close_transport());
    /// ```
    Transport(TransportError),

    /// A call produced no usable result.
    Call(CallError),

    /// A value could not be encoded.
    Encode(EncodeError),

    /// Bytes could not be decoded.
    Decode(DecodeError),
}

impl RpcError {
    /// Returns `true` if this is a transport error.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns `true` if this is a call error.
    #[must_use]
    pub const fn is_call(&self) -> bool {
        matches!(self, Self::Call(_))
    }

    /// Returns `true` if a call timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Call(CallError::Timeout { .. }))
    }

    /// Returns `true` if the peer answered with an error.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Call(CallError::Remote { .. }))
    }

    /// Returns `true` if this is an encode or decode error.
    #[must_use]
    pub const fn is_codec(&self) -> bool {
        matches!(self, Self::Encode(_) | Self::Decode(_))
    }

    /// The peer's error, if the peer answered with one.
    #[must_use]
    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            Self::Call(error) => error.remote_error(),
            _ => None,
        }
    }

    /// Returns `true` if retrying might succeed.
    ///
    /// Recoverable transport errors, calls still in flight and interrupted
    /// waits qualify. Remote and codec errors do not.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport(error) => error.is_recoverable(),
            Self::Call(error) => matches!(
                error,
                CallError::NotAvailable { .. } | CallError::Interrupted { .. }
            ),
            Self::Encode(_) | Self::Decode(_) => false,
        }
    }

    /// Returns `true` if the connection can no longer be used.
    #[must_use]
    pub fn should_close_transport(&self) -> bool {
        match self {
            Self::Transport(error) => error.should_close_transport(),
            Self::Call(_) | Self::Encode(_) | Self::Decode(_) => false,
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport error: {}", e),
            Self::Call(e) => write!(f, "call error: {}", e),
            Self::Encode(e) => write!(f, "encode error: {}", e),
            Self::Decode(e) => write!(f, "decode error: {}", e),
        }
    }
}

impl StdError for RpcError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Call(e) => Some(e),
            Self::Encode(e) => Some(e),
            Self::Decode(e) => Some(e),
        }
    }
}

impl From<TransportError> for RpcError {
    fn from(error: TransportError) -> Self {
        Self::Transport(error)
    }
}

impl From<CallError> for RpcError {
    fn from(error: CallError) -> Self {
        Self::Call(error)
    }
}

impl From<EncodeError> for RpcError {
    fn from(error: EncodeError) -> Self {
        Self::Encode(error)
    }
}

impl From<DecodeError> for RpcError {
    fn from(error: DecodeError) -> Self {
        Self::Decode(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let error = RpcError::from(TransportError::Closed);
        assert!(error.is_transport());
        assert!(!error.is_call());
        assert!(!error.is_codec());

        let error = RpcError::from(CallError::Remote {
            sequence: 1,
            error: RemoteError::new("E", "m"),
        });
        assert!(error.is_call());
        assert!(error.is_remote());
        assert!(!error.is_timeout());
        assert_eq!(error.remote_error().map(RemoteError::class), Some("E"));

        assert!(RpcError::from(DecodeError::Empty).is_codec());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(RpcError::from(CallError::NotAvailable { sequence: 1 }).is_recoverable());
        assert!(RpcError::from(CallError::Interrupted { sequence: 1 }).is_recoverable());
        assert!(!RpcError::from(CallError::Timeout { sequence: 1 }).is_recoverable());
        assert!(!RpcError::from(DecodeError::UnknownTag(0x01)).is_recoverable());
        assert!(RpcError::from(TransportError::NotConnected).is_recoverable());
    }

    #[test]
    fn test_should_close_transport() {
        let lost = RpcError::from(TransportError::ConnectionLost {
            reason: "peer closed".to_string(),
            source: None,
        });
        assert!(lost.should_close_transport());
        assert!(!RpcError::from(CallError::Timeout { sequence: 1 }).should_close_transport());
    }

    #[test]
    fn test_display_and_source() {
        let error = RpcError::from(CallError::UnknownCall { sequence: 12 });
        assert_eq!(error.to_string(), "call error: unknown call 12");
        assert!(error.source().is_some());
    }
}

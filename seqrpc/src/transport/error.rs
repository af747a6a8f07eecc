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

//! Transport layer error types.
//!
//! Transport errors fall into two groups that the router treats very
//! differently:
//!
//! - **Protocol errors** ([`TransportError::Encode`], [`TransportError::Decode`]):
//!   one message could not be written or understood, but the stream itself is
//!   intact. The message is dropped and the loop carries on.
//! - **Everything else**: the connection is unusable. The router tears down
//!   rather than risk silently losing messages.

use crate::codec::{DecodeError, EncodeError};
use std::io;
use thiserror::Error;

/// Errors that can occur at the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to establish a connection.
    #[error("failed to connect to {address}: {source}")]
    ConnectionFailed {
        /// The address that could not be reached
        address: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// An established connection was lost.
    #[error("connection lost: {reason}")]
    ConnectionLost {
        /// What happened
        reason: String,
        /// The underlying I/O error, if any
        #[source]
        source: Option<io::Error>,
    },

    /// Reading from the connection failed.
    #[error("read failed: {source}")]
    ReadFailed {
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Writing to the connection failed.
    #[error("write failed: {source}")]
    WriteFailed {
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The transport configuration cannot work.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Why the configuration was rejected
        reason: String,
    },

    /// The transport has been shut down.
    #[error("transport is closed")]
    Closed,

    /// The transport has no live connection.
    #[error("transport is not connected")]
    NotConnected,

    /// Binding a listener failed.
    #[error("failed to bind to {address}: {source}")]
    BindFailed {
        /// The requested address
        address: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Any other I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// An outgoing message could not be encoded.
    #[error("message encoding failed: {0}")]
    Encode(#[from] EncodeError),

    /// An incoming message was framed correctly but could not be decoded.
    #[error("message decoding failed: {0}")]
    Decode(#[from] DecodeError),
}

impl TransportError {
    /// Returns `true` if only a single message was affected and the
    /// connection remains usable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqrpc::codec::DecodeError;
    /// use seqrpc::transport::TransportError;
    ///
    /// assert!(TransportError::Decode(DecodeError::UnknownTag(0x7f)).is_protocol_error());
    /// assert!(!TransportError::Closed.is_protocol_error());
    /// ```
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, TransportError::Encode(_) | TransportError::Decode(_))
    }

    /// Returns `true` if reconnecting might succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            TransportError::ConnectionFailed { .. }
            | TransportError::ConnectionLost { .. }
            | TransportError::NotConnected => true,

            TransportError::ReadFailed { source }
            | TransportError::WriteFailed { source }
            | TransportError::Io { source } => matches!(
                source.kind(),
                io::ErrorKind::Interrupted
                    | io::ErrorKind::WouldBlock
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ),

            TransportError::InvalidConfiguration { .. }
            | TransportError::Closed
            | TransportError::BindFailed { .. }
            | TransportError::Encode(_)
            | TransportError::Decode(_) => false,
        }
    }

    /// Returns `true` if the connection must be closed after this error.
    pub fn should_close_transport(&self) -> bool {
        !self.is_protocol_error()
            && !matches!(
                self,
                TransportError::ConnectionFailed { .. } | TransportError::BindFailed { .. }
            )
    }

    pub(crate) fn connection_lost(reason: impl Into<String>) -> Self {
        TransportError::ConnectionLost {
            reason: reason.into(),
            source: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn connection_failed(address: impl Into<String>) -> Self {
        TransportError::ConnectionFailed {
            address: address.into(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
        }
    }

    #[cfg(test)]
    pub(crate) fn invalid_configuration(reason: impl Into<String>) -> Self {
        TransportError::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self {
        TransportError::Io { source: error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_errors_keep_connection() {
        let error = TransportError::Decode(DecodeError::UnknownKind(9));
        assert!(error.is_protocol_error());
        assert!(!error.should_close_transport());
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_connection_lost_closes_and_recovers() {
        let error = TransportError::connection_lost("peer went away");
        assert!(!error.is_protocol_error());
        assert!(error.should_close_transport());
        assert!(error.is_recoverable());
        assert_eq!(error.to_string(), "connection lost: peer went away");
    }

    #[test]
    fn test_connection_failed() {
        let error = TransportError::connection_failed("127.0.0.1:1");
        assert!(error.is_recoverable());
        assert!(!error.should_close_transport());
    }

    #[test]
    fn test_reset_read_is_recoverable() {
        let error = TransportError::ReadFailed {
            source: io::Error::new(io::ErrorKind::ConnectionReset, "reset"),
        };
        assert!(error.is_recoverable());
        assert!(error.should_close_transport());
    }

    #[test]
    fn test_invalid_configuration_is_final() {
        let error = TransportError::invalid_configuration("no address");
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_from_io() {
        let error: TransportError = io::Error::other("boom").into();
        assert!(matches!(error, TransportError::Io { .. }));
    }
}

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

//! Errors raised by the router.

use crate::codec::RemoteError;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Why a call result could not be handed to the caller.
///
/// Returned by [`Router::get_return`](crate::router::Router::get_return) and
/// its blocking variant. Every variant carries the sequence number the caller
/// asked about.
///
/// # Examples
///
/// ```rust
/// use seqrpc::codec::RemoteError;
/// use seqrpc::router::CallError;
///
/// let error = CallError::Remote {
///     sequence: 9,
///     error: RemoteError::new("MethodNotExposed", "sum is not an RPC-exposed operation"),
/// };
/// assert!(error.is_remote());
/// assert_eq!(error.sequence(), 9);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// The call is still in flight; ask again later.
    NotAvailable {
        /// The call's sequence number
        sequence: u64,
    },

    /// No such call is being tracked: it was already collected, never
    /// existed, or was flushed by a stop.
    UnknownCall {
        /// The call's sequence number
        sequence: u64,
    },

    /// No return arrived within the router's call timeout.
    Timeout {
        /// The call's sequence number
        sequence: u64,
    },

    /// The peer answered with an error.
    Remote {
        /// The call's sequence number
        sequence: u64,
        /// What the peer reported
        error: RemoteError,
    },

    /// A blocking wait was woken by the router stopping.
    Interrupted {
        /// The call's sequence number
        sequence: u64,
    },
}

impl CallError {
    /// The sequence number of the call concerned.
    #[must_use]
    pub const fn sequence(&self) -> u64 {
        match self {
            Self::NotAvailable { sequence }
            | Self::UnknownCall { sequence }
            | Self::Timeout { sequence }
            | Self::Remote { sequence, .. }
            | Self::Interrupted { sequence } => *sequence,
        }
    }

    /// Returns `true` if the call may still complete.
    #[must_use]
    pub const fn is_not_available(&self) -> bool {
        matches!(self, Self::NotAvailable { .. })
    }

    /// Returns `true` if the call is not tracked.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::UnknownCall { .. })
    }

    /// Returns `true` if the call timed out.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if the peer reported an error.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// The peer's error, if that is what this is.
    #[must_use]
    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAvailable { sequence } => {
                write!(f, "return for call {} is not available yet", sequence)
            }
            Self::UnknownCall { sequence } => write!(f, "unknown call {}", sequence),
            Self::Timeout { sequence } => write!(f, "call {} timed out", sequence),
            Self::Remote { sequence, error } => {
                write!(f, "call {} failed remotely: {}", sequence, error)
            }
            Self::Interrupted { sequence } => {
                write!(f, "wait for call {} was interrupted", sequence)
            }
        }
    }
}

impl StdError for CallError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Remote { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Why an inbound call could not be executed.
///
/// These never escape the dispatch loop: each becomes a [`RemoteError`] in
/// the return message, classed by variant name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No target is registered under the requested name.
    #[error("no target object named '{target}'")]
    UnresolvedTarget {
        /// The requested target
        target: String,
    },

    /// The target has no operation with the requested name.
    #[error("target '{target}' has no method '{method}'")]
    UnresolvedMethod {
        /// The requested target
        target: String,
        /// The requested method
        method: String,
    },

    /// The operation exists but may not be called remotely.
    #[error("{target}.{method} is not an RPC-exposed operation")]
    MethodNotExposed {
        /// The requested target
        target: String,
        /// The requested method
        method: String,
    },

    /// The operation ran and failed.
    #[error("{0}")]
    Execution(RemoteError),
}

impl DispatchError {
    /// Converts into the error carried back to the caller.
    ///
    /// Execution failures pass through unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqrpc::router::DispatchError;
    ///
    /// let error = DispatchError::UnresolvedTarget { target: "svc".into() }.into_remote_error();
    /// assert_eq!(error.class(), "UnresolvedTarget");
    /// assert_eq!(error.message(), "no target object named 'svc'");
    /// ```
    #[must_use]
    pub fn into_remote_error(self) -> RemoteError {
        let class = match &self {
            Self::UnresolvedTarget { .. } => "UnresolvedTarget",
            Self::UnresolvedMethod { .. } => "UnresolvedMethod",
            Self::MethodNotExposed { .. } => "MethodNotExposed",
            Self::Execution(error) => return error.clone(),
        };
        RemoteError::new(class, self.to_string())
    }
}

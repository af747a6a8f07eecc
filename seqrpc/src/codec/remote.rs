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

//! Remote error values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A failure raised while executing a call on the remote side.
///
/// Remote errors travel inside a return message as an ordinary value and are
/// re-raised to the caller when the result is collected. The class names the
/// kind of failure and the message carries its human readable detail.
///
/// # Examples
///
/// ```rust
/// use seqrpc::codec::RemoteError;
///
/// let err = RemoteError::new("IllegalArgument", "count must be positive");
/// assert_eq!(err.class(), "IllegalArgument");
/// assert_eq!(err.to_string(), "IllegalArgument (count must be positive)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[error("{class} ({message})")]
pub struct RemoteError {
    class: String,
    message: String,
}

impl RemoteError {
    /// Creates a remote error from a class name and message.
    #[must_use]
    pub fn new(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            message: message.into(),
        }
    }

    /// Wraps a local error, using the unqualified name of its type as the class.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use seqrpc::codec::RemoteError;
    ///
    /// let parse = "x".parse::<i32>().unwrap_err();
    /// let err = RemoteError::from_error(&parse);
    /// assert_eq!(err.class(), "ParseIntError");
    /// ```
    #[must_use]
    pub fn from_error<E: std::error::Error>(error: &E) -> Self {
        Self::new(short_type_name::<E>(), error.to_string())
    }

    /// The class of the failure.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// The detail message of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

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

//! Return messages.

use super::call::CallMessage;
use super::frame::now_millis;
use crate::codec::{decode, encode, DecodeError, EncodeError, RemoteError, SequenceGenerator, Value};

/// The answer to a [`CallMessage`].
///
/// Carries the sequence number of the call it answers and a single result:
/// an ordinary value, the [void sentinel](Value::void) for operations with no
/// result, or a [`RemoteError`] describing why the call failed.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnMessage {
    sequence: u64,
    timestamp: i64,
    result: Value,
}

impl ReturnMessage {
    /// Builds the return for `call`.
    #[must_use]
    pub fn answering(call: &CallMessage, result: Value) -> Self {
        Self::from_parts(call.sequence(), now_millis(), result)
    }

    /// Builds a return that answers no known call.
    #[must_use]
    pub fn orphan(result: Value) -> Self {
        Self::from_parts(SequenceGenerator::ORPHAN, now_millis(), result)
    }

    /// Builds a return from explicit header fields.
    #[must_use]
    pub fn from_parts(sequence: u64, timestamp: i64, result: Value) -> Self {
        Self {
            sequence,
            timestamp,
            result,
        }
    }

    /// Sequence number of the call being answered.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Creation time in milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// The carried result.
    pub fn result(&self) -> &Value {
        &self.result
    }

    /// Returns `true` if the result is a remote error.
    pub fn is_error(&self) -> bool {
        matches!(self.result, Value::RemoteError(_))
    }

    /// Splits the result into success and remote failure.
    ///
    /// # Errors
    ///
    /// Returns the carried [`RemoteError`] if the call failed remotely.
    pub fn into_result(self) -> Result<Value, RemoteError> {
        match self.result {
            Value::RemoteError(err) => Err(err),
            value => Ok(value),
        }
    }

    pub(crate) fn encode_body(&self) -> Result<Vec<u8>, EncodeError> {
        encode(&self.result)
    }

    pub(crate) fn decode_body(
        sequence: u64,
        timestamp: i64,
        body: &[u8],
    ) -> Result<Self, DecodeError> {
        Ok(Self::from_parts(sequence, timestamp, decode(body)?))
    }
}

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

//! Call messages.

use super::frame::now_millis;
use crate::codec::{put_len, put_prefixed, DecodeError, EncodeError, Reader, SequenceGenerator, Value};

/// A request to invoke `method` on the target registered as `target`.
///
/// Calls are immutable once built. The sequence number is taken from a
/// [`SequenceGenerator`] at construction and is how the eventual return is
/// matched back to this call.
///
/// # Examples
///
/// ```rust
/// use seqrpc::codec::{SequenceGenerator, Value};
/// use seqrpc::message::CallMessage;
///
/// let sequences = SequenceGenerator::new();
/// let call = CallMessage::new(&sequences, "svc", "echo", vec![Value::from(42)]);
/// assert_eq!(call.sequence(), 1);
/// assert_eq!(call.target(), "svc");
/// assert_eq!(call.args(), &[Value::Int(42)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CallMessage {
    sequence: u64,
    timestamp: i64,
    target: String,
    method: String,
    args: Vec<Value>,
}

impl CallMessage {
    /// Builds a call stamped with the next sequence number and the current time.
    #[must_use]
    pub fn new(
        sequences: &SequenceGenerator,
        target: impl Into<String>,
        method: impl Into<String>,
        args: Vec<Value>,
    ) -> Self {
        Self::from_parts(sequences.next(), now_millis(), target, method, args)
    }

    /// Builds a call from explicit header fields, as read off the wire.
    #[must_use]
    pub fn from_parts(
        sequence: u64,
        timestamp: i64,
        target: impl Into<String>,
        method: impl Into<String>,
        args: Vec<Value>,
    ) -> Self {
        Self {
            sequence,
            timestamp,
            target: target.into(),
            method: method.into(),
            args,
        }
    }

    /// The sequence number correlating this call with its return.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Creation time in milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Name of the target object.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Name of the operation on the target.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The call arguments, in order.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Encodes the body: target, method, argument count, then each argument
    /// length-prefixed.
    pub(crate) fn encode_body(&self) -> Result<Vec<u8>, EncodeError> {
        let mut body = Vec::with_capacity(16 + self.target.len() + self.method.len());
        put_prefixed(&mut body, &Value::String(self.target.clone()))?;
        put_prefixed(&mut body, &Value::String(self.method.clone()))?;
        put_len(&mut body, "argument list", self.args.len())?;
        for arg in &self.args {
            put_prefixed(&mut body, arg)?;
        }
        Ok(body)
    }

    pub(crate) fn decode_body(
        sequence: u64,
        timestamp: i64,
        body: &[u8],
    ) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(body);
        let target = expect_string("target", reader.value("target")?)?;
        let method = expect_string("method", reader.value("method")?)?;
        let count = reader.length("argument count")?;
        let mut args = Vec::with_capacity(count.min(reader.remaining() / 5));
        for _ in 0..count {
            args.push(reader.value("argument")?);
        }
        reader.finish()?;
        Ok(Self::from_parts(sequence, timestamp, target, method, args))
    }
}

fn expect_string(what: &'static str, value: Value) -> Result<String, DecodeError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(DecodeError::invalid(
            what,
            format!("expected string, found {}", other.kind_name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_roundtrip() {
        let call = CallMessage::from_parts(
            7,
            123,
            "accounts",
            "transfer",
            vec![Value::from("alice"), Value::Long(250), Value::List(vec![Value::Null])],
        );
        let body = call.encode_body().unwrap();
        assert_eq!(CallMessage::decode_body(7, 123, &body).unwrap(), call);
    }

    #[test]
    fn test_body_without_args() {
        let call = CallMessage::from_parts(1, 0, "svc", "ping", vec![]);
        let body = call.encode_body().unwrap();
        assert_eq!(&body[body.len() - 4..], &[0, 0, 0, 0]);
        assert_eq!(CallMessage::decode_body(1, 0, &body).unwrap(), call);
    }

    #[test]
    fn test_non_string_target_rejected() {
        let mut body = Vec::new();
        put_prefixed(&mut body, &Value::Int(1)).unwrap();
        put_prefixed(&mut body, &Value::from("m")).unwrap();
        put_len(&mut body, "argument list", 0).unwrap();
        assert!(matches!(
            CallMessage::decode_body(1, 0, &body),
            Err(DecodeError::InvalidValue { kind: "target", .. })
        ));
    }

    #[test]
    fn test_argument_count_past_end() {
        let call = CallMessage::from_parts(1, 0, "svc", "m", vec![Value::Int(1)]);
        let mut body = call.encode_body().unwrap();
        // claim two arguments while carrying one
        let count_at = body.len() - 4 - 5 - 4;
        body[count_at..count_at + 4].copy_from_slice(&2u32.to_be_bytes());
        assert!(matches!(
            CallMessage::decode_body(1, 0, &body),
            Err(DecodeError::Truncated { .. })
        ));
    }

    #[test]
    fn test_new_takes_sequence() {
        let sequences = SequenceGenerator::new();
        let a = CallMessage::new(&sequences, "svc", "a", vec![]);
        let b = CallMessage::new(&sequences, "svc", "b", vec![]);
        assert!(b.sequence() > a.sequence());
        assert!(a.timestamp() > 0);
    }
}

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

//! Error types produced while encoding and decoding wire values.

use thiserror::Error;

/// Errors raised when a value cannot be written in the tagged wire format.
///
/// Encoding never coerces: a value that has no faithful representation is
/// rejected up front.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The value (or something nested in it) has no wire representation.
    #[error("unsupported {kind} value: {reason}")]
    Unsupported {
        /// The kind of value that was rejected
        kind: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// A string, collection or payload does not fit a 32-bit length prefix.
    #[error("{what} of {len} bytes exceeds the 32-bit length field")]
    TooLarge {
        /// What was being encoded
        what: &'static str,
        /// The offending length
        len: usize,
    },

    /// A structured object could not be rendered as JSON.
    #[error("JSON encoding failed: {source}")]
    Json {
        /// The underlying serde_json error
        #[from]
        source: serde_json::Error,
    },
}

impl EncodeError {
    pub(crate) fn unsupported(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            kind,
            reason: reason.into(),
        }
    }
}

/// Errors raised when bytes cannot be read back as a value or message.
///
/// Decode errors are protocol errors: the offending value or message is dropped
/// and the reader carries on with the next one.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// There were no bytes where a value was expected.
    #[error("empty value")]
    Empty,

    /// The tag byte does not name a known value kind.
    #[error("unknown value tag 0x{0:02x}")]
    UnknownTag(u8),

    /// The message kind byte is neither a call nor a return.
    #[error("unknown message kind {0}")]
    UnknownKind(u8),

    /// A fixed-width value or a message did not have the length it declares.
    #[error("{what} expects {expected} bytes, got {actual}")]
    LengthMismatch {
        /// What was being decoded
        what: &'static str,
        /// Number of bytes the format requires
        expected: usize,
        /// Number of bytes actually present
        actual: usize,
    },

    /// A length prefix points past the end of the input.
    #[error("truncated {what}: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        /// What was being decoded
        what: &'static str,
        /// Bytes required
        needed: usize,
        /// Bytes available
        remaining: usize,
    },

    /// A composite value did not consume all of its input.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// A payload is larger than the configured maximum.
    #[error("payload of {size} bytes exceeds maximum of {max}")]
    PayloadTooLarge {
        /// Declared payload size
        size: usize,
        /// Maximum accepted size
        max: usize,
    },

    /// The bytes are well-framed but the content is not a legal value.
    #[error("invalid {kind} value: {reason}")]
    InvalidValue {
        /// The kind of value being decoded
        kind: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// A string was not valid UTF-8.
    #[error("invalid UTF-8: {source}")]
    Utf8 {
        /// The underlying conversion error
        #[from]
        source: std::string::FromUtf8Error,
    },

    /// A structured object or remote error was not valid JSON.
    #[error("malformed JSON: {source}")]
    Json {
        /// The underlying serde_json error
        #[from]
        source: serde_json::Error,
    },
}

impl DecodeError {
    pub(crate) fn invalid(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            kind,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tag_display() {
        let err = DecodeError::UnknownTag(0x7f);
        assert_eq!(err.to_string(), "unknown value tag 0x7f");
    }

    #[test]
    fn test_length_mismatch_display() {
        let err = DecodeError::LengthMismatch {
            what: "int",
            expected: 4,
            actual: 3,
        };
        assert_eq!(err.to_string(), "int expects 4 bytes, got 3");
    }

    #[test]
    fn test_unsupported_display() {
        let err = EncodeError::unsupported("char", "outside the basic multilingual plane");
        assert!(err.to_string().contains("unsupported char value"));
    }
}

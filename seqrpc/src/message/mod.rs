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

//! The two message shapes exchanged between peers.
//!
//! A [`CallMessage`] asks the peer to run an operation; a [`ReturnMessage`]
//! carries the outcome back. Both share the 21 byte [`Header`] and differ
//! only in their body.
//!
//! # Examples
//!
//! ```rust
//! use seqrpc::codec::{SequenceGenerator, Value};
//! use seqrpc::message::{CallMessage, Message};
//!
//! let sequences = SequenceGenerator::new();
//! let call = CallMessage::new(&sequences, "svc", "echo", vec![Value::from(42)]);
//!
//! let bytes = Message::from(call.clone()).encode()?;
//! assert_eq!(Message::decode(&bytes)?, Message::Call(call));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod call;
mod frame;
mod reply;

pub use self::call::CallMessage;
pub use self::frame::{Header, Packet, PacketCodec, HEADER_SIZE, MAX_PAYLOAD_SIZE};
pub use self::reply::ReturnMessage;

use crate::codec::{DecodeError, EncodeError};

/// The kind byte at the start of every message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    /// A request to invoke an operation.
    Call = 0,
    /// The outcome of a call.
    Return = 1,
}

impl TryFrom<u8> for MessageKind {
    type Error = DecodeError;

    fn try_from(kind: u8) -> Result<Self, DecodeError> {
        match kind {
            0 => Ok(MessageKind::Call),
            1 => Ok(MessageKind::Return),
            other => Err(DecodeError::UnknownKind(other)),
        }
    }
}

/// Either kind of message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A call
    Call(CallMessage),
    /// A return
    Return(ReturnMessage),
}

impl Message {
    /// The kind of this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Call(_) => MessageKind::Call,
            Message::Return(_) => MessageKind::Return,
        }
    }

    /// The sequence number carried in the header.
    pub fn sequence(&self) -> u64 {
        match self {
            Message::Call(call) => call.sequence(),
            Message::Return(ret) => ret.sequence(),
        }
    }

    /// The timestamp carried in the header.
    pub fn timestamp(&self) -> i64 {
        match self {
            Message::Call(call) => call.timestamp(),
            Message::Return(ret) => ret.timestamp(),
        }
    }

    /// Encodes the body and wraps it in a packet.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] if an argument or result cannot be encoded or
    /// the body exceeds the 32-bit length field.
    pub fn to_packet(&self) -> Result<Packet, EncodeError> {
        let payload = match self {
            Message::Call(call) => call.encode_body()?,
            Message::Return(ret) => ret.encode_body()?,
        };
        if u32::try_from(payload.len()).is_err() {
            return Err(EncodeError::TooLarge {
                what: "message body",
                len: payload.len(),
            });
        }
        Ok(Packet {
            kind: self.kind() as u8,
            timestamp: self.timestamp(),
            sequence: self.sequence(),
            payload,
        })
    }

    /// Interprets a framed packet.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the kind byte is unknown or the body is
    /// malformed.
    pub fn from_packet(packet: &Packet) -> Result<Self, DecodeError> {
        match MessageKind::try_from(packet.kind)? {
            MessageKind::Call => {
                CallMessage::decode_body(packet.sequence, packet.timestamp, &packet.payload)
                    .map(Message::Call)
            }
            MessageKind::Return => {
                ReturnMessage::decode_body(packet.sequence, packet.timestamp, &packet.payload)
                    .map(Message::Return)
            }
        }
    }

    /// Encodes the complete message, header included.
    ///
    /// # Errors
    ///
    /// See [`to_packet`](Self::to_packet).
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(self.to_packet()?.to_bytes())
    }

    /// Decodes one complete message, header included.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the length does not match the header, the
    /// kind is unknown or the body is malformed.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::from_packet(&Packet::from_bytes(bytes)?)
    }
}

impl From<CallMessage> for Message {
    fn from(call: CallMessage) -> Self {
        Message::Call(call)
    }
}

impl From<ReturnMessage> for Message {
    fn from(ret: ReturnMessage) -> Self {
        Message::Return(ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{RemoteError, Value};

    #[test]
    fn test_call_header_fields() {
        let call = CallMessage::from_parts(0x0102, 0x0a0b, "svc", "echo", vec![Value::Int(42)]);
        let bytes = Message::from(call).encode().unwrap();
        let header = Header::parse(&bytes).unwrap();

        assert_eq!(header.kind, 0);
        assert_eq!(header.length as usize, bytes.len() - HEADER_SIZE);
        assert_eq!(header.timestamp, 0x0a0b);
        assert_eq!(header.sequence, 0x0102);
    }

    #[test]
    fn test_return_roundtrip() {
        let ret = ReturnMessage::from_parts(5, 99, RemoteError::new("Oops", "no").into());
        let message = Message::from(ret);
        assert_eq!(Message::decode(&message.encode().unwrap()).unwrap(), message);
    }

    #[test]
    fn test_unknown_kind() {
        let mut bytes = Message::from(ReturnMessage::from_parts(1, 0, Value::Null))
            .encode()
            .unwrap();
        bytes[0] = 7;
        assert!(matches!(
            Message::decode(&bytes),
            Err(DecodeError::UnknownKind(7))
        ));
    }

    #[test]
    fn test_truncated_message() {
        let bytes = Message::from(ReturnMessage::from_parts(1, 0, Value::Int(3)))
            .encode()
            .unwrap();
        assert!(matches!(
            Message::decode(&bytes[..bytes.len() - 1]),
            Err(DecodeError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_kind_accessors() {
        let call = Message::from(CallMessage::from_parts(3, 0, "t", "m", vec![]));
        assert_eq!(call.kind(), MessageKind::Call);
        assert_eq!(call.sequence(), 3);
        assert_eq!(MessageKind::try_from(1).unwrap(), MessageKind::Return);
    }
}

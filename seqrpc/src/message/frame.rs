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

//! Message envelopes and stream framing.
//!
//! Every message on the wire is a fixed 21 byte header followed by the body:
//!
//! ```text
//! +------+----------------+-------------------+------------------+----------------+
//! | kind | length (u32)   | timestamp (i64)   | sequence (u64)   | body (length)  |
//! | 1 B  | 4 B            | 8 B               | 8 B              | N B            |
//! +------+----------------+-------------------+------------------+----------------+
//! ```
//!
//! All integers are big-endian. The timestamp is milliseconds since the Unix
//! epoch and is informational only.

use crate::codec::DecodeError;
use bytes::{Buf, BufMut, BytesMut};
use std::io;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_util::codec::{Decoder, Encoder};

/// Size of the message header in bytes.
pub const HEADER_SIZE: usize = 21;

/// Maximum body size accepted by [`PacketCodec`] by default (16 MiB).
///
/// Bounds the memory a single message from a misbehaving peer can claim.
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Milliseconds since the Unix epoch, for message timestamps.
pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// The fixed-size message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Message kind byte (0 = call, 1 = return)
    pub kind: u8,
    /// Body length in bytes
    pub length: u32,
    /// Creation time, milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Sequence number of the call this message belongs to
    pub sequence: u64,
}

impl Header {
    /// Serializes the header.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0] = self.kind;
        out[1..5].copy_from_slice(&self.length.to_be_bytes());
        out[5..13].copy_from_slice(&self.timestamp.to_be_bytes());
        out[13..21].copy_from_slice(&self.sequence.to_be_bytes());
        out
    }

    /// Parses a header from the front of `buf`, or `None` if it is too short.
    pub fn parse(mut buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        Some(Self {
            kind: buf.get_u8(),
            length: buf.get_u32(),
            timestamp: buf.get_i64(),
            sequence: buf.get_u64(),
        })
    }
}

/// A framed but not yet interpreted message.
///
/// Packets are what the stream codec produces; turning one into a typed
/// [`Message`](super::Message) is a separate step so that a body that fails
/// to decode costs only that message, not the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Message kind byte
    pub kind: u8,
    /// Creation time, milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Sequence number
    pub sequence: u64,
    /// Encoded body
    pub payload: Vec<u8>,
}

impl Packet {
    /// Returns the header describing this packet.
    ///
    /// Bodies longer than `u32::MAX` are rejected when packets are built, so
    /// the length always fits.
    pub fn header(&self) -> Header {
        Header {
            kind: self.kind,
            length: u32::try_from(self.payload.len()).unwrap_or(u32::MAX),
            timestamp: self.timestamp,
            sequence: self.sequence,
        }
    }

    /// Serializes header and body into one buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        out.extend_from_slice(&self.header().to_bytes());
        out.extend_from_slice(&self.payload);
        out
    }

    /// Parses exactly one packet from `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::LengthMismatch`] if `bytes` is shorter than a
    /// header or its length does not match the header's body length.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let header = Header::parse(bytes).ok_or(DecodeError::LengthMismatch {
            what: "message header",
            expected: HEADER_SIZE,
            actual: bytes.len(),
        })?;
        let expected = HEADER_SIZE + header.length as usize;
        if bytes.len() != expected {
            return Err(DecodeError::LengthMismatch {
                what: "message",
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            kind: header.kind,
            timestamp: header.timestamp,
            sequence: header.sequence,
            payload: bytes[HEADER_SIZE..].to_vec(),
        })
    }
}

/// Stream codec splitting a byte stream into [`Packet`]s.
///
/// Used with [`tokio_util::codec::FramedRead`] and
/// [`FramedWrite`](tokio_util::codec::FramedWrite). Partially received
/// packets stay buffered inside the framed reader, so a read that is
/// cancelled midway loses nothing.
#[derive(Debug, Clone, Copy)]
pub struct PacketCodec {
    max_payload: usize,
}

impl PacketCodec {
    /// Creates a codec with the default payload limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_payload(MAX_PAYLOAD_SIZE)
    }

    /// Creates a codec accepting bodies up to `max_payload` bytes.
    #[must_use]
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self { max_payload }
    }

    /// The largest body this codec accepts.
    pub fn max_payload(&self) -> usize {
        self.max_payload
    }

    fn check_size(&self, size: usize) -> io::Result<()> {
        if size > self.max_payload {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                DecodeError::PayloadTooLarge {
                    size,
                    max: self.max_payload,
                },
            ));
        }
        Ok(())
    }
}

impl Default for PacketCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for PacketCodec {
    type Item = Packet;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Packet>, io::Error> {
        let Some(header) = Header::parse(&src[..]) else {
            src.reserve(HEADER_SIZE - src.len());
            return Ok(None);
        };
        let length = header.length as usize;
        self.check_size(length)?;

        let total = HEADER_SIZE + length;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        src.advance(HEADER_SIZE);
        let payload = src.split_to(length).to_vec();
        Ok(Some(Packet {
            kind: header.kind,
            timestamp: header.timestamp,
            sequence: header.sequence,
            payload,
        }))
    }
}

impl Encoder<Packet> for PacketCodec {
    type Error = io::Error;

    fn encode(&mut self, packet: Packet, dst: &mut BytesMut) -> Result<(), io::Error> {
        self.check_size(packet.payload.len())?;
        dst.reserve(HEADER_SIZE + packet.payload.len());
        dst.put_slice(&packet.header().to_bytes());
        dst.put_slice(&packet.payload);
        Ok(())
    }
}

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

//! Tagged binary encoding of single values.
//!
//! Every encoded value starts with a one byte tag naming its kind, followed by
//! a layout specific to that kind. Primitives are fixed width and big-endian.
//! Strings and byte arrays run to the end of the value, so an encoded value is
//! always framed by its container: the message body or a composite's per
//! element length prefix. Arrays, lists, sets and maps carry a 32-bit count and
//! length-prefix every element. Structured objects and remote errors are JSON
//! text.

use super::error::{DecodeError, EncodeError};
use super::remote::RemoteError;
use super::value::{Value, ValueSet};
use std::collections::BTreeMap;

/// Wire tags for each value kind.
pub mod tag {
    /// Null
    pub const NULL: u8 = 0x40;
    /// Boolean
    pub const BOOL: u8 = 0x41;
    /// Byte
    pub const BYTE: u8 = 0x42;
    /// UTF-16 character
    pub const CHAR: u8 = 0x43;
    /// 16-bit integer
    pub const SHORT: u8 = 0x44;
    /// 32-bit integer
    pub const INT: u8 = 0x45;
    /// 32-bit float
    pub const FLOAT: u8 = 0x46;
    /// 64-bit float
    pub const DOUBLE: u8 = 0x47;
    /// 64-bit integer
    pub const LONG: u8 = 0x48;
    /// UTF-8 string
    pub const STRING: u8 = 0x49;
    /// Array of values
    pub const ARRAY: u8 = 0x50;
    /// Ordered list
    pub const LIST: u8 = 0x51;
    /// Structured object (JSON text)
    pub const OBJECT: u8 = 0x52;
    /// JSON array (JSON text)
    pub const JSON_ARRAY: u8 = 0x53;
    /// Remote error (JSON text)
    pub const REMOTE_ERROR: u8 = 0x54;
    /// Raw byte array
    pub const BYTES: u8 = 0x55;
    /// Unordered set
    pub const SET: u8 = 0x56;
    /// String-keyed map
    pub const MAP: u8 = 0x57;
}

/// How deeply arrays, lists, sets and maps may nest inside one decoded value.
pub const MAX_NESTING: usize = 128;

/// Encodes a value into a fresh buffer.
///
/// # Errors
///
/// Returns [`EncodeError`] if the value has no wire representation, such as
/// a character outside the basic multilingual plane.
///
/// # Examples
///
/// ```rust
/// use seqrpc::codec::{decode, encode, Value};
///
/// let bytes = encode(&Value::Int(42)).unwrap();
/// assert_eq!(bytes, vec![0x45, 0, 0, 0, 42]);
/// assert_eq!(decode(&bytes).unwrap(), Value::Int(42));
/// ```
pub fn encode(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::with_capacity(encoded_size_hint(value));
    encode_into(value, &mut buf)?;
    Ok(buf)
}

/// Appends the encoding of a value to `buf`.
///
/// On error the contents of `buf` past its original length are unspecified.
pub fn encode_into(value: &Value, buf: &mut Vec<u8>) -> Result<(), EncodeError> {
    match value {
        Value::Null => buf.push(tag::NULL),
        Value::Bool(b) => {
            buf.push(tag::BOOL);
            buf.push(u8::from(*b));
        }
        Value::Byte(b) => {
            buf.push(tag::BYTE);
            buf.push(*b);
        }
        Value::Char(c) => {
            let mut units = [0u16; 2];
            let encoded = c.encode_utf16(&mut units);
            if encoded.len() != 1 {
                return Err(EncodeError::unsupported(
                    "char",
                    format!("{c:?} is outside the basic multilingual plane"),
                ));
            }
            buf.push(tag::CHAR);
            buf.extend_from_slice(&units[0].to_be_bytes());
        }
        Value::Short(s) => {
            buf.push(tag::SHORT);
            buf.extend_from_slice(&s.to_be_bytes());
        }
        Value::Int(i) => {
            buf.push(tag::INT);
            buf.extend_from_slice(&i.to_be_bytes());
        }
        Value::Float(f) => {
            buf.push(tag::FLOAT);
            buf.extend_from_slice(&f.to_bits().to_be_bytes());
        }
        Value::Double(d) => {
            buf.push(tag::DOUBLE);
            buf.extend_from_slice(&d.to_bits().to_be_bytes());
        }
        Value::Long(l) => {
            buf.push(tag::LONG);
            buf.extend_from_slice(&l.to_be_bytes());
        }
        Value::String(s) => {
            buf.push(tag::STRING);
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Bytes(b) => {
            buf.push(tag::BYTES);
            buf.extend_from_slice(b);
        }
        Value::Array(items) => {
            buf.push(tag::ARRAY);
            encode_sequence(items.iter(), items.len(), buf)?;
        }
        Value::List(items) => {
            buf.push(tag::LIST);
            encode_sequence(items.iter(), items.len(), buf)?;
        }
        Value::Set(set) => {
            buf.push(tag::SET);
            encode_sequence(set.iter(), set.len(), buf)?;
        }
        Value::Map(map) => {
            buf.push(tag::MAP);
            put_len(buf, "map", map.len())?;
            for (key, item) in map {
                put_len(buf, "map key", key.len())?;
                buf.extend_from_slice(key.as_bytes());
                put_prefixed(buf, item)?;
            }
        }
        Value::Object(map) => {
            buf.push(tag::OBJECT);
            serde_json::to_writer(&mut *buf, map)?;
        }
        Value::JsonArray(items) => {
            buf.push(tag::JSON_ARRAY);
            serde_json::to_writer(&mut *buf, items)?;
        }
        Value::RemoteError(err) => {
            buf.push(tag::REMOTE_ERROR);
            serde_json::to_writer(&mut *buf, err)?;
        }
    }
    Ok(())
}

/// Decodes exactly one value from `bytes`.
///
/// # Errors
///
/// Returns [`DecodeError`] if the tag is unknown, a fixed-width value has the
/// wrong length, a composite is truncated or followed by trailing bytes, or a
/// textual payload is not valid UTF-8 or JSON. Composites nested more than
/// [`MAX_NESTING`] levels deep are rejected as invalid.
pub fn decode(bytes: &[u8]) -> Result<Value, DecodeError> {
    decode_at(bytes, 0)
}

fn decode_at(bytes: &[u8], depth: usize) -> Result<Value, DecodeError> {
    let (&tag, body) = bytes.split_first().ok_or(DecodeError::Empty)?;
    match tag {
        tag::NULL => {
            fixed::<0>("null", body)?;
            Ok(Value::Null)
        }
        tag::BOOL => match fixed::<1>("bool", body)? {
            [0] => Ok(Value::Bool(false)),
            [1] => Ok(Value::Bool(true)),
            [other] => Err(DecodeError::invalid("bool", format!("byte {other:#04x}"))),
        },
        tag::BYTE => Ok(Value::Byte(fixed::<1>("byte", body)?[0])),
        tag::CHAR => {
            let unit = u16::from_be_bytes(fixed::<2>("char", body)?);
            char::from_u32(u32::from(unit))
                .map(Value::Char)
                .ok_or_else(|| DecodeError::invalid("char", format!("lone surrogate {unit:#06x}")))
        }
        tag::SHORT => Ok(Value::Short(i16::from_be_bytes(fixed("short", body)?))),
        tag::INT => Ok(Value::Int(i32::from_be_bytes(fixed("int", body)?))),
        tag::FLOAT => Ok(Value::Float(f32::from_bits(u32::from_be_bytes(fixed(
            "float", body,
        )?)))),
        tag::DOUBLE => Ok(Value::Double(f64::from_bits(u64::from_be_bytes(fixed(
            "double", body,
        )?)))),
        tag::LONG => Ok(Value::Long(i64::from_be_bytes(fixed("long", body)?))),
        tag::STRING => Ok(Value::String(String::from_utf8(body.to_vec())?)),
        tag::BYTES => Ok(Value::Bytes(body.to_vec())),
        tag::ARRAY => Ok(Value::Array(decode_sequence("array", body, depth + 1)?)),
        tag::LIST => Ok(Value::List(decode_sequence("list", body, depth + 1)?)),
        tag::SET => {
            let items = decode_sequence("set", body, depth + 1)?;
            let mut set = ValueSet::with_capacity(items.len());
            for item in items {
                if !set.insert(item) {
                    return Err(DecodeError::invalid("set", "duplicate members"));
                }
            }
            Ok(Value::Set(set))
        }
        tag::MAP => decode_map(body, depth + 1).map(Value::Map),
        tag::OBJECT => Ok(Value::Object(serde_json::from_slice(body)?)),
        tag::JSON_ARRAY => Ok(Value::JsonArray(serde_json::from_slice(body)?)),
        tag::REMOTE_ERROR => Ok(Value::RemoteError(serde_json::from_slice::<RemoteError>(
            body,
        )?)),
        unknown => Err(DecodeError::UnknownTag(unknown)),
    }
}

/// Writes a 32-bit big-endian length, failing if `len` does not fit.
pub(crate) fn put_len(buf: &mut Vec<u8>, what: &'static str, len: usize) -> Result<(), EncodeError> {
    let len = u32::try_from(len).map_err(|_| EncodeError::TooLarge { what, len })?;
    buf.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

/// Writes a value preceded by the 32-bit length of its encoding.
pub(crate) fn put_prefixed(buf: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    let start = buf.len();
    buf.extend_from_slice(&[0; 4]);
    encode_into(value, buf)?;
    let len = buf.len() - start - 4;
    let len = u32::try_from(len).map_err(|_| EncodeError::TooLarge { what: "value", len })?;
    buf[start..start + 4].copy_from_slice(&len.to_be_bytes());
    Ok(())
}

fn encode_sequence<'a>(
    items: impl Iterator<Item = &'a Value>,
    count: usize,
    buf: &mut Vec<u8>,
) -> Result<(), EncodeError> {
    put_len(buf, "collection", count)?;
    for item in items {
        put_prefixed(buf, item)?;
    }
    Ok(())
}

fn check_depth(what: &'static str, depth: usize) -> Result<(), DecodeError> {
    if depth > MAX_NESTING {
        return Err(DecodeError::invalid(what, "nesting too deep"));
    }
    Ok(())
}

fn decode_sequence(
    what: &'static str,
    body: &[u8],
    depth: usize,
) -> Result<Vec<Value>, DecodeError> {
    check_depth(what, depth)?;
    let mut reader = Reader::new(body);
    let count = reader.length(what)?;
    // Every element needs at least a length prefix and a tag.
    let mut items = Vec::with_capacity(count.min(reader.remaining() / 5));
    for _ in 0..count {
        items.push(reader.nested_value(what, depth)?);
    }
    reader.finish()?;
    Ok(items)
}

fn decode_map(body: &[u8], depth: usize) -> Result<BTreeMap<String, Value>, DecodeError> {
    check_depth("map", depth)?;
    let mut reader = Reader::new(body);
    let count = reader.length("map")?;
    let mut map = BTreeMap::new();
    for _ in 0..count {
        let key = reader.string("map key")?;
        let value = reader.nested_value("map value", depth)?;
        if map.insert(key, value).is_some() {
            return Err(DecodeError::invalid("map", "duplicate key"));
        }
    }
    reader.finish()?;
    Ok(map)
}

fn fixed<const N: usize>(what: &'static str, body: &[u8]) -> Result<[u8; N], DecodeError> {
    body.try_into().map_err(|_| DecodeError::LengthMismatch {
        what,
        expected: N + 1,
        actual: body.len() + 1,
    })
}

fn encoded_size_hint(value: &Value) -> usize {
    match value {
        Value::String(s) => s.len() + 1,
        Value::Bytes(b) => b.len() + 1,
        Value::Array(items) | Value::List(items) => 5 + items.len() * 9,
        _ => 16,
    }
}

/// A cursor over length-prefixed fields.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub(crate) fn take(&mut self, what: &'static str, n: usize) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::Truncated {
                what,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub(crate) fn u32(&mut self, what: &'static str) -> Result<u32, DecodeError> {
        let bytes = self.take(what, 4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn length(&mut self, what: &'static str) -> Result<usize, DecodeError> {
        let len = self.u32(what)?;
        usize::try_from(len).map_err(|_| DecodeError::invalid(what, "length overflows usize"))
    }

    /// Reads a length-prefixed encoded value.
    pub(crate) fn value(&mut self, what: &'static str) -> Result<Value, DecodeError> {
        self.nested_value(what, 0)
    }

    fn nested_value(&mut self, what: &'static str, depth: usize) -> Result<Value, DecodeError> {
        let len = self.length(what)?;
        decode_at(self.take(what, len)?, depth)
    }

    fn string(&mut self, what: &'static str) -> Result<String, DecodeError> {
        let len = self.length(what)?;
        Ok(String::from_utf8(self.take(what, len)?.to_vec())?)
    }

    pub(crate) fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: Value) {
        let bytes = encode(&value).unwrap();
        assert_eq!(decode(&bytes).unwrap(), value, "bytes: {bytes:02x?}");
    }

    #[test]
    fn test_primitive_layouts() {
        assert_eq!(encode(&Value::Null).unwrap(), vec![tag::NULL]);
        assert_eq!(encode(&Value::Bool(true)).unwrap(), vec![tag::BOOL, 1]);
        assert_eq!(encode(&Value::Short(-2)).unwrap(), vec![tag::SHORT, 0xff, 0xfe]);
        assert_eq!(encode(&Value::Char('A')).unwrap(), vec![tag::CHAR, 0, 0x41]);
        assert_eq!(
            encode(&Value::Long(1)).unwrap(),
            vec![tag::LONG, 0, 0, 0, 0, 0, 0, 0, 1]
        );
        assert_eq!(encode(&Value::from("hi")).unwrap(), vec![tag::STRING, b'h', b'i']);
    }

    #[test]
    fn test_primitive_roundtrips() {
        roundtrip(Value::Null);
        roundtrip(Value::Bool(false));
        roundtrip(Value::Byte(0xff));
        roundtrip(Value::Char('é'));
        roundtrip(Value::Short(i16::MIN));
        roundtrip(Value::Int(-42));
        roundtrip(Value::Float(1.5));
        roundtrip(Value::Double(-0.125));
        roundtrip(Value::Long(i64::MAX));
        roundtrip(Value::from(""));
        roundtrip(Value::from("héllo wörld"));
        roundtrip(Value::Bytes(vec![]));
        roundtrip(Value::Bytes(vec![0, 1, 2, 255]));
    }

    #[test]
    fn test_nested_composites() {
        let mut map = BTreeMap::new();
        map.insert("empty".to_string(), Value::List(vec![]));
        map.insert("nested".to_string(), Value::Array(vec![Value::Int(1), Value::from("x")]));
        let set: ValueSet = vec![Value::Long(1), Value::Bytes(vec![9]), Value::Null]
            .into_iter()
            .collect();

        roundtrip(Value::List(vec![
            Value::Map(map),
            Value::Set(set),
            Value::Array(vec![Value::List(vec![Value::Bool(true)])]),
        ]));
    }

    #[test]
    fn test_set_decodes_regardless_of_order() {
        let a: ValueSet = vec![Value::Int(1), Value::Int(2)].into_iter().collect();
        let b: ValueSet = vec![Value::Int(2), Value::Int(1)].into_iter().collect();
        assert_eq!(decode(&encode(&Value::Set(a)).unwrap()).unwrap(), Value::Set(b));
    }

    #[test]
    fn test_json_kinds() {
        let object = serde_json::json!({"name": "svc", "ports": [1, 2], "meta": {"on": true}});
        let serde_json::Value::Object(map) = object else {
            unreachable!()
        };
        roundtrip(Value::Object(map));
        roundtrip(Value::JsonArray(vec![serde_json::json!(1), serde_json::json!("two")]));
        roundtrip(Value::RemoteError(RemoteError::new("Boom", "it broke")));
    }

    #[test]
    fn test_non_bmp_char_is_rejected() {
        let err = encode(&Value::Char('🦀')).unwrap_err();
        assert!(matches!(err, EncodeError::Unsupported { kind: "char", .. }));
    }

    #[test]
    fn test_unknown_tag() {
        assert!(matches!(decode(&[0x7e, 1]), Err(DecodeError::UnknownTag(0x7e))));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(decode(&[]), Err(DecodeError::Empty)));
    }

    #[test]
    fn test_fixed_width_length_mismatch() {
        assert!(matches!(
            decode(&[tag::INT, 0, 0, 1]),
            Err(DecodeError::LengthMismatch { expected: 5, actual: 4, .. })
        ));
        assert!(matches!(
            decode(&[tag::NULL, 0]),
            Err(DecodeError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_bool_byte() {
        assert!(matches!(
            decode(&[tag::BOOL, 2]),
            Err(DecodeError::InvalidValue { kind: "bool", .. })
        ));
    }

    #[test]
    fn test_truncated_list() {
        let mut bytes = encode(&Value::List(vec![Value::Int(1), Value::Int(2)])).unwrap();
        bytes.truncate(bytes.len() - 2);
        assert!(matches!(decode(&bytes), Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_trailing_bytes_in_list() {
        let mut bytes = encode(&Value::List(vec![Value::Int(1)])).unwrap();
        bytes.push(0);
        assert!(matches!(decode(&bytes), Err(DecodeError::TrailingBytes(1))));
    }

    #[test]
    fn test_huge_count_does_not_preallocate() {
        let bytes = [tag::LIST, 0xff, 0xff, 0xff, 0xff];
        assert!(matches!(decode(&bytes), Err(DecodeError::Truncated { .. })));
    }

    fn nested_lists(levels: usize) -> Vec<u8> {
        // Level `n`, counted from the innermost null, encodes to 1 + 9n bytes.
        let mut bytes = Vec::with_capacity(1 + 9 * levels);
        for level in (1..=levels).rev() {
            bytes.push(tag::LIST);
            bytes.extend_from_slice(&1u32.to_be_bytes());
            bytes.extend_from_slice(&((1 + 9 * (level - 1)) as u32).to_be_bytes());
        }
        bytes.push(tag::NULL);
        bytes
    }

    #[test]
    fn test_nesting_at_limit_decodes() {
        let mut expected = Value::Null;
        for _ in 0..MAX_NESTING {
            expected = Value::List(vec![expected]);
        }
        assert_eq!(decode(&nested_lists(MAX_NESTING)).unwrap(), expected);
    }

    #[test]
    fn test_excessive_nesting_is_rejected() {
        assert!(matches!(
            decode(&nested_lists(MAX_NESTING + 1)),
            Err(DecodeError::InvalidValue { kind: "list", .. })
        ));
    }

    #[test]
    fn test_very_deep_nesting_does_not_overflow() {
        assert!(matches!(
            decode(&nested_lists(100_000)),
            Err(DecodeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_nested_map_counts_toward_depth() {
        let mut bytes = nested_lists(MAX_NESTING);
        let mut map = vec![tag::MAP];
        map.extend_from_slice(&1u32.to_be_bytes());
        map.extend_from_slice(&1u32.to_be_bytes());
        map.push(b'k');
        map.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        map.append(&mut bytes);
        assert!(matches!(
            decode(&map),
            Err(DecodeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_duplicate_set_members_are_rejected() {
        let mut bytes = vec![tag::SET];
        bytes.extend_from_slice(&2u32.to_be_bytes());
        for _ in 0..2 {
            bytes.extend_from_slice(&5u32.to_be_bytes());
            bytes.extend_from_slice(&[tag::INT, 0, 0, 0, 7]);
        }
        assert!(matches!(
            decode(&bytes),
            Err(DecodeError::InvalidValue { kind: "set", .. })
        ));
    }

    #[test]
    fn test_large_set_decodes_quickly() {
        let set: ValueSet = (0..60_000).map(Value::Int).collect();
        let bytes = encode(&Value::Set(set.clone())).unwrap();
        let started = std::time::Instant::now();
        assert_eq!(decode(&bytes).unwrap(), Value::Set(set));
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    #[test]
    fn test_invalid_utf8_string() {
        assert!(matches!(
            decode(&[tag::STRING, 0xc3, 0x28]),
            Err(DecodeError::Utf8 { .. })
        ));
    }

    #[test]
    fn test_malformed_json_object() {
        assert!(matches!(
            decode(&[tag::OBJECT, b'{']),
            Err(DecodeError::Json { .. })
        ));
    }

    #[test]
    fn test_nan_roundtrips() {
        roundtrip(Value::Double(f64::NAN));
        roundtrip(Value::Float(f32::NAN));
        roundtrip(Value::List(vec![Value::Double(f64::NAN)]));
    }
}

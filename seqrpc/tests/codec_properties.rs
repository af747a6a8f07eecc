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

//! Property tests for the value and message encodings.

use proptest::prelude::*;
use seqrpc::codec::{decode, encode, tag, DecodeError, RemoteError, Value, ValueSet};
use seqrpc::message::{CallMessage, Message, ReturnMessage, HEADER_SIZE};

fn json_scalar() -> impl Strategy<Value = serde_json::Value> {
    prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        "[ -~]{0,16}".prop_map(serde_json::Value::from),
    ]
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<u8>().prop_map(Value::Byte),
        prop::char::range('\u{0}', '\u{FFFF}').prop_map(Value::Char),
        any::<i16>().prop_map(Value::Short),
        any::<i32>().prop_map(Value::Int),
        (-1.0e6f32..1.0e6f32).prop_map(Value::Float),
        (-1.0e12f64..1.0e12f64).prop_map(Value::Double),
        any::<i64>().prop_map(Value::Long),
        ".{0,24}".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(Value::Bytes),
        prop::collection::btree_map("[a-z]{1,8}", json_scalar(), 0..5)
            .prop_map(|fields| Value::Object(fields.into_iter().collect())),
        prop::collection::vec(json_scalar(), 0..5).prop_map(Value::JsonArray),
        ("[A-Z][A-Za-z]{0,15}", ".{0,24}")
            .prop_map(|(class, message)| Value::RemoteError(RemoteError::new(class, message))),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::List),
            prop::collection::vec(inner.clone(), 0..6)
                .prop_map(|items| Value::Set(items.into_iter().collect::<ValueSet>())),
            prop::collection::btree_map(".{0,8}", inner, 0..6).prop_map(Value::Map),
        ]
    })
}

const TAGS: [u8; 18] = [
    tag::NULL,
    tag::BOOL,
    tag::BYTE,
    tag::CHAR,
    tag::SHORT,
    tag::INT,
    tag::FLOAT,
    tag::DOUBLE,
    tag::LONG,
    tag::STRING,
    tag::ARRAY,
    tag::LIST,
    tag::OBJECT,
    tag::JSON_ARRAY,
    tag::REMOTE_ERROR,
    tag::BYTES,
    tag::SET,
    tag::MAP,
];

proptest! {
    #[test]
    fn values_survive_encoding(value in value()) {
        let bytes = encode(&value).unwrap();
        prop_assert_eq!(decode(&bytes).unwrap(), value);
    }

    #[test]
    fn calls_survive_encoding(
        sequence in 1..u64::MAX,
        timestamp in any::<i64>(),
        target in "[a-z]{1,12}",
        method in "[a-zA-Z_]{1,12}",
        args in prop::collection::vec(value(), 0..4),
    ) {
        let message: Message =
            CallMessage::from_parts(sequence, timestamp, target, method, args).into();
        let bytes = message.encode().unwrap();
        prop_assert_eq!(
            u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize,
            bytes.len() - HEADER_SIZE
        );
        prop_assert_eq!(Message::decode(&bytes).unwrap(), message);
    }

    #[test]
    fn returns_survive_encoding(
        sequence in 1..u64::MAX,
        timestamp in any::<i64>(),
        result in value(),
    ) {
        let message: Message = ReturnMessage::from_parts(sequence, timestamp, result).into();
        prop_assert_eq!(Message::decode(&message.encode().unwrap()).unwrap(), message);
    }

    #[test]
    fn unknown_tags_are_rejected(
        first in any::<u8>().prop_filter("not a tag", |b| !TAGS.contains(b)),
        rest in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let mut bytes = vec![first];
        bytes.extend(rest);
        prop_assert!(matches!(decode(&bytes), Err(DecodeError::UnknownTag(b)) if b == first));
    }

    #[test]
    fn messages_with_wrong_length_are_rejected(
        result in value(),
        extra in 1usize..8,
    ) {
        let message: Message = ReturnMessage::from_parts(1, 0, result).into();
        let mut bytes = message.encode().unwrap();
        bytes.extend(std::iter::repeat(0).take(extra));
        prop_assert!(Message::decode(&bytes).is_err());
    }
}

#[test]
fn test_set_equality_ignores_order() {
    let forward: ValueSet = [Value::Int(1), Value::Int(2), Value::Int(3)].into_iter().collect();
    let backward: ValueSet = [Value::Int(3), Value::Int(2), Value::Int(1)].into_iter().collect();
    assert_eq!(
        decode(&encode(&Value::Set(forward)).unwrap()).unwrap(),
        Value::Set(backward)
    );
}

#[test]
fn test_void_sentinel_is_a_plain_string() {
    let bytes = encode(&Value::void()).unwrap();
    assert_eq!(bytes[0], tag::STRING);
    assert_eq!(&bytes[1..], b"void");
    assert!(decode(&bytes).unwrap().is_void());
}

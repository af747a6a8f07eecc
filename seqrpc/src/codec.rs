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

//! Wire codec for the value universe.
//!
//! This module defines [`Value`], the closed set of kinds that can travel as
//! call arguments or results, and the tagged binary format used to encode
//! them. Message envelopes built on top of this live in
//! [`message`](crate::message).
//!
//! # Format
//!
//! Each value is one tag byte followed by a kind specific layout. See
//! [`tag`] for the tag assignments.
//!
//! ```rust
//! use seqrpc::codec::{decode, encode, Value};
//!
//! let value = Value::List(vec![Value::from("svc"), Value::Long(7)]);
//! let bytes = encode(&value)?;
//! assert_eq!(decode(&bytes)?, value);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod remote;
mod sequence;
mod value;
mod wire;

pub use self::error::{DecodeError, EncodeError};
pub use self::remote::RemoteError;
pub use self::sequence::SequenceGenerator;
pub use self::value::{Value, ValueSet, VOID};
pub use self::wire::{decode, encode, encode_into, tag, MAX_NESTING};

pub(crate) use self::wire::{put_len, put_prefixed, Reader};

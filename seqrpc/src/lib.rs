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

#![doc = include_str!("../../README.md")]
#![allow(clippy::module_inception)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

//! ## Modules
//!
//! - **[`codec`]**: tagged binary encoding of [`Value`]s and sequence numbering
//! - **[`message`]**: call and return messages and their 21 byte framing
//! - **[`tracker`]**: per-call state and the blocking queues between tasks
//! - **[`router`]**: the engine that pushes, sends, dispatches and times out calls
//! - **[`transport`]**: the [`Transport`] trait with TCP and in-memory implementations
//! - **[`observability`]**: counters and structured error logging
//! - **[`error`]**: the crate-wide [`RpcError`]

pub mod codec;
pub mod error;
pub mod message;
pub mod observability;
pub mod router;
pub mod tracker;
pub mod transport;

pub use codec::{RemoteError, SequenceGenerator, Value};
pub use error::RpcError;
pub use message::{CallMessage, Message, ReturnMessage};
pub use observability::log_error;
pub use router::{CallError, Router, RouterConfig, TargetObject};
pub use transport::{MemoryTransport, TcpTransport, Transport, TransportError};

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

//! Message transports.
//!
//! A [`Transport`] moves whole [`Message`](crate::message::Message)s between
//! two peers. The router owns one transport and drives it from two tasks, one
//! receiving and one sending, so implementations must allow `send` and `recv`
//! to run concurrently.
//!
//! - [`TcpTransport`]: framed TCP with optional reconnection
//! - [`MemoryTransport`]: in-process loopback or connected pairs
//!
//! # Errors
//!
//! [`TransportError::is_protocol_error`] separates errors that only spoil a
//! single message from errors that leave the connection unusable.
//!
//! # Examples
//!
//! ```rust
//! use seqrpc::message::{CallMessage, Message};
//! use seqrpc::transport::{MemoryTransport, Transport};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (left, right) = MemoryTransport::pair();
//! let call: Message = CallMessage::from_parts(1, 0, "clock", "now", vec![]).into();
//!
//! left.send(&call).await?;
//! assert_eq!(right.recv().await?, call);

//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod memory;
pub mod strategy;
mod tcp;
mod traits;
mod types;

pub use self::config::TcpTransportConfig;
pub use self::error::TransportError;
pub use self::memory::MemoryTransport;
pub use self::tcp::TcpTransport;
pub use self::traits::Transport;
pub use self::types::{TransportId, TransportMetadata};

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

//! The router's background tasks.

use super::{DispatchError, Shared};
use crate::codec::{RemoteError, Value};
use crate::message::{CallMessage, Message, ReturnMessage};
use crate::tracker::CallRecord;
use crate::transport::TransportError;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

/// Reads messages until cancelled or the transport fails.
pub(super) async fn receive(shared: Arc<Shared>, cancel: CancellationToken) {
    debug!("receive loop started");
    loop {
        let received = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            received = shared.transport.recv() => received,
        };
        match received {
            Ok(Message::Call(call)) => {
                trace!(
                    sequence = call.sequence(),
                    target = call.target(),
                    method = call.method(),
                    "call received"
                );
                let record = Arc::new(CallRecord::new(call));
                shared.in_wait.insert(record.clone());
                shared.inbound.offer(record);
            }
            Ok(Message::Return(reply)) => match_return(&shared, reply).await,
            Err(error) if error.is_protocol_error() => {
                warn!(%error, "dropping undecodable message");
                shared.metrics.record_protocol_error();
            }
            Err(error) => {
                if cancel.is_cancelled() {
                    break;
                }
                if shared.teardown(&error).await {
                    shared.notify_failure(&error);
                }
                break;
            }
        }
    }
    debug!("receive loop stopped");
}

async fn match_return(shared: &Shared, reply: ReturnMessage) {
    let sequence = reply.sequence();
    let record = match shared.out_wait.get(sequence) {
        Some(record) => Some(record),
        None => {
            tokio::time::sleep(shared.config.return_match_retry).await;
            shared.out_wait.get(sequence)
        }
    };
    let Some(record) = record else {
        warn!(sequence, "return matches no outbound call");
        shared.metrics.record_return_unmatched();
        return;
    };
    if record.set_returned(reply.into_result().unwrap_or_else(Value::RemoteError)) {
        debug!(sequence, "return matched");
        shared.metrics.record_return_matched();
    } else {
        debug!(sequence, status = ?record.status(), "discarding late return");
        shared.metrics.record_late_return();
    }
}

/// Sends pushed calls in order until cancelled or the transport fails.
pub(super) async fn transmit(shared: Arc<Shared>, cancel: CancellationToken) {
    debug!("transmit loop started");
    loop {
        let record = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            record = shared.outbound.poll() => record,
        };
        if !record.set_pending() {
            trace!(sequence = record.sequence(), "skipping call resolved while queued");
            continue;
        }

        let message = Message::Call(record.call().clone());
        match shared.transport.send(&message).await {
            Ok(()) => {
                debug!(sequence = record.sequence(), "call sent");
                shared.metrics.record_sent();
            }
            Err(error) if error.is_protocol_error() => {
                warn!(sequence = record.sequence(), %error, "call could not be encoded");
                shared.metrics.record_protocol_error();
                record.set_returned(Value::RemoteError(RemoteError::new(
                    "EncodeError",
                    error.to_string(),
                )));
            }
            Err(error) => {
                error!(sequence = record.sequence(), %error, "call transmission failed");
                shared.outbound.put_back(record);
                shared.teardown(&error).await;
                break;
            }
        }
    }
    debug!("transmit loop stopped");
}

/// Executes inbound calls one at a time until cancelled or a reply cannot
/// be sent. A call already executing when the router stops runs to
/// completion and is answered before the loop exits.
pub(super) async fn dispatch(shared: Arc<Shared>, cancel: CancellationToken) {
    debug!("dispatch loop started");
    loop {
        let record = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            record = shared.inbound.poll() => record,
        };
        record.set_pending();
        let call = record.call();

        let result = match shared.registry.resolve(call.target(), call.method()) {
            Ok(method) => {
                // Not raced against `cancel`: a call that started executing
                // is answered even if the router is stopping.
                match tokio::spawn(method.invoke(call.args().to_vec())).await {
                    Ok(result) => result.map_err(DispatchError::Execution),
                    Err(join) => Err(DispatchError::Execution(RemoteError::new(
                        "Panic",
                        panic_message(join),
                    ))),
                }
            }
            Err(error) => Err(error),
        };

        shared.metrics.record_dispatched(result.is_err());
        let value = result.unwrap_or_else(|error| {
            debug!(
                sequence = call.sequence(),
                target = call.target(),
                method = call.method(),
                %error,
                "inbound call failed"
            );
            Value::RemoteError(error.into_remote_error())
        });

        match reply(&shared, call, value.clone()).await {
            Ok(()) => {
                record.set_returned(value);
                shared.in_wait.remove(call.sequence());
                trace!(sequence = call.sequence(), "reply sent");
            }
            Err(error) => {
                error!(sequence = call.sequence(), %error, "reply transmission failed");
                shared.teardown(&error).await;
                break;
            }
        }
    }
    debug!("dispatch loop stopped");
}

/// Sends the return for `call`, substituting an encode error if `value`
/// itself cannot be encoded.
async fn reply(shared: &Shared, call: &CallMessage, value: Value) -> Result<(), TransportError> {
    let message = Message::Return(ReturnMessage::answering(call, value));
    match shared.transport.send(&message).await {
        Err(error) if error.is_protocol_error() => {
            warn!(sequence = call.sequence(), %error, "result could not be encoded");
            shared.metrics.record_protocol_error();
            let fallback = RemoteError::new("EncodeError", error.to_string());
            let message =
                Message::Return(ReturnMessage::answering(call, Value::RemoteError(fallback)));
            match shared.transport.send(&message).await {
                Err(error) if error.is_protocol_error() => {
                    warn!(sequence = call.sequence(), %error, "dropping unencodable reply");
                    Ok(())
                }
                other => other,
            }
        }
        other => other,
    }
}

fn panic_message(error: tokio::task::JoinError) -> String {
    if error.is_cancelled() {
        return "handler task was cancelled".to_string();
    }
    let payload: Box<dyn Any + Send> = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

/// Periodically times out stale outbound calls and evicts void returns
/// nobody collected.
pub(super) async fn sweep(shared: Arc<Shared>, cancel: CancellationToken) {
    let period = shared.config.sweep_interval.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!(interval = ?period, "sweep loop started");
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let timeout = shared.call_timeout();
        let retention = timeout.saturating_mul(shared.config.void_retention_factor);
        for sequence in shared.out_wait.keys() {
            let Some(record) = shared.out_wait.get(sequence) else {
                continue;
            };
            if record.is_void_return() {
                if record.age() > retention {
                    shared.out_wait.remove(sequence);
                    shared.metrics.record_void_eviction();
                    debug!(sequence, "evicted uncollected void return");
                }
            } else if !record.status().is_terminal()
                && record.age() > timeout
                && record.set_timed_out()
            {
                shared.metrics.record_timeout();
                debug!(sequence, "call timed out");
            }
        }
    }
    debug!("sweep loop stopped");
}

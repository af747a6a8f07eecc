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

//! Blocking FIFO hand-off between router loops.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Notify;

/// An unbounded, thread-safe FIFO whose consumers can wait for items.
///
/// Producers [`offer`](Self::offer) without ever blocking; consumers either
/// [`poll`](Self::poll) until something arrives, wait a bounded time with
/// [`get`](Self::get), or check with [`try_get`](Self::try_get). An item that
/// failed to be processed can be returned to the head with
/// [`put_back`](Self::put_back) so ordering is preserved.
///
/// Waiting consumers register for a wakeup before they look at the list, so
/// an item offered concurrently with a `poll` is never stranded.
///
/// # Examples
///
/// ```rust
/// use seqrpc::tracker::CallQueue;
///
/// # async fn example() {
/// let queue = CallQueue::new();
/// queue.offer(1);
/// queue.offer(2);
/// queue.put_back(0);
///
/// assert_eq!(queue.poll().await, 0);
/// assert_eq!(queue.try_get(), Some(1));
/// assert_eq!(queue.len(), 1);
/// # }
/// ```
#[derive(Debug)]
pub struct CallQueue<T> {
    items: Mutex<VecDeque<T>>,
    available: Notify,
}

impl<T> CallQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Notify::new(),
        }
    }

    /// Appends an item and wakes one waiting consumer.
    pub fn offer(&self, item: T) {
        self.items.lock().push_back(item);
        self.available.notify_one();
    }

    /// Reinserts an item at the head of the queue and wakes one consumer.
    pub fn put_back(&self, item: T) {
        self.items.lock().push_front(item);
        self.available.notify_one();
    }

    /// Removes the head item if there is one, without waiting.
    pub fn try_get(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    /// Waits as long as it takes for an item.
    ///
    /// Cancel safe: if the returned future is dropped, no item is lost.
    pub async fn poll(&self) -> T {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(item) = self.try_get() {
                return item;
            }
            notified.await;
        }
    }

    /// Waits up to `timeout` for an item, returning `None` on expiry.
    pub async fn get(&self, timeout: Duration) -> Option<T> {
        tokio::time::timeout(timeout, self.poll()).await.ok()
    }

    /// Discards every queued item.
    pub fn clear(&self) {
        self.items.lock().clear();
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl<T: Clone> CallQueue<T> {
    /// Returns a copy of the head item without removing it.
    pub fn peek(&self) -> Option<T> {
        self.items.lock().front().cloned()
    }
}

impl<T> Default for CallQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

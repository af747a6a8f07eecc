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

//! Correlation tables.

use crate::tracker::CallRecord;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Outcome of [`CallTable::take_terminal`].
#[derive(Debug)]
pub(crate) enum Taken {
    Record(Arc<CallRecord>),
    Pending,
    Missing,
}

/// Call records keyed by sequence number.
///
/// Each operation takes the lock once; callers never hold it across an
/// `await` or while touching another table.
#[derive(Debug, Default)]
pub(crate) struct CallTable {
    records: Mutex<HashMap<u64, Arc<CallRecord>>>,
}

impl CallTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, record: Arc<CallRecord>) {
        self.records.lock().insert(record.sequence(), record);
    }

    pub(crate) fn get(&self, sequence: u64) -> Option<Arc<CallRecord>> {
        self.records.lock().get(&sequence).cloned()
    }

    pub(crate) fn remove(&self, sequence: u64) -> Option<Arc<CallRecord>> {
        self.records.lock().remove(&sequence)
    }

    /// Removes the record only if it has reached a terminal state.
    ///
    /// The check and the removal happen under one lock, so a pending record
    /// is never briefly absent.
    pub(crate) fn take_terminal(&self, sequence: u64) -> Taken {
        let mut records = self.records.lock();
        match records.get(&sequence) {
            None => Taken::Missing,
            Some(record) if !record.status().is_terminal() => Taken::Pending,
            Some(_) => records.remove(&sequence).map_or(Taken::Missing, Taken::Record),
        }
    }

    pub(crate) fn contains(&self, sequence: u64) -> bool {
        self.records.lock().contains_key(&sequence)
    }

    pub(crate) fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub(crate) fn keys(&self) -> Vec<u64> {
        self.records.lock().keys().copied().collect()
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<CallRecord>> {
        self.records.lock().values().cloned().collect()
    }

    pub(crate) fn clear(&self) {
        self.records.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Value;
    use crate::message::CallMessage;

    fn record(sequence: u64) -> Arc<CallRecord> {
        Arc::new(CallRecord::new(CallMessage::from_parts(
            sequence,
            0,
            "svc",
            "m",
            vec![],
        )))
    }

    #[test]
    fn test_take_terminal_leaves_pending_records() {
        let table = CallTable::new();
        let pending = record(1);
        pending.set_pending();
        table.insert(pending.clone());

        assert!(matches!(table.take_terminal(1), Taken::Pending));
        assert!(table.contains(1));

        pending.set_returned(Value::Int(1));
        assert!(matches!(table.take_terminal(1), Taken::Record(r) if r.sequence() == 1));
        assert!(!table.contains(1));
        assert!(matches!(table.take_terminal(1), Taken::Missing));
    }

    #[test]
    fn test_keys_and_clear() {
        let table = CallTable::new();
        table.insert(record(1));
        table.insert(record(2));
        let mut keys = table.keys();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 2]);
        assert_eq!(table.snapshot().len(), 2);

        assert!(table.remove(1).is_some());
        assert!(table.get(1).is_none());
        table.clear();
        assert_eq!(table.len(), 0);
    }
}

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

//! Sequence numbers correlating returns with the calls they answer.

use std::sync::atomic::{AtomicU64, Ordering};

/// Issues strictly increasing message sequence numbers.
///
/// A router owns one generator and stamps every call it creates with the
/// next number; the peer echoes it back in the return. Numbers start at 1
/// because 0 marks a return that answers no known call.
///
/// Generators are injected rather than global so independent routers (and
/// tests) never share a counter.
///
/// # Example
///
/// ```rust
/// use seqrpc::codec::SequenceGenerator;
///
/// let sequences = SequenceGenerator::new();
/// let first = sequences.next();
/// let second = sequences.next();
/// assert_eq!(first, 1);
/// assert!(second > first);
/// ```
#[derive(Debug)]
pub struct SequenceGenerator {
    next: AtomicU64,
}

impl SequenceGenerator {
    /// The sequence carried by a return that answers no call.
    pub const ORPHAN: u64 = 0;

    /// Creates a generator whose first number is 1.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Creates a generator whose first number is `first`.
    ///
    /// Used when a process resumes numbering after a restart and must not
    /// reissue numbers a peer may still hold. `first` is clamped to at least 1.
    #[must_use]
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first.max(1)),
        }
    }

    /// Takes the next sequence number.
    ///
    /// A single atomic increment orders all callers, so numbers are unique
    /// and handed out in strictly increasing order.
    #[must_use]
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// Returns the number the next call to [`next`](Self::next) will issue.
    #[must_use]
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_starts_at_one() {
        let sequences = SequenceGenerator::new();
        assert_eq!(sequences.peek(), 1);
        assert_eq!(sequences.next(), 1);
        assert_eq!(sequences.peek(), 2);
    }

    #[test]
    fn test_starting_at_never_issues_orphan() {
        let sequences = SequenceGenerator::starting_at(SequenceGenerator::ORPHAN);
        assert_eq!(sequences.next(), 1);

        let resumed = SequenceGenerator::starting_at(500);
        assert_eq!(resumed.next(), 500);
        assert_eq!(resumed.next(), 501);
    }

    #[test]
    fn test_independent_generators() {
        let a = SequenceGenerator::new();
        let b = SequenceGenerator::new();
        let _ = a.next();
        let _ = a.next();
        assert_eq!(b.next(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_numbers_unique_and_increasing_per_task() {
        let sequences = Arc::new(SequenceGenerator::new());
        let mut handles = vec![];

        for _ in 0..8 {
            let sequences = sequences.clone();
            handles.push(tokio::spawn(async move {
                (0..250).map(|_| sequences.next()).collect::<Vec<_>>()
            }));
        }

        let mut all = std::collections::HashSet::new();
        for handle in handles {
            let issued = handle.await.unwrap();
            assert!(issued.windows(2).all(|w| w[0] < w[1]));
            for sequence in issued {
                assert!(all.insert(sequence), "sequence {sequence} issued twice");
            }
        }
        assert_eq!(all.len(), 2000);
    }
}

//! # Timed Buffers
//!
//! Bounded, timestamp-ordered history used for server snapshots, locally
//! predicted snapshots and input history.
//!
//! Network data arrives in any order. The buffer, not the transport,
//! enforces the sorted view: every push lands at its timestamp position,
//! and when full the oldest entry is dropped.
//!
//! ```text
//! push(t=30)   [10, 20, 40]  →  [10, 20, 30, 40]
//! bracket(25)  → (20, 30)
//! prune(20)    → [20, 30, 40]
//! ```

use std::collections::VecDeque;

use arena_shared::Millis;

/// Anything stamped with a time.
pub trait Timed {
    /// Timestamp of the entry.
    fn time(&self) -> Millis;
}

/// Sorted ring of timestamped entries.
#[derive(Clone, Debug)]
pub struct TimedBuffer<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T: Timed> TimedBuffer<T> {
    /// Creates an empty buffer holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of retained entries.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of buffered entries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is buffered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts `entry` at its timestamp position.
    ///
    /// Entries with equal timestamps keep arrival order.
    pub fn push(&mut self, entry: T) {
        let time = entry.time();
        let at = self
            .entries
            .iter()
            .rposition(|e| e.time() <= time)
            .map_or(0, |i| i + 1);
        self.entries.insert(at, entry);

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Finds the latest adjacent pair with `last.time <= time <= next.time`.
    #[must_use]
    pub fn bracket(&self, time: Millis) -> Option<(&T, &T)> {
        self.entries
            .iter()
            .zip(self.entries.iter().skip(1))
            .filter(|(last, next)| last.time() <= time && time <= next.time())
            .last()
    }

    /// Entry whose timestamp is nearest to `time`. Ties favour the older one.
    #[must_use]
    pub fn closest(&self, time: Millis) -> Option<&T> {
        self.entries
            .iter()
            .min_by_key(|e| e.time().abs_diff(time))
    }

    /// Most recent entry.
    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.entries.back()
    }

    /// Oldest entry.
    #[must_use]
    pub fn oldest(&self) -> Option<&T> {
        self.entries.front()
    }

    /// Drops every entry strictly older than `time`.
    pub fn prune_before(&mut self, time: Millis) {
        while self.entries.front().is_some_and(|e| e.time() < time) {
            self.entries.pop_front();
        }
    }

    /// Drops every entry at or before `time`.
    pub fn prune_through(&mut self, time: Millis) {
        while self.entries.front().is_some_and(|e| e.time() <= time) {
            self.entries.pop_front();
        }
    }

    /// Entries strictly newer than `time`, oldest first.
    pub fn newer_than(&self, time: Millis) -> impl Iterator<Item = &T> {
        self.entries.iter().filter(move |e| e.time() > time)
    }

    /// All entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

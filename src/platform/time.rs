//! Virtual-time scheduler
//!
//! Timers are entries in a min-heap keyed by virtual epoch-ms. The host drives
//! time forward by polling with its tick's `now`; nothing here reads a clock.
//! Cancelled entries stay in the heap and are skipped when they surface.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Handle for a scheduled entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    /// (due, id), earliest first; ties fire in scheduling order
    queue: BinaryHeap<Reverse<(u64, u64)>>,
    tasks: HashMap<u64, T>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            queue: BinaryHeap::new(),
            tasks: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` to fire once virtual time reaches `due`
    pub fn schedule(&mut self, due: u64, task: T) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push(Reverse((due, id)));
        self.tasks.insert(id, task);
        TimerId(id)
    }

    /// Cancel a pending entry, returning its task if it had not fired
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        self.tasks.remove(&id.0)
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.tasks.contains_key(&id.0)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Due time of the earliest live entry
    pub fn next_due(&mut self) -> Option<u64> {
        self.discard_cancelled();
        self.queue.peek().map(|Reverse((due, _))| *due)
    }

    /// Pop the earliest entry whose due time is at or before `now`
    pub fn pop_due(&mut self, now: u64) -> Option<(TimerId, T)> {
        self.discard_cancelled();
        let Reverse((due, id)) = *self.queue.peek()?;
        if due > now {
            return None;
        }
        self.queue.pop();
        self.tasks.remove(&id).map(|task| (TimerId(id), task))
    }

    /// Pop every entry due at or before `now`, earliest first
    pub fn drain_due(&mut self, now: u64) -> Vec<(TimerId, T)> {
        let mut fired = Vec::new();
        while let Some(entry) = self.pop_due(now) {
            fired.push(entry);
        }
        fired
    }

    fn discard_cancelled(&mut self) {
        while let Some(Reverse((_, id))) = self.queue.peek() {
            if self.tasks.contains_key(id) {
                break;
            }
            self.queue.pop();
        }
    }
}

use std::collections::VecDeque;

use super::state::Pid;
use crate::error::QueueError;

/// Fixed-capacity FIFO of process ids.
///
/// Backed by a `VecDeque` that is never allowed to grow past `capacity`:
/// an enqueue on a full queue is refused rather than reallocating.
#[derive(Debug, Clone)]
pub struct BoundedQueue {
    items: VecDeque<Pid>,
    capacity: usize,
}

impl BoundedQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn enqueue(&mut self, pid: Pid) -> Result<(), QueueError> {
        if self.is_full() {
            return Err(QueueError::Full {
                capacity: self.capacity,
            });
        }
        self.items.push_back(pid);
        Ok(())
    }

    /// Removes and returns the oldest id, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<Pid> {
        self.items.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.items.contains(&pid)
    }

    /// Front-to-back view of the queued ids.
    pub fn iter(&self) -> impl Iterator<Item = Pid> + '_ {
        self.items.iter().copied()
    }
}

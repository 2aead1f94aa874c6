//! Next-turn queue for deferred tasks and notifications.
//!
//! Work posted here is delivered on the following turn of the event loop, in
//! FIFO order. Every entry carries a sequence number so a turn only drains what
//! was queued before it started; anything posted while a turn is running waits
//! for the next one.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::new_key_type;

use crate::event::LoopEvent;

/// A unique identifier for a deferred task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Get the raw u64 value of this task ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

new_key_type! {
    /// Identifies a registered [`Notifier`](crate::Notifier).
    pub struct NotifierId;
}

/// Global counter for generating unique task IDs.
static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
}

#[derive(Debug)]
struct QueuedEvent {
    sequence: u64,
    event: LoopEvent,
}

/// FIFO queue of next-turn events.
#[derive(Debug, Default)]
pub struct TaskQueue {
    queue: VecDeque<QueuedEvent>,
    next_sequence: u64,
}

impl TaskQueue {
    /// Create a new, empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a deferred task and return its ID.
    pub fn post(&mut self) -> TaskId {
        let id = next_task_id();
        self.push(LoopEvent::Deferred { id });
        id
    }

    /// Queue a notification from a registered notifier.
    pub fn post_notification(&mut self, id: NotifierId) {
        self.push(LoopEvent::Notified { id });
    }

    fn push(&mut self, event: LoopEvent) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.queue.push_back(QueuedEvent { sequence, event });
    }

    /// Cancel a pending task.
    ///
    /// Returns `true` if the task was found and cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.queue.len();
        self.queue
            .retain(|queued| queued.event != LoopEvent::Deferred { id });
        self.queue.len() != before
    }

    /// Drop every pending notification from `id`.
    pub fn purge_notifications(&mut self, id: NotifierId) -> usize {
        let before = self.queue.len();
        self.queue
            .retain(|queued| queued.event != LoopEvent::Notified { id });
        before - self.queue.len()
    }

    /// Check if a task is still waiting to be delivered.
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.queue
            .iter()
            .any(|queued| queued.event == LoopEvent::Deferred { id })
    }

    /// Check if there are any pending entries.
    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Get the number of pending entries.
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// The sequence number the next posted entry will receive.
    ///
    /// A turn captures this before it starts and only drains entries below it.
    pub fn turn_boundary(&self) -> u64 {
        self.next_sequence
    }

    /// Pop the oldest entry if it was queued before `boundary`.
    pub fn pop_before(&mut self, boundary: u64) -> Option<LoopEvent> {
        if self.queue.front()?.sequence < boundary {
            self.queue.pop_front().map(|queued| queued.event)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_within_turn() {
        let mut queue = TaskQueue::new();
        let first = queue.post();
        let second = queue.post();

        let boundary = queue.turn_boundary();
        assert_eq!(
            queue.pop_before(boundary),
            Some(LoopEvent::Deferred { id: first })
        );
        assert_eq!(
            queue.pop_before(boundary),
            Some(LoopEvent::Deferred { id: second })
        );
        assert_eq!(queue.pop_before(boundary), None);
    }

    #[test]
    fn test_posted_during_turn_waits() {
        let mut queue = TaskQueue::new();
        queue.post();
        let boundary = queue.turn_boundary();

        assert!(queue.pop_before(boundary).is_some());
        let late = queue.post();
        assert_eq!(queue.pop_before(boundary), None);
        assert!(queue.is_pending(late));
    }

    #[test]
    fn test_cancel() {
        let mut queue = TaskQueue::new();
        let id = queue.post();
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert!(!queue.has_pending());
    }
}

//! Timer bookkeeping for the event loop.
//!
//! Timers do not own callbacks. When a timer expires the loop delivers a
//! [`LoopEvent::Timer`](crate::LoopEvent::Timer) carrying its [`TimerId`], and
//! the owner matches the ID against the timers it started. Time is always
//! passed in explicitly so the same manager drives both the system clock and
//! the virtual clock used in tests.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use slotmap::{SlotMap, new_key_type};

use crate::error::{LoopError, Result};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a timer.
    pub struct TimerId;
}

/// Shortest interval accepted for repeating timers.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug)]
struct TimerData {
    next_fire: Instant,
    interval: Duration,
}

/// An entry in the timer queue (min-heap by fire time).
#[derive(Debug, Clone, Copy)]
struct TimerQueueEntry {
    id: TimerId,
    fire_time: Instant,
}

impl PartialEq for TimerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time
    }
}

impl Eq for TimerQueueEntry {}

impl PartialOrd for TimerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other.fire_time.cmp(&self.fire_time)
    }
}

/// Manages all timers of one event loop.
#[derive(Debug, Default)]
pub struct TimerManager {
    timers: SlotMap<TimerId, TimerData>,
    queue: BinaryHeap<TimerQueueEntry>,
}

impl TimerManager {
    /// Create a new timer manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a repeating timer. The first fire occurs one `interval` after `now`.
    ///
    /// The timer keeps firing until it is stopped.
    pub fn start_repeating(&mut self, interval: Duration, now: Instant) -> TimerId {
        let interval = interval.max(MIN_INTERVAL);
        let next_fire = now + interval;
        let id = self.timers.insert(TimerData {
            next_fire,
            interval,
        });
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: next_fire,
        });
        id
    }

    /// Stop and remove a timer.
    pub fn stop(&mut self, id: TimerId) -> Result<()> {
        self.timers
            .remove(id)
            .map(|_| ())
            .ok_or(LoopError::InvalidTimerId)
    }

    /// Check if a timer is currently active.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Get the number of active timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// The instant at which the next active timer fires, if any.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.discard_stale();
        self.queue.peek().map(|entry| entry.fire_time)
    }

    /// Pop the earliest timer that is due at `now`.
    ///
    /// The timer is rescheduled one interval after its scheduled fire time.
    /// Returns `None` when nothing is due.
    pub fn pop_expired(&mut self, now: Instant) -> Option<TimerId> {
        self.discard_stale();
        let entry = *self.queue.peek()?;
        if entry.fire_time > now {
            return None;
        }
        self.queue.pop();

        let id = entry.id;
        let timer = self.timers.get_mut(id)?;
        timer.next_fire = entry.fire_time + timer.interval;
        self.queue.push(TimerQueueEntry {
            id,
            fire_time: timer.next_fire,
        });

        tracing::trace!(target: targets::TIMER, ?id, "timer fired");
        Some(id)
    }

    /// Drop queue entries whose timer was stopped or rescheduled.
    fn discard_stale(&mut self) {
        while let Some(entry) = self.queue.peek() {
            let live = self
                .timers
                .get(entry.id)
                .is_some_and(|t| t.next_fire == entry.fire_time);
            if live {
                break;
            }
            self.queue.pop();
        }
    }
}

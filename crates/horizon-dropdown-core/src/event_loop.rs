//! The single-threaded event loop that drives widget timing.
//!
//! [`EventLoop`] is a cheap, cloneable handle. Widgets keep a clone to start
//! timers, post next-turn tasks and create notifiers; the host drives the loop
//! and routes every [`LoopEvent`] it hands out back to the widgets.
//!
//! # Example
//!
//! ```
//! use horizon_dropdown_core::{EventLoop, LoopEvent};
//! use std::time::Duration;
//!
//! let event_loop = EventLoop::with_manual_clock();
//! let poll = event_loop.start_repeating_timer(Duration::from_millis(50));
//! let task = event_loop.post_task();
//!
//! let mut seen = Vec::new();
//! event_loop
//!     .advance(Duration::from_millis(120), |event| seen.push(event))
//!     .unwrap();
//!
//! assert_eq!(
//!     seen,
//!     vec![
//!         LoopEvent::Deferred { id: task },
//!         LoopEvent::Timer { id: poll },
//!         LoopEvent::Timer { id: poll },
//!     ]
//! );
//! ```

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use slotmap::SlotMap;

use crate::error::{LoopError, Result};
use crate::event::LoopEvent;
use crate::logging::targets;
use crate::task::{NotifierId, TaskId, TaskQueue};
use crate::timer::{TimerId, TimerManager};

/// Where the loop reads the current time from.
#[derive(Debug)]
enum Clock {
    System,
    Manual(Mutex<Instant>),
}

impl Clock {
    fn now(&self) -> Instant {
        match self {
            Self::System => Instant::now(),
            Self::Manual(now) => *now.lock(),
        }
    }
}

#[derive(Debug, Default)]
struct LoopState {
    timers: TimerManager,
    tasks: TaskQueue,
    notifiers: SlotMap<NotifierId, ()>,
}

#[derive(Debug)]
struct Shared {
    clock: Clock,
    state: Mutex<LoopState>,
}

/// Handle to a single-threaded event loop.
///
/// Cloning the handle shares the same loop. Handlers are always invoked with
/// no internal lock held, so they may start or stop timers, post tasks and
/// trigger notifiers freely.
#[derive(Debug, Clone)]
pub struct EventLoop {
    shared: Arc<Shared>,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl EventLoop {
    /// Create a loop that reads the system clock.
    pub fn new() -> Self {
        Self::with_clock(Clock::System)
    }

    /// Create a loop with a virtual clock that only moves through [`advance`](Self::advance).
    pub fn with_manual_clock() -> Self {
        Self::with_clock(Clock::Manual(Mutex::new(Instant::now())))
    }

    fn with_clock(clock: Clock) -> Self {
        Self {
            shared: Arc::new(Shared {
                clock,
                state: Mutex::new(LoopState::default()),
            }),
        }
    }

    /// The loop's notion of the current time.
    pub fn now(&self) -> Instant {
        self.shared.clock.now()
    }

    /// Whether this loop runs on a virtual clock.
    pub fn is_manual(&self) -> bool {
        matches!(self.shared.clock, Clock::Manual(_))
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Start a repeating timer; the first fire is one `interval` from now.
    pub fn start_repeating_timer(&self, interval: Duration) -> TimerId {
        let now = self.now();
        let id = self.shared.state.lock().timers.start_repeating(interval, now);
        tracing::trace!(target: targets::TIMER, ?id, ?interval, "repeating timer started");
        id
    }

    /// Stop a timer. Fails with [`LoopError::InvalidTimerId`] if it is not active.
    pub fn stop_timer(&self, id: TimerId) -> Result<()> {
        self.shared.state.lock().timers.stop(id)
    }

    /// Check if a timer is still active.
    pub fn is_timer_active(&self, id: TimerId) -> bool {
        self.shared.state.lock().timers.is_active(id)
    }

    /// Number of active timers.
    pub fn active_timer_count(&self) -> usize {
        self.shared.state.lock().timers.active_count()
    }

    // =========================================================================
    // Deferred tasks
    // =========================================================================

    /// Schedule a wake-up for the next turn of the loop.
    ///
    /// The task is delivered as [`LoopEvent::Deferred`] with the returned ID.
    pub fn post_task(&self) -> TaskId {
        let id = self.shared.state.lock().tasks.post();
        tracing::trace!(target: targets::TASK, id = id.as_u64(), "task posted");
        id
    }

    /// Cancel a pending task. Returns `true` if it had not been delivered yet.
    pub fn cancel_task(&self, id: TaskId) -> bool {
        self.shared.state.lock().tasks.cancel(id)
    }

    /// Check if a task is still waiting for its turn.
    pub fn is_task_pending(&self, id: TaskId) -> bool {
        self.shared.state.lock().tasks.is_pending(id)
    }

    // =========================================================================
    // Notifiers
    // =========================================================================

    /// Register a new notifier.
    ///
    /// Every [`Notifier::notify`] call queues a [`LoopEvent::Notified`] for the
    /// next turn until the notifier is released.
    pub fn notifier(&self) -> Notifier {
        let id = self.shared.state.lock().notifiers.insert(());
        Notifier {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Unregister a notifier and drop its undelivered notifications.
    ///
    /// Returns `false` if the notifier was already released.
    pub fn release_notifier(&self, id: NotifierId) -> bool {
        let mut state = self.shared.state.lock();
        if state.notifiers.remove(id).is_none() {
            return false;
        }
        let dropped = state.tasks.purge_notifications(id);
        tracing::trace!(target: targets::TASK, ?id, dropped, "notifier released");
        true
    }

    // =========================================================================
    // Driving the loop
    // =========================================================================

    /// Whether any task or notification is waiting for the next turn.
    pub fn has_pending(&self) -> bool {
        self.shared.state.lock().tasks.has_pending()
    }

    /// Time until something is due, or `None` if the loop is idle.
    pub fn time_until_next(&self) -> Option<Duration> {
        let now = self.now();
        let mut state = self.shared.state.lock();
        if state.tasks.has_pending() {
            return Some(Duration::ZERO);
        }
        state
            .timers
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Run one turn at the current time.
    ///
    /// Tasks and notifications queued before the turn are delivered first, in
    /// FIFO order, followed by every expired timer in deadline order. Returns
    /// the number of events delivered.
    #[tracing::instrument(skip_all, target = "horizon_dropdown_core::event_loop", level = "trace")]
    pub fn process_pending<F>(&self, mut handler: F) -> usize
    where
        F: FnMut(LoopEvent),
    {
        let now = self.now();
        let boundary = self.shared.state.lock().tasks.turn_boundary();
        let mut delivered = 0;

        loop {
            let next = self.shared.state.lock().tasks.pop_before(boundary);
            let Some(event) = next else { break };
            handler(event);
            delivered += 1;
        }

        loop {
            let next = self.shared.state.lock().timers.pop_expired(now);
            let Some(id) = next else { break };
            handler(LoopEvent::Timer { id });
            delivered += 1;
        }

        delivered
    }

    /// Run turns at the current time until no task or notification is pending.
    pub fn run_until_idle<F>(&self, mut handler: F) -> usize
    where
        F: FnMut(LoopEvent),
    {
        let mut delivered = self.process_pending(&mut handler);
        while self.has_pending() {
            delivered += self.process_pending(&mut handler);
        }
        delivered
    }

    /// Move the virtual clock forward by `duration`, delivering everything that
    /// becomes due on the way.
    ///
    /// The clock stops at each timer deadline, so a handler that stops a timer
    /// prevents its later firings within the same advance.
    pub fn advance<F>(&self, duration: Duration, mut handler: F) -> Result<usize>
    where
        F: FnMut(LoopEvent),
    {
        let Clock::Manual(clock) = &self.shared.clock else {
            return Err(LoopError::ManualClockRequired);
        };

        let target = *clock.lock() + duration;
        let mut delivered = 0;

        loop {
            delivered += self.process_pending(&mut handler);

            let mut state = self.shared.state.lock();
            if state.tasks.has_pending() {
                continue;
            }
            match state.timers.next_deadline() {
                Some(deadline) if deadline <= target => {
                    drop(state);
                    *clock.lock() = deadline;
                }
                _ => {
                    drop(state);
                    *clock.lock() = target;
                    break;
                }
            }
        }

        Ok(delivered)
    }
}

/// A `Send + Sync` trigger that wakes its owner on the next loop turn.
///
/// Notifiers bridge signal slots and widgets: a slot connected to, say, a
/// backdrop-click signal calls [`notify`](Self::notify), and the widget
/// handles the resulting [`LoopEvent::Notified`] in its own event handler.
#[derive(Debug, Clone)]
pub struct Notifier {
    id: NotifierId,
    shared: Weak<Shared>,
}

impl Notifier {
    /// The ID carried by this notifier's events.
    pub fn id(&self) -> NotifierId {
        self.id
    }

    /// Queue a notification.
    ///
    /// Returns `false` (and queues nothing) if the notifier was released or
    /// the loop is gone.
    pub fn notify(&self) -> bool {
        let Some(shared) = self.shared.upgrade() else {
            return false;
        };
        let mut state = shared.state.lock();
        if !state.notifiers.contains_key(self.id) {
            return false;
        }
        state.tasks.post_notification(self.id);
        true
    }
}

static_assertions::assert_impl_all!(EventLoop: Send, Sync);
static_assertions::assert_impl_all!(Notifier: Send, Sync);
static_assertions::assert_impl_all!(crate::Signal<()>: Send, Sync);

//! Events delivered by the Horizon Dropdown event loop.

use crate::task::{NotifierId, TaskId};
use crate::timer::TimerId;

/// An event handed to the loop's handler.
///
/// Owners recognise their events by ID: a widget keeps the IDs of the timers,
/// tasks and notifiers it created and ignores everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// A timer has fired.
    Timer {
        /// The timer that fired.
        id: TimerId,
    },

    /// A task posted with [`EventLoop::post_task`](crate::EventLoop::post_task)
    /// reached its turn.
    Deferred {
        /// The task being delivered.
        id: TaskId,
    },

    /// A [`Notifier`](crate::Notifier) was triggered on an earlier turn.
    Notified {
        /// The notifier that fired.
        id: NotifierId,
    },
}

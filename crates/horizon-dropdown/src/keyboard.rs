//! Keyboard navigation.
//!
//! Key presses are mapped to [`NavAction`]s based on which node received
//! them. Focus changes that must wait for the panel to mount or unmount are
//! queued on the event loop through [`DeferredFocus`].

use horizon_dropdown_core::logging::targets;
use horizon_dropdown_core::{EventLoop, TaskId};

/// A key the dropdown reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Space,
    Escape,
    ArrowUp,
    ArrowDown,
    Tab,
    /// Any other key.
    Other,
}

/// The node that received a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyTarget {
    /// The trigger.
    Trigger,
    /// The rendered option node at this index.
    Item(usize),
}

/// A key press routed to the dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub target: KeyTarget,
}

impl KeyPress {
    pub fn new(key: Key, target: KeyTarget) -> Self {
        Self { key, target }
    }

    /// A key press on the trigger.
    pub fn on_trigger(key: Key) -> Self {
        Self::new(key, KeyTarget::Trigger)
    }

    /// A key press on a rendered option.
    pub fn on_item(key: Key, index: usize) -> Self {
        Self::new(key, KeyTarget::Item(index))
    }
}

/// What a key press asks the dropdown to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    /// Toggle the panel, then focus the first option on the next turn.
    OpenFromKeyboard,
    /// Move focus to the next option after this index.
    FocusNext(usize),
    /// Move focus to the option before this index.
    FocusPrevious(usize),
    /// Close the panel, then focus the trigger on the next turn.
    Escape,
    /// Commit the option at this index, then focus the trigger.
    Select(usize),
}

impl NavAction {
    /// Map a key press to an action. Unhandled presses yield `None`.
    pub fn from_key(press: KeyPress) -> Option<Self> {
        match (press.target, press.key) {
            (_, Key::Escape) => Some(Self::Escape),
            (KeyTarget::Trigger, Key::Enter | Key::Space | Key::ArrowDown) => {
                Some(Self::OpenFromKeyboard)
            }
            (KeyTarget::Item(index), Key::ArrowDown) => Some(Self::FocusNext(index)),
            (KeyTarget::Item(index), Key::ArrowUp) => Some(Self::FocusPrevious(index)),
            (KeyTarget::Item(index), Key::Enter | Key::Space) => Some(Self::Select(index)),
            _ => None,
        }
    }
}

/// Index after `current`, or `None` at the last option.
pub fn next_index(current: usize, count: usize) -> Option<usize> {
    let next = current.checked_add(1)?;
    (next < count).then_some(next)
}

/// Index before `current`, or `None` at the first option.
pub fn previous_index(current: usize, count: usize) -> Option<usize> {
    if current >= count {
        return None;
    }
    current.checked_sub(1)
}

/// A focus change waiting for the next loop turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusRequest {
    /// Focus the first rendered option.
    FirstOption,
    /// Return focus to the trigger.
    Trigger,
}

/// Focus requests queued on the event loop.
#[derive(Debug, Default)]
pub struct DeferredFocus {
    pending: Vec<(TaskId, FocusRequest)>,
}

impl DeferredFocus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `request` for the next turn.
    pub fn schedule(&mut self, request: FocusRequest, event_loop: &EventLoop) -> TaskId {
        let id = event_loop.post_task();
        self.pending.push((id, request));
        tracing::trace!(target: targets::KEYBOARD, ?request, "focus deferred");
        id
    }

    /// Claim the request for a delivered task. `None` if the task is not ours.
    pub fn take(&mut self, id: TaskId) -> Option<FocusRequest> {
        let position = self.pending.iter().position(|(task, _)| *task == id)?;
        Some(self.pending.remove(position).1)
    }

    /// Number of requests still queued.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Cancel every queued request.
    pub fn cancel_all(&mut self, event_loop: &EventLoop) -> usize {
        let cancelled = self.pending.len();
        for (id, _) in self.pending.drain(..) {
            event_loop.cancel_task(id);
        }
        cancelled
    }
}

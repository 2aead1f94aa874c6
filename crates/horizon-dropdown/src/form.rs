//! Form-binding adapter.
//!
//! A form host drives a control through four calls: it writes values in,
//! registers change and touched callbacks, and toggles the disabled state.
//! Callbacks default to no-ops until the host registers its own.

use std::fmt;

use horizon_dropdown_core::logging::targets;

/// Callback invoked with each committed value.
pub type ChangeCallback<V> = Box<dyn FnMut(&V) + Send>;

/// Callback invoked when the control is first interacted with.
pub type TouchedCallback = Box<dyn FnMut() + Send>;

/// The control side of a form binding.
pub trait ControlValueAccessor {
    /// The value exchanged with the form.
    type Value;

    /// Write a value from the form into the control without reporting it back.
    fn write_value(&mut self, value: Self::Value);

    /// Register the callback the control invokes on every commit.
    fn register_on_change(&mut self, on_change: ChangeCallback<Self::Value>);

    /// Register the callback the control invokes when first touched.
    fn register_on_touched(&mut self, on_touched: TouchedCallback);

    /// Enable or disable the control.
    fn set_disabled_state(&mut self, disabled: bool);
}

/// The registered change/touched pair.
pub struct FormCallbacks<V> {
    on_change: ChangeCallback<V>,
    on_touched: TouchedCallback,
    touched: bool,
}

impl<V> Default for FormCallbacks<V> {
    fn default() -> Self {
        Self {
            on_change: Box::new(|_| {}),
            on_touched: Box::new(|| {}),
            touched: false,
        }
    }
}

impl<V> FormCallbacks<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_on_change(&mut self, on_change: ChangeCallback<V>) {
        self.on_change = on_change;
    }

    pub fn set_on_touched(&mut self, on_touched: TouchedCallback) {
        self.on_touched = on_touched;
    }

    /// Report a committed value.
    pub fn notify_change(&mut self, value: &V) {
        (self.on_change)(value);
    }

    /// Report the first interaction. Later calls do nothing.
    ///
    /// Returns `true` if the touched callback ran.
    pub fn notify_touched(&mut self) -> bool {
        if self.touched {
            return false;
        }
        self.touched = true;
        tracing::trace!(target: targets::FORM, "control touched");
        (self.on_touched)();
        true
    }

    /// Whether the control has been touched.
    pub fn is_touched(&self) -> bool {
        self.touched
    }
}

impl<V> fmt::Debug for FormCallbacks<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormCallbacks")
            .field("touched", &self.touched)
            .finish_non_exhaustive()
    }
}

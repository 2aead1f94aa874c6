//! The dropdown widget.
//!
//! [`Dropdown`] ties the pieces together: it resolves the bound value against
//! the catalog, opens and closes the floating panel, keeps the custom
//! scrollbar in sync, handles keyboard navigation and reports commits to both
//! its form binding and its public signals.
//!
//! The widget is event driven. The host delivers user input as
//! [`DropdownEvent`]s and routes every [`LoopEvent`] from the shared
//! [`EventLoop`] back through [`Dropdown::handle_loop_event`]; events that
//! belong to another widget are ignored.
//!
//! # Example
//!
//! ```
//! use horizon_dropdown::{
//!     Dropdown, DropdownEvent, DropdownOption, HeadlessOverlay, HeadlessSurface, OptionId,
//!     Rect, SelectedValue,
//! };
//! use horizon_dropdown_core::EventLoop;
//!
//! let event_loop = EventLoop::with_manual_clock();
//! let surface = HeadlessSurface::new(Rect::new(0.0, 0.0, 240.0, 32.0));
//! let overlay = HeadlessOverlay::new(surface.clone());
//!
//! let mut dropdown = Dropdown::new(surface, overlay, event_loop)
//!     .with_options(vec![DropdownOption::new(1, "Apple"), DropdownOption::new(2, "Banana")]);
//!
//! dropdown.selected_changed.connect(|value| {
//!     println!("committed {value:?}");
//! });
//!
//! dropdown.handle_event(DropdownEvent::TriggerClicked);
//! assert!(dropdown.is_open());
//!
//! dropdown.handle_event(DropdownEvent::ItemClicked(1));
//! assert!(!dropdown.is_open());
//! assert_eq!(dropdown.selected_value(), Some(SelectedValue::Id(OptionId::Int(2))));
//! assert_eq!(dropdown.display_text(), "Banana");
//! ```

use std::time::Duration;

use horizon_dropdown_core::logging::targets;
use horizon_dropdown_core::{EventLoop, LoopEvent, Signal};

use crate::config::DropdownConfig;
use crate::error::Result;
use crate::form::{ChangeCallback, ControlValueAccessor, FormCallbacks, TouchedCallback};
use crate::keyboard::{self, DeferredFocus, FocusRequest, KeyPress, NavAction};
use crate::option::{DropdownOption, OptionCatalog, OptionId, SelectedValue};
use crate::overlay::{
    MountOutcome, OverlayController, OverlayPhase, OverlayService, PanelContent, PanelItem,
    PanelItemKind,
};
use crate::scrollbar::ScrollbarSync;
use crate::selection::{CommittedValue, SelectionState, ValueProjection};
use crate::surface::{DropdownSurface, FocusTarget, PanelClass};

/// Input delivered to a dropdown by its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownEvent {
    /// The trigger was clicked.
    TriggerClicked,
    /// The panel row at this index was clicked.
    ItemClicked(usize),
    /// A key was pressed on the trigger or a panel row.
    KeyPressed(KeyPress),
    /// The render layer reports that the panel has mounted.
    PanelMounted,
    /// An event from the shared event loop.
    Loop(LoopEvent),
}

/// A select control with a floating option panel.
pub struct Dropdown {
    config: DropdownConfig,
    event_loop: EventLoop,
    surface: Box<dyn DropdownSurface>,
    selection: SelectionState,
    projection: ValueProjection,
    overlay: OverlayController,
    scrollbar: ScrollbarSync,
    focus: DeferredFocus,
    form: FormCallbacks<CommittedValue>,
    disabled: bool,
    destroyed: bool,

    /// Emitted with each committed value, including clears.
    pub selected_changed: Signal<CommittedValue>,
    /// Emitted when the resolved label changes.
    pub label_changed: Signal<Option<String>>,
    /// Emitted with `true` when the panel opens and `false` when it closes.
    pub open_changed: Signal<bool>,
}

impl Dropdown {
    /// Create a dropdown rendering through `surface` and opening panels through `overlay`.
    pub fn new(
        surface: impl DropdownSurface + 'static,
        overlay: impl OverlayService + 'static,
        event_loop: EventLoop,
    ) -> Self {
        let config = DropdownConfig::default();
        Self {
            overlay: OverlayController::new(
                Box::new(overlay),
                config.mount_poll,
                config.backdrop_class.clone(),
            ),
            scrollbar: ScrollbarSync::new(config.scrollbar.padding),
            config,
            event_loop,
            surface: Box::new(surface),
            selection: SelectionState::new(OptionCatalog::empty()),
            projection: ValueProjection::default(),
            focus: DeferredFocus::new(),
            form: FormCallbacks::new(),
            disabled: false,
            destroyed: false,
            selected_changed: Signal::new(),
            label_changed: Signal::new(),
            open_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Builder Pattern Methods
    // =========================================================================

    /// Apply a configuration.
    pub fn with_config(mut self, config: DropdownConfig) -> Self {
        self.set_config(config);
        self
    }

    /// Set the option catalog.
    pub fn with_options(mut self, options: impl Into<OptionCatalog>) -> Self {
        self.set_options(options);
        self
    }

    /// Set the bound value.
    pub fn with_selected(mut self, value: impl Into<CommittedValue>) -> Self {
        self.set_selected(value);
        self
    }

    /// Set the placeholder text.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.set_placeholder(placeholder);
        self
    }

    /// Allow clearing the selection from the panel.
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.set_optional(optional);
        self
    }

    /// Set how a chosen option is turned into the committed value.
    pub fn with_value_fn<F>(mut self, project: F) -> Self
    where
        F: Fn(&DropdownOption) -> SelectedValue + Send + Sync + 'static,
    {
        self.set_value_projection(ValueProjection::new(project));
        self
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// The current configuration.
    pub fn config(&self) -> &DropdownConfig {
        &self.config
    }

    /// Replace the configuration.
    ///
    /// Timing and backdrop changes apply from the next open. Rows and the
    /// scrollbar padding of an open panel update immediately.
    pub fn set_config(&mut self, config: DropdownConfig) {
        self.overlay.set_poll_config(config.mount_poll);
        self.overlay.set_backdrop_class(config.backdrop_class.clone());
        self.scrollbar.set_padding(config.scrollbar.padding);
        self.config = config;
        self.refresh_panel();
    }

    /// The option catalog.
    pub fn options(&self) -> OptionCatalog {
        self.selection.catalog()
    }

    /// Replace the option catalog and re-resolve the bound value.
    pub fn set_options(&mut self, options: impl Into<OptionCatalog>) {
        let catalog = options.into();
        tracing::debug!(target: targets::WIDGET, options = catalog.len(), "catalog replaced");
        self.relabel(|selection| selection.set_catalog(catalog));
        self.refresh_panel();
    }

    /// Set the bound value from the host without committing it.
    pub fn set_selected(&mut self, value: impl Into<CommittedValue>) {
        let value = value.into();
        self.relabel(|selection| selection.write_value(value));
        self.refresh_panel();
    }

    /// The placeholder text.
    pub fn placeholder(&self) -> &str {
        &self.config.placeholder
    }

    /// Set the placeholder text.
    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.config.placeholder = placeholder.into();
        self.refresh_panel();
    }

    /// Whether the panel offers a clear entry.
    pub fn is_optional(&self) -> bool {
        self.config.optional
    }

    /// Enable or disable the clear entry.
    pub fn set_optional(&mut self, optional: bool) {
        self.config.optional = optional;
        self.refresh_panel();
    }

    /// Set the value projection.
    pub fn set_value_projection(&mut self, projection: ValueProjection) {
        self.projection = projection;
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// The bound value as last written or committed.
    pub fn selected_value(&self) -> CommittedValue {
        self.selection.raw_value()
    }

    /// Id of the option the bound value resolves to.
    pub fn resolved_id(&self) -> Option<OptionId> {
        self.selection.resolved_id()
    }

    /// Id of the option chosen by the last commit.
    pub fn committed_id(&self) -> Option<OptionId> {
        self.selection.committed_id()
    }

    /// Label of the resolved option, `None` when nothing resolves.
    pub fn label(&self) -> Option<String> {
        self.selection.label()
    }

    /// Text for the trigger: the resolved label, or the placeholder.
    pub fn display_text(&self) -> String {
        self.selection
            .label()
            .unwrap_or_else(|| self.config.placeholder.clone())
    }

    /// The rows the panel shows, in order.
    pub fn panel_items(&self) -> Vec<PanelItem> {
        let catalog = self.selection.catalog();
        let mut items = Vec::with_capacity(catalog.len() + usize::from(self.config.optional));

        if self.config.optional {
            items.push(PanelItem {
                kind: PanelItemKind::Clear,
                label: self.config.placeholder.clone(),
                selected: self.selection.resolved_id().is_none(),
            });
        }
        items.extend(catalog.iter().enumerate().map(|(index, option)| PanelItem {
            kind: PanelItemKind::Option(index),
            label: option.label.clone(),
            selected: self.selection.is_selected(option),
        }));
        items
    }

    /// Commit `option`, or clear the selection with `None`.
    ///
    /// The form binding is notified first, then [`selected_changed`](Self::selected_changed)
    /// is emitted, then the panel closes.
    pub fn select_option(&mut self, option: Option<&DropdownOption>) -> CommittedValue {
        let projection = self.projection.clone();
        let value = self.relabel(|selection| selection.commit(option, &projection));

        self.form.notify_change(&value);
        self.selected_changed.emit(value.clone());
        self.close();
        value
    }

    /// Commit the panel row at `index`.
    ///
    /// Rows only exist while the panel is open, so this returns `None` when
    /// the panel is closed, the dropdown is disabled, or there is no such row.
    pub fn select_item(&mut self, index: usize) -> Option<CommittedValue> {
        if self.destroyed || self.disabled || !self.overlay.is_open() {
            tracing::trace!(target: targets::SELECTION, index, "row selection ignored");
            return None;
        }
        match self.item_kind(index)? {
            PanelItemKind::Clear => Some(self.select_option(None)),
            PanelItemKind::Option(option_index) => {
                let catalog = self.selection.catalog();
                let option = catalog.get(option_index)?;
                Some(self.select_option(Some(option)))
            }
        }
    }

    fn item_kind(&self, index: usize) -> Option<PanelItemKind> {
        let option_index = if self.config.optional {
            match index.checked_sub(1) {
                None => return Some(PanelItemKind::Clear),
                Some(option_index) => option_index,
            }
        } else {
            index
        };
        (option_index < self.selection.catalog().len())
            .then_some(PanelItemKind::Option(option_index))
    }

    /// Push fresh rows to an open panel so they match what a commit would pick.
    fn refresh_panel(&mut self) {
        if !self.overlay.is_open() {
            return;
        }
        let content = PanelContent::new(self.panel_items());
        self.overlay.refresh(content);
        if self.scrollbar.is_attached() {
            self.scrollbar.sync(&mut *self.surface);
        }
    }

    fn relabel<R>(&self, write: impl FnOnce(&SelectionState) -> R) -> R {
        let before = self.selection.label();
        let result = write(&self.selection);
        let after = self.selection.label();
        if before != after {
            self.label_changed.emit(after);
        }
        result
    }

    // =========================================================================
    // Overlay
    // =========================================================================

    /// Whether the panel exists.
    pub fn is_open(&self) -> bool {
        self.overlay.is_open()
    }

    /// The overlay lifecycle phase.
    pub fn overlay_phase(&self) -> OverlayPhase {
        self.overlay.phase()
    }

    /// Open the panel if closed, close it if open.
    ///
    /// Does nothing when the catalog is empty or the dropdown is disabled.
    /// Returns `true` if the panel opened or closed.
    pub fn toggle(&mut self) -> bool {
        if self.selection.catalog().is_empty() {
            tracing::trace!(target: targets::WIDGET, "toggle ignored, no options");
            return false;
        }
        if self.disabled {
            tracing::trace!(target: targets::WIDGET, "toggle ignored, disabled");
            return false;
        }

        if self.overlay.is_open() {
            self.close()
        } else {
            self.open()
        }
    }

    /// Open the panel.
    ///
    /// Returns `false` if it is already open, the dropdown is disabled or
    /// destroyed, or the trigger is not mounted.
    pub fn open(&mut self) -> bool {
        if self.destroyed || self.disabled {
            return false;
        }
        let content = PanelContent::new(self.panel_items());
        if !self.overlay.open(&*self.surface, content, &self.event_loop) {
            return false;
        }
        self.open_changed.emit(true);
        true
    }

    /// Close the panel. Returns `false` if it was not open.
    pub fn close(&mut self) -> bool {
        if !self.close_overlay() {
            return false;
        }
        self.form.notify_touched();
        true
    }

    fn close_overlay(&mut self) -> bool {
        if !self.overlay.close(&self.event_loop) {
            return false;
        }
        self.scrollbar.detach(&self.event_loop);
        self.open_changed.emit(false);
        true
    }

    /// Report that the panel has mounted, skipping the rest of the poll.
    pub fn notify_panel_mounted(&mut self) -> bool {
        if !self.overlay.mark_mounted(&self.event_loop) {
            return false;
        }
        self.run_post_mount_effects();
        true
    }

    fn run_post_mount_effects(&mut self) {
        self.surface.add_panel_class(PanelClass::Animated);
        self.scrollbar.attach(&mut *self.surface, &self.event_loop);
    }

    // =========================================================================
    // Keyboard
    // =========================================================================

    /// Handle a key press. Returns `true` if the dropdown consumed it.
    pub fn handle_key(&mut self, press: KeyPress) -> bool {
        let Some(action) = NavAction::from_key(press) else {
            return false;
        };
        tracing::trace!(target: targets::KEYBOARD, ?action, "key action");

        match action {
            NavAction::OpenFromKeyboard => {
                self.toggle();
                if self.overlay.is_open() {
                    self.focus.schedule(FocusRequest::FirstOption, &self.event_loop);
                }
                true
            }
            NavAction::FocusNext(index) => {
                let count = self.surface.rendered_option_count();
                if let Some(next) = keyboard::next_index(index, count) {
                    self.surface.focus(FocusTarget::Option(next));
                }
                true
            }
            NavAction::FocusPrevious(index) => {
                let count = self.surface.rendered_option_count();
                if let Some(previous) = keyboard::previous_index(index, count) {
                    self.surface.focus(FocusTarget::Option(previous));
                }
                true
            }
            NavAction::Escape => {
                if !self.overlay.is_open() {
                    return false;
                }
                self.close();
                self.focus.schedule(FocusRequest::Trigger, &self.event_loop);
                true
            }
            NavAction::Select(index) => {
                if self.select_item(index).is_none() {
                    return false;
                }
                self.focus.schedule(FocusRequest::Trigger, &self.event_loop);
                true
            }
        }
    }

    fn apply_focus(&mut self, request: FocusRequest) {
        let focused = match request {
            FocusRequest::FirstOption => {
                self.surface.rendered_option_count() > 0
                    && self.surface.focus(FocusTarget::Option(0))
            }
            FocusRequest::Trigger => self.surface.focus(FocusTarget::Trigger),
        };
        if !focused {
            tracing::trace!(target: targets::KEYBOARD, ?request, "focus target not mounted");
        }
    }

    // =========================================================================
    // Event Handling
    // =========================================================================

    /// Handle an input event. Returns `true` if it was consumed.
    pub fn handle_event(&mut self, event: DropdownEvent) -> bool {
        match event {
            DropdownEvent::TriggerClicked => self.toggle(),
            DropdownEvent::ItemClicked(index) => self.select_item(index).is_some(),
            DropdownEvent::KeyPressed(press) => self.handle_key(press),
            DropdownEvent::PanelMounted => self.notify_panel_mounted(),
            DropdownEvent::Loop(event) => self.handle_loop_event(event),
        }
    }

    /// Handle an event from the event loop.
    ///
    /// Returns `false` for events that belong to someone else.
    pub fn handle_loop_event(&mut self, event: LoopEvent) -> bool {
        match event {
            LoopEvent::Timer { id } => {
                match self.overlay.check_mount(id, &*self.surface, &self.event_loop) {
                    None => false,
                    Some(MountOutcome::Mounted) => {
                        self.run_post_mount_effects();
                        true
                    }
                    Some(MountOutcome::Pending | MountOutcome::TimedOut) => true,
                }
            }
            LoopEvent::Deferred { id } => match self.focus.take(id) {
                Some(request) => {
                    self.apply_focus(request);
                    true
                }
                None => false,
            },
            LoopEvent::Notified { id } => {
                if self.overlay.owns_backdrop(id) {
                    tracing::trace!(target: targets::OVERLAY, "backdrop clicked");
                    self.close();
                    true
                } else if self.scrollbar.owns_notifier(id) {
                    self.scrollbar.sync(&mut *self.surface);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// The event loop this dropdown schedules on.
    pub fn event_loop(&self) -> &EventLoop {
        &self.event_loop
    }

    /// Run the loop until idle, handling every event here.
    ///
    /// Only suitable when this dropdown is the loop's sole client; events for
    /// other owners are dropped.
    pub fn process_events(&mut self) -> usize {
        let event_loop = self.event_loop.clone();
        event_loop.run_until_idle(|event| {
            self.handle_loop_event(event);
        })
    }

    /// Advance a manual-clock loop by `duration`, handling every event here.
    ///
    /// Same caveat as [`process_events`](Self::process_events).
    pub fn advance(&mut self, duration: Duration) -> Result<usize> {
        let event_loop = self.event_loop.clone();
        let delivered = event_loop.advance(duration, |event| {
            self.handle_loop_event(event);
        })?;
        Ok(delivered)
    }

    // =========================================================================
    // Form State
    // =========================================================================

    /// Whether the dropdown is disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Whether the panel has been closed at least once after opening.
    pub fn is_touched(&self) -> bool {
        self.form.is_touched()
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Release the panel, the poll timer, listeners and pending focus tasks.
    ///
    /// Idempotent; also runs on drop.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.close_overlay();
        self.overlay.cancel_poll(&self.event_loop);
        self.scrollbar.detach(&self.event_loop);
        let cancelled = self.focus.cancel_all(&self.event_loop);
        tracing::debug!(target: targets::WIDGET, cancelled, "dropdown destroyed");
    }

    /// Whether [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl ControlValueAccessor for Dropdown {
    type Value = CommittedValue;

    fn write_value(&mut self, value: CommittedValue) {
        tracing::trace!(target: targets::FORM, ?value, "value written by form");
        self.set_selected(value);
    }

    fn register_on_change(&mut self, on_change: ChangeCallback<CommittedValue>) {
        self.form.set_on_change(on_change);
    }

    fn register_on_touched(&mut self, on_touched: TouchedCallback) {
        self.form.set_on_touched(on_touched);
    }

    fn set_disabled_state(&mut self, disabled: bool) {
        self.disabled = disabled;
        if !self.surface.set_trigger_disabled(disabled) {
            tracing::debug!(target: targets::FORM, disabled, "trigger not mounted, attribute skipped");
        }
    }
}

impl Drop for Dropdown {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for Dropdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dropdown")
            .field("options", &self.selection.catalog().len())
            .field("selected", &self.selection.raw_value())
            .field("label", &self.selection.label())
            .field("overlay", &self.overlay)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(Dropdown: Send);

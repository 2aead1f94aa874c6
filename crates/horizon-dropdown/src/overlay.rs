//! Floating-panel lifecycle.
//!
//! The [`OverlayController`] owns the single [`OverlayHandle`] a dropdown may
//! have, the backdrop-click subscription registered on it, and the repeating
//! timer that polls for the panel to mount.
//!
//! ```text
//!            open()               list + menu mounted
//! Closed ───────────▶ Opening ───────────────────────▶ Open
//!   ▲                    │                              │
//!   │                    │ poll budget exhausted        │
//!   │                    ▼                              │
//!   └──── close() ──── Stalled ◀── (no effects run)     │
//!   └──────────────────────── close() ◀─────────────────┘
//! ```

use std::fmt;
use std::sync::Arc;

use horizon_dropdown_core::logging::targets;
use horizon_dropdown_core::{ConnectionGuard, EventLoop, Notifier, NotifierId, Signal, TimerId};

use crate::config::MountPollConfig;
use crate::geometry::{Point, Rect, Size};
use crate::surface::{DropdownSurface, ElementRef};

// ============================================================================
// Panel content
// ============================================================================

/// What a panel row stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelItemKind {
    /// The leading entry that clears the selection.
    Clear,
    /// The catalog option at this index.
    Option(usize),
}

/// A row of the option panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelItem {
    pub kind: PanelItemKind,
    pub label: String,
    /// Whether the row is the current selection.
    pub selected: bool,
}

/// The rows handed to the overlay when it is attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelContent {
    pub items: Vec<PanelItem>,
}

impl PanelContent {
    pub fn new(items: Vec<PanelItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ============================================================================
// Placement
// ============================================================================

/// Where the panel is anchored relative to the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelPlacement {
    /// Panel top-start corner at the trigger's bottom-start corner.
    #[default]
    BelowAlignStart,
}

impl PanelPlacement {
    /// Calculate the panel origin for the given anchor geometry.
    ///
    /// There is no flipping: the panel always opens below.
    pub fn calculate_position(&self, anchor: Rect, _panel: Size) -> Point {
        match self {
            Self::BelowAlignStart => anchor.bottom_left(),
        }
    }
}

/// Everything the overlay service needs to create a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    /// Bounds of the trigger at the time of opening.
    pub anchor: Rect,
    pub placement: PanelPlacement,
    /// Computed panel origin.
    pub origin: Point,
    /// Panel width, matched to the trigger.
    pub width: f32,
    pub has_backdrop: bool,
    pub backdrop_class: String,
}

// ============================================================================
// Service traits
// ============================================================================

/// A live floating panel.
pub trait OverlayHandle: Send {
    /// Attach the panel content.
    fn attach(&mut self, content: PanelContent);

    /// Signal emitted when the backdrop behind the panel is clicked.
    fn backdrop_click(&self) -> Arc<Signal<()>>;

    /// Release the panel and everything the service holds for it.
    fn dispose(self: Box<Self>);
}

/// Creates anchored floating panels.
pub trait OverlayService: Send {
    fn create(&mut self, config: &OverlayConfig) -> Box<dyn OverlayHandle>;
}

// ============================================================================
// Controller
// ============================================================================

/// Lifecycle phase of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayPhase {
    /// No handle exists.
    #[default]
    Closed,
    /// A handle exists and mount polling is running.
    Opening,
    /// The panel mounted and its post-mount effects ran.
    Open,
    /// Polling timed out; the handle is alive but inert until closed.
    Stalled,
}

/// Result of a mount check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// Not mounted yet; polling continues.
    Pending,
    /// The panel mounted. Post-mount effects should run now.
    Mounted,
    /// The poll budget ran out.
    TimedOut,
}

struct ActiveOverlay {
    handle: Box<dyn OverlayHandle>,
    _backdrop: ConnectionGuard<()>,
    notifier: Notifier,
}

#[derive(Debug, Clone, Copy)]
struct MountPoll {
    timer: TimerId,
    attempts: u64,
}

/// Owns the overlay handle and drives the open/close state machine.
///
/// Whether the overlay is open is answered by whether a handle exists; there
/// is no separate flag to drift out of sync.
pub struct OverlayController {
    service: Box<dyn OverlayService>,
    active: Option<ActiveOverlay>,
    poll: Option<MountPoll>,
    phase: OverlayPhase,
    poll_config: MountPollConfig,
    backdrop_class: String,
    opens: u64,
    closes: u64,
}

impl OverlayController {
    /// Create a controller that opens panels through `service`.
    pub fn new(
        service: Box<dyn OverlayService>,
        poll_config: MountPollConfig,
        backdrop_class: impl Into<String>,
    ) -> Self {
        Self {
            service,
            active: None,
            poll: None,
            phase: OverlayPhase::Closed,
            poll_config,
            backdrop_class: backdrop_class.into(),
            opens: 0,
            closes: 0,
        }
    }

    /// Whether a handle exists.
    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// The current phase.
    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    /// Whether mount polling is running.
    pub fn is_polling(&self) -> bool {
        self.poll.is_some()
    }

    /// Number of successful opens so far.
    pub fn open_count(&self) -> u64 {
        self.opens
    }

    /// Number of closes that released a handle so far.
    pub fn close_count(&self) -> u64 {
        self.closes
    }

    /// Update the poll timing for subsequent opens.
    pub fn set_poll_config(&mut self, poll_config: MountPollConfig) {
        self.poll_config = poll_config;
    }

    /// Update the backdrop class for subsequent opens.
    pub fn set_backdrop_class(&mut self, backdrop_class: impl Into<String>) {
        self.backdrop_class = backdrop_class.into();
    }

    /// Whether `id` is the notifier of the current backdrop subscription.
    pub fn owns_backdrop(&self, id: NotifierId) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.notifier.id() == id)
    }

    /// Create, anchor and attach the panel, then start mount polling.
    ///
    /// Returns `false` without side effects if a handle already exists or the
    /// trigger cannot be measured.
    pub fn open(
        &mut self,
        surface: &dyn DropdownSurface,
        content: PanelContent,
        event_loop: &EventLoop,
    ) -> bool {
        if self.active.is_some() {
            tracing::debug!(target: targets::OVERLAY, "open ignored, overlay already exists");
            return false;
        }
        let Some(anchor) = surface.trigger_bounds() else {
            tracing::debug!(target: targets::OVERLAY, "open skipped, trigger not mounted");
            return false;
        };

        let placement = PanelPlacement::BelowAlignStart;
        let config = OverlayConfig {
            anchor,
            placement,
            origin: placement.calculate_position(anchor, Size::new(anchor.width(), 0.0)),
            width: anchor.width(),
            has_backdrop: true,
            backdrop_class: self.backdrop_class.clone(),
        };

        let rows = content.len();
        let mut handle = self.service.create(&config);
        handle.attach(content);

        let notifier = event_loop.notifier();
        let forward = notifier.clone();
        let backdrop = handle.backdrop_click().connect_scoped(move |_| {
            forward.notify();
        });

        self.active = Some(ActiveOverlay {
            handle,
            _backdrop: backdrop,
            notifier,
        });
        self.poll = Some(MountPoll {
            timer: event_loop.start_repeating_timer(self.poll_config.interval()),
            attempts: 0,
        });
        self.phase = OverlayPhase::Opening;
        self.opens += 1;

        tracing::debug!(
            target: targets::OVERLAY,
            origin = ?config.origin,
            width = config.width,
            rows,
            "overlay opened"
        );
        true
    }

    /// Re-attach `content` to the live handle.
    ///
    /// Returns `false` if no handle exists.
    pub fn refresh(&mut self, content: PanelContent) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        let rows = content.len();
        active.handle.attach(content);
        tracing::trace!(target: targets::OVERLAY, rows, "overlay content refreshed");
        true
    }

    /// Handle a timer event.
    ///
    /// Returns `None` if `timer` is not this controller's poll timer.
    pub fn check_mount(
        &mut self,
        timer: TimerId,
        surface: &dyn DropdownSurface,
        event_loop: &EventLoop,
    ) -> Option<MountOutcome> {
        let poll = self.poll.as_mut().filter(|poll| poll.timer == timer)?;
        poll.attempts += 1;
        let attempts = poll.attempts;

        if surface.is_mounted(ElementRef::List) && surface.is_mounted(ElementRef::Menu) {
            self.cancel_poll(event_loop);
            self.phase = OverlayPhase::Open;
            tracing::trace!(target: targets::OVERLAY, attempts, "panel mounted");
            return Some(MountOutcome::Mounted);
        }

        if attempts >= self.poll_config.attempts() {
            self.cancel_poll(event_loop);
            self.phase = OverlayPhase::Stalled;
            tracing::warn!(
                target: targets::OVERLAY,
                timeout_ms = self.poll_config.timeout_ms,
                "panel did not mount in time; overlay left open without post-mount effects"
            );
            return Some(MountOutcome::TimedOut);
        }

        Some(MountOutcome::Pending)
    }

    /// Report a mount observed directly by the host.
    ///
    /// Short-circuits polling. Returns `true` if post-mount effects should run.
    pub fn mark_mounted(&mut self, event_loop: &EventLoop) -> bool {
        if self.phase != OverlayPhase::Opening {
            return false;
        }
        self.cancel_poll(event_loop);
        self.phase = OverlayPhase::Open;
        tracing::trace!(target: targets::OVERLAY, "panel mount reported by host");
        true
    }

    /// Stop mount polling. Returns `false` if no poll was running.
    pub fn cancel_poll(&mut self, event_loop: &EventLoop) -> bool {
        let Some(poll) = self.poll.take() else {
            return false;
        };
        if let Err(err) = event_loop.stop_timer(poll.timer) {
            tracing::trace!(target: targets::OVERLAY, %err, "poll timer already gone");
        }
        true
    }

    /// Dispose the handle and its backdrop subscription.
    ///
    /// Returns `false` if no handle existed.
    pub fn close(&mut self, event_loop: &EventLoop) -> bool {
        self.cancel_poll(event_loop);
        let Some(active) = self.active.take() else {
            return false;
        };

        let ActiveOverlay {
            handle,
            _backdrop: backdrop,
            notifier,
        } = active;
        drop(backdrop);
        event_loop.release_notifier(notifier.id());
        handle.dispose();

        self.phase = OverlayPhase::Closed;
        self.closes += 1;
        tracing::debug!(target: targets::OVERLAY, "overlay closed");
        true
    }
}

impl fmt::Debug for OverlayController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayController")
            .field("phase", &self.phase)
            .field("open", &self.is_open())
            .field("poll", &self.poll)
            .field("opens", &self.opens)
            .field("closes", &self.closes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessOverlay, HeadlessSurface};
    use std::time::Duration;

    fn setup(auto_mount: bool) -> (EventLoop, HeadlessSurface, HeadlessOverlay, OverlayController) {
        let event_loop = EventLoop::with_manual_clock();
        let surface = HeadlessSurface::new(Rect::new(8.0, 16.0, 240.0, 32.0));
        let overlay = HeadlessOverlay::new(surface.clone()).with_auto_mount(auto_mount);
        let controller = OverlayController::new(
            Box::new(overlay.clone()),
            MountPollConfig::default(),
            "transparent-bg",
        );
        (event_loop, surface, overlay, controller)
    }

    fn rows(count: usize) -> PanelContent {
        PanelContent::new(
            (0..count)
                .map(|index| PanelItem {
                    kind: PanelItemKind::Option(index),
                    label: format!("Label {index}"),
                    selected: false,
                })
                .collect(),
        )
    }

    #[test]
    fn test_open_anchors_below_trigger() {
        let (event_loop, surface, overlay, mut controller) = setup(true);

        assert!(controller.open(&surface, rows(3), &event_loop));
        assert_eq!(controller.phase(), OverlayPhase::Opening);

        let config = overlay.last_config().unwrap();
        assert_eq!(config.origin, Point::new(8.0, 48.0));
        assert_eq!(config.width, 240.0);
        assert!(config.has_backdrop);
        assert_eq!(config.backdrop_class, "transparent-bg");
    }

    #[test]
    fn test_second_open_is_rejected() {
        let (event_loop, surface, overlay, mut controller) = setup(true);

        assert!(controller.open(&surface, rows(1), &event_loop));
        assert!(!controller.open(&surface, rows(1), &event_loop));
        assert_eq!(overlay.live_handles(), 1);
    }

    #[test]
    fn test_open_without_trigger_is_skipped() {
        let event_loop = EventLoop::with_manual_clock();
        let surface = HeadlessSurface::without_trigger();
        let overlay = HeadlessOverlay::new(surface.clone());
        let mut controller =
            OverlayController::new(Box::new(overlay.clone()), MountPollConfig::default(), "");

        assert!(!controller.open(&surface, rows(1), &event_loop));
        assert_eq!(overlay.created_count(), 0);
        assert_eq!(controller.phase(), OverlayPhase::Closed);
    }

    #[test]
    fn test_mount_poll_times_out() {
        let (event_loop, surface, overlay, mut controller) = setup(false);
        controller.open(&surface, rows(1), &event_loop);

        let mut outcomes = Vec::new();
        event_loop
            .advance(Duration::from_secs(5), |event| {
                if let horizon_dropdown_core::LoopEvent::Timer { id } = event {
                    outcomes.extend(controller.check_mount(id, &surface, &event_loop));
                }
            })
            .unwrap();

        assert_eq!(outcomes.len(), 40);
        assert_eq!(outcomes.last(), Some(&MountOutcome::TimedOut));
        assert_eq!(controller.phase(), OverlayPhase::Stalled);
        assert!(controller.is_open());
        assert_eq!(event_loop.active_timer_count(), 0);

        assert!(controller.close(&event_loop));
        assert_eq!(overlay.live_handles(), 0);
    }

    #[test]
    fn test_refresh_reattaches_to_live_handle() {
        let (event_loop, surface, overlay, mut controller) = setup(true);
        assert!(!controller.refresh(rows(2)));

        controller.open(&surface, rows(2), &event_loop);
        assert!(controller.refresh(rows(5)));
        assert_eq!(overlay.last_content(), Some(rows(5)));
        assert_eq!(overlay.created_count(), 1);
        assert_eq!(controller.phase(), OverlayPhase::Opening);
    }

    #[test]
    fn test_close_releases_backdrop_subscription() {
        let (event_loop, surface, overlay, mut controller) = setup(true);
        controller.open(&surface, rows(2), &event_loop);
        let backdrop = overlay.current_backdrop().unwrap();
        assert_eq!(backdrop.connection_count(), 1);

        assert!(controller.close(&event_loop));
        assert_eq!(backdrop.connection_count(), 0);
        assert!(!controller.close(&event_loop));
        assert_eq!(controller.open_count(), 1);
        assert_eq!(controller.close_count(), 1);
    }
}

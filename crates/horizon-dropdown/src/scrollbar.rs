//! Custom scrollbar synchronisation.
//!
//! The option list hides its native scrollbar; a thumb element is sized and
//! positioned from the list's scroll metrics instead. [`ScrollbarSync`]
//! subscribes to the list's scroll events while the panel is open and
//! re-syncs the thumb on every notification.

use horizon_dropdown_core::logging::targets;
use horizon_dropdown_core::{ConnectionGuard, EventLoop, Notifier, NotifierId};

use crate::surface::{DropdownSurface, PanelClass, ScrollMetrics, ThumbGeometry};

/// Compute the thumb for `metrics`.
///
/// Returns `None` when the content fits, in which case no thumb is shown.
/// Otherwise the thumb height is proportional to the visible fraction and the
/// offset tracks the scroll position, shifted down by `padding`.
pub fn compute_thumb(metrics: ScrollMetrics, padding: f32) -> Option<ThumbGeometry> {
    if metrics.fits() {
        return None;
    }

    let ScrollMetrics {
        scroll_height,
        client_height,
        scroll_top,
    } = metrics;
    let height = (client_height / scroll_height) * client_height;
    let offset =
        (scroll_top / (scroll_height - client_height)) * (client_height - height) + padding;

    Some(ThumbGeometry { height, offset })
}

struct ScrollListener {
    _guard: ConnectionGuard<()>,
    notifier: Notifier,
}

/// Keeps the scrollbar thumb in step with the option list.
pub struct ScrollbarSync {
    padding: f32,
    listener: Option<ScrollListener>,
}

impl ScrollbarSync {
    /// Create a detached synchroniser.
    pub fn new(padding: f32) -> Self {
        Self {
            padding,
            listener: None,
        }
    }

    /// Change the padding used by subsequent syncs.
    pub fn set_padding(&mut self, padding: f32) {
        self.padding = padding;
    }

    /// Whether a scroll listener is registered.
    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    /// Whether `id` is the notifier of the current scroll listener.
    pub fn owns_notifier(&self, id: NotifierId) -> bool {
        self.listener
            .as_ref()
            .is_some_and(|listener| listener.notifier.id() == id)
    }

    /// Subscribe to the list's scroll events and sync once.
    ///
    /// Any previous subscription is dropped first, so attaching twice never
    /// leaves two listeners behind. Returns `false` if the list is not mounted.
    pub fn attach(&mut self, surface: &mut dyn DropdownSurface, event_loop: &EventLoop) -> bool {
        self.detach(event_loop);

        let Some(scrolled) = surface.list_scrolled() else {
            tracing::debug!(target: targets::SCROLLBAR, "attach skipped, list not mounted");
            return false;
        };

        let notifier = event_loop.notifier();
        let forward = notifier.clone();
        let guard = scrolled.connect_scoped(move |_| {
            forward.notify();
        });
        self.listener = Some(ScrollListener {
            _guard: guard,
            notifier,
        });

        self.sync(surface);
        true
    }

    /// Read the list metrics and push the thumb geometry.
    ///
    /// Returns the geometry applied, or `None` if the list is not mounted.
    pub fn sync(&self, surface: &mut dyn DropdownSurface) -> Option<ThumbGeometry> {
        let metrics = surface.list_metrics()?;

        let thumb = match compute_thumb(metrics, self.padding) {
            Some(thumb) => thumb,
            None => {
                surface.add_panel_class(PanelClass::NoScroll);
                ThumbGeometry::HIDDEN
            }
        };
        surface.set_scrollbar_thumb(thumb);

        tracing::trace!(
            target: targets::SCROLLBAR,
            height = thumb.height,
            offset = thumb.offset,
            "scrollbar synced"
        );
        Some(thumb)
    }

    /// Drop the scroll listener. Safe to call when never attached.
    pub fn detach(&mut self, event_loop: &EventLoop) -> bool {
        let Some(listener) = self.listener.take() else {
            return false;
        };
        event_loop.release_notifier(listener.notifier.id());
        true
    }
}

impl Default for ScrollbarSync {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl std::fmt::Debug for ScrollbarSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollbarSync")
            .field("padding", &self.padding)
            .field("attached", &self.is_attached())
            .finish()
    }
}

//! In-memory render and overlay backends.
//!
//! [`HeadlessSurface`] and [`HeadlessOverlay`] implement the collaborator
//! traits without a windowing system. They share state through cheap clones,
//! so a test or host can keep a handle to inspect (and poke) what the widget
//! rendered while the widget owns another.

use std::collections::BTreeSet;
use std::sync::Arc;

use horizon_dropdown_core::Signal;
use parking_lot::Mutex;

use crate::geometry::Rect;
use crate::overlay::{OverlayConfig, OverlayHandle, OverlayService, PanelContent};
use crate::surface::{
    DropdownSurface, ElementRef, FocusTarget, PanelClass, ScrollMetrics, ThumbGeometry,
};

// ============================================================================
// Surface
// ============================================================================

#[derive(Debug)]
struct TriggerNode {
    bounds: Rect,
    disabled: bool,
}

#[derive(Debug)]
struct PanelNode {
    item_count: usize,
    scroll_top: f32,
    classes: BTreeSet<PanelClass>,
    thumb: Option<ThumbGeometry>,
    scrolled: Arc<Signal<()>>,
}

#[derive(Debug)]
struct SurfaceState {
    trigger: Option<TriggerNode>,
    panel: Option<PanelNode>,
    viewport_height: f32,
    item_height: f32,
    focus: Option<FocusTarget>,
}

impl SurfaceState {
    fn metrics(&self) -> Option<ScrollMetrics> {
        let panel = self.panel.as_ref()?;
        let scroll_height = panel.item_count as f32 * self.item_height;
        let client_height = self.viewport_height.min(scroll_height);
        Some(ScrollMetrics::new(scroll_height, client_height, panel.scroll_top))
    }
}

/// A render surface that keeps its nodes in memory.
///
/// The option list is laid out as `item_count` rows of a fixed height inside
/// a viewport of fixed height; the list scrolls when the rows overflow it.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl HeadlessSurface {
    /// Create a surface whose trigger occupies `trigger_bounds`.
    pub fn new(trigger_bounds: Rect) -> Self {
        Self::with_trigger(Some(TriggerNode {
            bounds: trigger_bounds,
            disabled: false,
        }))
    }

    /// Create a surface whose trigger is not mounted.
    pub fn without_trigger() -> Self {
        Self::with_trigger(None)
    }

    fn with_trigger(trigger: Option<TriggerNode>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SurfaceState {
                trigger,
                panel: None,
                viewport_height: 200.0,
                item_height: 20.0,
                focus: None,
            })),
        }
    }

    /// Set the list viewport height and row height.
    pub fn with_list_viewport(self, viewport_height: f32, item_height: f32) -> Self {
        {
            let mut state = self.state.lock();
            state.viewport_height = viewport_height;
            state.item_height = item_height;
        }
        self
    }

    /// Mount (or move) the trigger.
    pub fn set_trigger_bounds(&self, bounds: Rect) {
        let mut state = self.state.lock();
        let disabled = state.trigger.as_ref().is_some_and(|trigger| trigger.disabled);
        state.trigger = Some(TriggerNode { bounds, disabled });
    }

    /// Whether the trigger carries the disabled attribute.
    pub fn is_trigger_disabled(&self) -> bool {
        self.state
            .lock()
            .trigger
            .as_ref()
            .is_some_and(|trigger| trigger.disabled)
    }

    /// Render the panel with `item_count` option rows.
    pub fn mount_panel(&self, item_count: usize) {
        self.state.lock().panel = Some(PanelNode {
            item_count,
            scroll_top: 0.0,
            classes: BTreeSet::new(),
            thumb: None,
            scrolled: Arc::new(Signal::new()),
        });
    }

    /// Change the row count of a mounted panel, keeping its listeners.
    ///
    /// The scroll position is clamped to the new range and focus on a row
    /// that no longer exists is lost. Returns `false` if the panel is not
    /// mounted.
    pub fn set_panel_rows(&self, item_count: usize) -> bool {
        let mut state = self.state.lock();
        let item_height = state.item_height;
        let viewport_height = state.viewport_height;
        let Some(panel) = state.panel.as_mut() else {
            return false;
        };
        panel.item_count = item_count;
        let scroll_height = item_count as f32 * item_height;
        let max = (scroll_height - viewport_height.min(scroll_height)).max(0.0);
        panel.scroll_top = panel.scroll_top.clamp(0.0, max);
        if matches!(state.focus, Some(FocusTarget::Option(index)) if index >= item_count) {
            state.focus = None;
        }
        true
    }

    /// Remove the panel. Focus inside it is lost.
    pub fn unmount_panel(&self) {
        let mut state = self.state.lock();
        state.panel = None;
        if matches!(state.focus, Some(FocusTarget::Option(_))) {
            state.focus = None;
        }
    }

    /// Whether the panel is rendered.
    pub fn is_panel_mounted(&self) -> bool {
        self.state.lock().panel.is_some()
    }

    /// Scroll the list and emit its scroll event.
    ///
    /// The position is clamped to the scrollable range. Returns `false` if
    /// the panel is not mounted.
    pub fn scroll_to(&self, scroll_top: f32) -> bool {
        let scrolled = {
            let mut state = self.state.lock();
            let Some(metrics) = state.metrics() else {
                return false;
            };
            let max = (metrics.scroll_height - metrics.client_height).max(0.0);
            let Some(panel) = state.panel.as_mut() else {
                return false;
            };
            panel.scroll_top = scroll_top.clamp(0.0, max);
            panel.scrolled.clone()
        };
        scrolled.emit(());
        true
    }

    /// Current scroll position of the list.
    pub fn scroll_top(&self) -> Option<f32> {
        self.state.lock().panel.as_ref().map(|panel| panel.scroll_top)
    }

    /// Last thumb geometry pushed by the widget.
    pub fn thumb(&self) -> Option<ThumbGeometry> {
        self.state.lock().panel.as_ref().and_then(|panel| panel.thumb)
    }

    /// Whether the panel root carries `class`.
    pub fn has_panel_class(&self, class: PanelClass) -> bool {
        self.state
            .lock()
            .panel
            .as_ref()
            .is_some_and(|panel| panel.classes.contains(&class))
    }

    /// Number of listeners on the list's scroll event.
    pub fn scroll_listener_count(&self) -> usize {
        self.state
            .lock()
            .panel
            .as_ref()
            .map_or(0, |panel| panel.scrolled.connection_count())
    }
}

impl DropdownSurface for HeadlessSurface {
    fn is_mounted(&self, element: ElementRef) -> bool {
        let state = self.state.lock();
        match element {
            ElementRef::Trigger => state.trigger.is_some(),
            ElementRef::List | ElementRef::Scrollbar | ElementRef::Menu => state.panel.is_some(),
        }
    }

    fn trigger_bounds(&self) -> Option<Rect> {
        self.state.lock().trigger.as_ref().map(|trigger| trigger.bounds)
    }

    fn set_trigger_disabled(&mut self, disabled: bool) -> bool {
        match self.state.lock().trigger.as_mut() {
            Some(trigger) => {
                trigger.disabled = disabled;
                true
            }
            None => false,
        }
    }

    fn list_metrics(&self) -> Option<ScrollMetrics> {
        self.state.lock().metrics()
    }

    fn list_scrolled(&self) -> Option<Arc<Signal<()>>> {
        self.state
            .lock()
            .panel
            .as_ref()
            .map(|panel| panel.scrolled.clone())
    }

    fn set_scrollbar_thumb(&mut self, thumb: ThumbGeometry) -> bool {
        match self.state.lock().panel.as_mut() {
            Some(panel) => {
                panel.thumb = Some(thumb);
                true
            }
            None => false,
        }
    }

    fn add_panel_class(&mut self, class: PanelClass) -> bool {
        match self.state.lock().panel.as_mut() {
            Some(panel) => {
                panel.classes.insert(class);
                true
            }
            None => false,
        }
    }

    fn rendered_option_count(&self) -> usize {
        self.state
            .lock()
            .panel
            .as_ref()
            .map_or(0, |panel| panel.item_count)
    }

    fn focus(&mut self, target: FocusTarget) -> bool {
        let mut state = self.state.lock();
        let present = match target {
            FocusTarget::Trigger => state.trigger.is_some(),
            FocusTarget::Option(index) => state
                .panel
                .as_ref()
                .is_some_and(|panel| index < panel.item_count),
        };
        if present {
            state.focus = Some(target);
        }
        present
    }

    fn focused(&self) -> Option<FocusTarget> {
        self.state.lock().focus
    }
}

// ============================================================================
// Overlay
// ============================================================================

#[derive(Debug, Default)]
struct OverlayStats {
    created: usize,
    disposed: usize,
    leaked_listeners: usize,
    last_config: Option<OverlayConfig>,
    last_content: Option<PanelContent>,
    current_backdrop: Option<Arc<Signal<()>>>,
}

/// An overlay service that renders panels onto a [`HeadlessSurface`].
#[derive(Debug, Clone)]
pub struct HeadlessOverlay {
    surface: HeadlessSurface,
    auto_mount: bool,
    stats: Arc<Mutex<OverlayStats>>,
}

impl HeadlessOverlay {
    /// Create a service that mounts panels as soon as content is attached.
    pub fn new(surface: HeadlessSurface) -> Self {
        Self {
            surface,
            auto_mount: true,
            stats: Arc::new(Mutex::new(OverlayStats::default())),
        }
    }

    /// Choose whether attaching content mounts the panel.
    ///
    /// With auto-mount off the panel never appears unless the host calls
    /// [`HeadlessSurface::mount_panel`].
    pub fn with_auto_mount(mut self, auto_mount: bool) -> Self {
        self.auto_mount = auto_mount;
        self
    }

    /// Number of handles created.
    pub fn created_count(&self) -> usize {
        self.stats.lock().created
    }

    /// Number of handles disposed.
    pub fn disposed_count(&self) -> usize {
        self.stats.lock().disposed
    }

    /// Number of handles created and not yet disposed.
    pub fn live_handles(&self) -> usize {
        let stats = self.stats.lock();
        stats.created - stats.disposed
    }

    /// Backdrop listeners still connected when their handle was disposed.
    pub fn leaked_listeners(&self) -> usize {
        self.stats.lock().leaked_listeners
    }

    /// Configuration of the most recently created handle.
    pub fn last_config(&self) -> Option<OverlayConfig> {
        self.stats.lock().last_config.clone()
    }

    /// Content most recently attached.
    pub fn last_content(&self) -> Option<PanelContent> {
        self.stats.lock().last_content.clone()
    }

    /// Backdrop signal of the live handle.
    pub fn current_backdrop(&self) -> Option<Arc<Signal<()>>> {
        self.stats.lock().current_backdrop.clone()
    }

    /// Click the backdrop of the live handle. Returns `false` if none exists.
    pub fn click_backdrop(&self) -> bool {
        match self.current_backdrop() {
            Some(backdrop) => {
                backdrop.emit(());
                true
            }
            None => false,
        }
    }
}

impl OverlayService for HeadlessOverlay {
    fn create(&mut self, config: &OverlayConfig) -> Box<dyn OverlayHandle> {
        let backdrop = Arc::new(Signal::new());
        {
            let mut stats = self.stats.lock();
            stats.created += 1;
            stats.last_config = Some(config.clone());
            stats.current_backdrop = Some(backdrop.clone());
        }
        Box::new(HeadlessPanel {
            surface: self.surface.clone(),
            auto_mount: self.auto_mount,
            backdrop,
            stats: self.stats.clone(),
        })
    }
}

struct HeadlessPanel {
    surface: HeadlessSurface,
    auto_mount: bool,
    backdrop: Arc<Signal<()>>,
    stats: Arc<Mutex<OverlayStats>>,
}

impl OverlayHandle for HeadlessPanel {
    fn attach(&mut self, content: PanelContent) {
        if !self.surface.set_panel_rows(content.len()) && self.auto_mount {
            self.surface.mount_panel(content.len());
        }
        self.stats.lock().last_content = Some(content);
    }

    fn backdrop_click(&self) -> Arc<Signal<()>> {
        self.backdrop.clone()
    }

    fn dispose(self: Box<Self>) {
        {
            let mut stats = self.stats.lock();
            stats.disposed += 1;
            stats.leaked_listeners += self.backdrop.connection_count();
            if stats
                .current_backdrop
                .as_ref()
                .is_some_and(|current| Arc::ptr_eq(current, &self.backdrop))
            {
                stats.current_backdrop = None;
            }
        }
        self.surface.unmount_panel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_follow_rows() {
        let surface = HeadlessSurface::new(Rect::new(0.0, 0.0, 100.0, 20.0))
            .with_list_viewport(100.0, 20.0);
        assert_eq!(surface.list_metrics(), None);

        surface.mount_panel(15);
        assert_eq!(
            surface.list_metrics(),
            Some(ScrollMetrics::new(300.0, 100.0, 0.0))
        );

        surface.mount_panel(2);
        assert!(surface.list_metrics().unwrap().fits());
    }

    #[test]
    fn test_panel_rows_change_in_place() {
        let mut surface = HeadlessSurface::new(Rect::new(0.0, 0.0, 100.0, 20.0))
            .with_list_viewport(100.0, 20.0);
        assert!(!surface.set_panel_rows(3));

        surface.mount_panel(15);
        let scrolled = surface.list_scrolled().unwrap();
        scrolled.connect(|_| {});
        surface.scroll_to(200.0);
        surface.focus(FocusTarget::Option(12));

        assert!(surface.set_panel_rows(8));
        assert_eq!(surface.scroll_top(), Some(60.0));
        assert_eq!(surface.focused(), None);
        assert_eq!(surface.scroll_listener_count(), 1);
    }

    #[test]
    fn test_scroll_to_clamps_and_emits() {
        let surface = HeadlessSurface::new(Rect::new(0.0, 0.0, 100.0, 20.0))
            .with_list_viewport(100.0, 20.0);
        surface.mount_panel(15);
        let scrolled = surface.list_scrolled().unwrap();
        let hits = Arc::new(Mutex::new(0));
        let counter = hits.clone();
        scrolled.connect(move |_| *counter.lock() += 1);

        assert!(surface.scroll_to(1000.0));
        assert_eq!(surface.scroll_top(), Some(200.0));
        assert_eq!(*hits.lock(), 1);
    }

    #[test]
    fn test_focus_requires_node() {
        let mut surface = HeadlessSurface::without_trigger();
        assert!(!surface.focus(FocusTarget::Trigger));
        assert!(!surface.focus(FocusTarget::Option(0)));

        surface.mount_panel(2);
        assert!(surface.focus(FocusTarget::Option(1)));
        surface.unmount_panel();
        assert_eq!(surface.focused(), None);
    }

    #[test]
    fn test_overlay_counts_handles() {
        let surface = HeadlessSurface::new(Rect::new(0.0, 0.0, 100.0, 20.0));
        let mut overlay = HeadlessOverlay::new(surface.clone());
        let config = OverlayConfig {
            anchor: Rect::new(0.0, 0.0, 100.0, 20.0),
            placement: Default::default(),
            origin: Default::default(),
            width: 100.0,
            has_backdrop: true,
            backdrop_class: String::new(),
        };

        let mut handle = overlay.create(&config);
        handle.attach(PanelContent::default());
        assert!(surface.is_panel_mounted());
        assert_eq!(overlay.live_handles(), 1);

        handle.dispose();
        assert!(!surface.is_panel_mounted());
        assert_eq!(overlay.live_handles(), 0);
        assert!(!overlay.click_backdrop());
    }
}

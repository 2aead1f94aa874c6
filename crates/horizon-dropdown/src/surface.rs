//! The render-layer collaborator a dropdown draws through.
//!
//! A [`DropdownSurface`] exposes the handful of nodes the widget needs (the
//! trigger, the option list, the scrollbar thumb and the panel root). Any of
//! them may be missing at a given moment; every method that depends on a node
//! reports whether it had an effect instead of failing.

use std::sync::Arc;

use horizon_dropdown_core::Signal;

use crate::geometry::Rect;

/// A named node of the rendered dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRef {
    /// The always-visible control that opens the panel.
    Trigger,
    /// The scrolling container holding the option nodes.
    List,
    /// The custom scrollbar thumb.
    Scrollbar,
    /// The panel root.
    Menu,
}

/// Scroll measurements of the option list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Total height of the list content.
    pub scroll_height: f32,
    /// Visible height of the list.
    pub client_height: f32,
    /// Current scroll position.
    pub scroll_top: f32,
}

impl ScrollMetrics {
    pub fn new(scroll_height: f32, client_height: f32, scroll_top: f32) -> Self {
        Self {
            scroll_height,
            client_height,
            scroll_top,
        }
    }

    /// Whether the content fits without scrolling.
    pub fn fits(&self) -> bool {
        self.scroll_height <= self.client_height
    }
}

/// Size and position of the scrollbar thumb.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ThumbGeometry {
    /// Thumb height.
    pub height: f32,
    /// Vertical offset of the thumb from the top of the track.
    pub offset: f32,
}

impl ThumbGeometry {
    /// A collapsed thumb.
    pub const HIDDEN: ThumbGeometry = ThumbGeometry {
        height: 0.0,
        offset: 0.0,
    };
}

/// A style marker applied to the panel root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelClass {
    /// Runs the entry animation.
    Animated,
    /// The list content fits; no scrollbar is shown.
    NoScroll,
}

impl PanelClass {
    /// The class name used by style sheets.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Animated => "animated",
            Self::NoScroll => "no-scroll",
        }
    }
}

/// A focusable node of the dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusTarget {
    /// The trigger.
    Trigger,
    /// The rendered option node at this index.
    Option(usize),
}

/// Render layer of a dropdown.
///
/// Implementations own the actual nodes. The widget only reads measurements
/// and pushes state; it never assumes a node exists.
pub trait DropdownSurface: Send {
    /// Whether `element` is currently present.
    fn is_mounted(&self, element: ElementRef) -> bool;

    /// Bounding box of the trigger, if mounted.
    fn trigger_bounds(&self) -> Option<Rect>;

    /// Set the trigger's disabled attribute. Returns `false` if the trigger is absent.
    fn set_trigger_disabled(&mut self, disabled: bool) -> bool;

    /// Scroll measurements of the list, if mounted.
    fn list_metrics(&self) -> Option<ScrollMetrics>;

    /// The list's scroll-event source, if mounted.
    fn list_scrolled(&self) -> Option<Arc<Signal<()>>>;

    /// Position the scrollbar thumb. Returns `false` if the thumb is absent.
    fn set_scrollbar_thumb(&mut self, thumb: ThumbGeometry) -> bool;

    /// Add a style marker to the panel root. Returns `false` if the panel is absent.
    fn add_panel_class(&mut self, class: PanelClass) -> bool;

    /// Number of option nodes currently rendered in the list.
    fn rendered_option_count(&self) -> usize;

    /// Move focus. Returns `false` if the target node is absent.
    fn focus(&mut self, target: FocusTarget) -> bool;

    /// The currently focused node, if it belongs to this dropdown.
    fn focused(&self) -> Option<FocusTarget>;
}

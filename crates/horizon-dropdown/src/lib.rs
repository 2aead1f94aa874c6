//! Horizon Dropdown: a select control with a floating option panel.
//!
//! The widget is split into small parts that can be used on their own:
//!
//! - [`option`]: the option catalog and bindable values
//! - [`reconcile`] and [`selection`]: resolving a bound value to a label
//! - [`overlay`]: the floating-panel lifecycle and mount polling
//! - [`scrollbar`]: the custom scrollbar thumb
//! - [`keyboard`]: keyboard navigation and deferred focus
//! - [`form`]: the form-binding adapter
//! - [`headless`]: in-memory render and overlay backends
//!
//! [`Dropdown`] composes all of them. Rendering is delegated to a
//! [`DropdownSurface`] and panel creation to an [`OverlayService`]; timing
//! runs on a [`horizon_dropdown_core::EventLoop`].
//!
//! # Logging
//!
//! The crate logs through `tracing` under the `horizon_dropdown::*` targets
//! listed in [`horizon_dropdown_core::logging::targets`]. A panel that fails
//! to mount within its poll budget is reported at `warn`.

pub mod config;
pub mod dropdown;
pub mod error;
pub mod form;
pub mod geometry;
pub mod headless;
pub mod keyboard;
pub mod option;
pub mod overlay;
pub mod reconcile;
pub mod scrollbar;
pub mod selection;
pub mod surface;

pub use config::{DropdownConfig, MountPollConfig, ScrollbarConfig};
pub use dropdown::{Dropdown, DropdownEvent};
pub use error::{Error, Result};
pub use form::{ChangeCallback, ControlValueAccessor, TouchedCallback};
pub use geometry::{Point, Rect, Size};
pub use headless::{HeadlessOverlay, HeadlessSurface};
pub use keyboard::{Key, KeyPress, KeyTarget, NavAction};
pub use option::{DropdownOption, OptionCatalog, OptionId, SelectedValue};
pub use overlay::{
    OverlayConfig, OverlayHandle, OverlayPhase, OverlayService, PanelContent, PanelItem,
    PanelItemKind, PanelPlacement,
};
pub use reconcile::{Resolution, resolve};
pub use scrollbar::{ScrollbarSync, compute_thumb};
pub use selection::{CommittedValue, SelectionState, ValueProjection};
pub use surface::{DropdownSurface, ElementRef, FocusTarget, PanelClass, ScrollMetrics, ThumbGeometry};

//! Logging facilities for Horizon Dropdown.
//!
//! Horizon Dropdown uses the `tracing` crate for instrumentation. Nothing is
//! printed unless the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_dropdown=debug,horizon_dropdown_core=warn")
//!     .init();
//! ```
//!
//! Use the constants in [`targets`] to filter logs by subsystem.

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "horizon_dropdown_core";
    /// Event loop turn processing.
    pub const EVENT_LOOP: &str = "horizon_dropdown_core::event_loop";
    /// Timer system target.
    pub const TIMER: &str = "horizon_dropdown_core::timer";
    /// Deferred task and notifier target.
    pub const TASK: &str = "horizon_dropdown_core::task";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_dropdown_core::signal";

    /// Widget crate target.
    pub const WIDGET: &str = "horizon_dropdown";
    /// Overlay lifecycle (open, mount polling, close).
    pub const OVERLAY: &str = "horizon_dropdown::overlay";
    /// Value reconciliation and selection commits.
    pub const SELECTION: &str = "horizon_dropdown::selection";
    /// Custom scrollbar synchronisation.
    pub const SCROLLBAR: &str = "horizon_dropdown::scrollbar";
    /// Keyboard navigation and focus restoration.
    pub const KEYBOARD: &str = "horizon_dropdown::keyboard";
    /// Form-binding adapter.
    pub const FORM: &str = "horizon_dropdown::form";
}

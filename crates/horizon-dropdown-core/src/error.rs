//! Error types for the Horizon Dropdown event loop.

/// Errors reported by the event loop primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoopError {
    /// The timer ID is invalid or the timer has already been stopped.
    #[error("Invalid or expired timer ID")]
    InvalidTimerId,

    /// The operation needs a virtual clock but the loop runs on the system clock.
    #[error("Operation requires an event loop with a manual clock")]
    ManualClockRequired,
}

/// A specialized Result type for event loop operations.
pub type Result<T> = std::result::Result<T, LoopError>;

//! Error types for the dropdown widget.

use horizon_dropdown_core::LoopError;
use thiserror::Error;

/// Result type for dropdown operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the dropdown crate.
///
/// None of these arise from user interaction: selection, toggling and
/// keyboard navigation never fail. They come from loading configuration or
/// catalog data, or from driving the event loop incorrectly.
#[derive(Error, Debug)]
pub enum Error {
    /// The TOML configuration could not be parsed.
    #[error("invalid dropdown configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A JSON catalog or bound value could not be parsed.
    #[error("invalid option data: {0}")]
    Catalog(#[from] serde_json::Error),

    /// The event loop rejected an operation.
    #[error(transparent)]
    Loop(#[from] LoopError),
}

//! Dropdown configuration.
//!
//! [`DropdownConfig`] carries the host-facing inputs that are plain data
//! (placeholder, clearing) together with the timing and styling constants of
//! the overlay. It can be built in code or loaded from TOML:
//!
//! ```
//! use horizon_dropdown::DropdownConfig;
//!
//! let config = DropdownConfig::from_toml_str(
//!     r#"
//!     placeholder = "Pick a fruit"
//!     optional = true
//!
//!     [mount_poll]
//!     timeout_ms = 500
//!     "#,
//! )
//! .unwrap();
//!
//! assert!(config.optional);
//! assert_eq!(config.mount_poll.interval_ms, 50);
//! assert_eq!(config.mount_poll.attempts(), 10);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default placeholder shown when nothing is selected.
pub const DEFAULT_PLACEHOLDER: &str = "Select an option";

/// Top-level dropdown configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropdownConfig {
    /// Text shown on the trigger when no option resolves.
    pub placeholder: String,
    /// Whether the panel offers a "clear" entry that commits `None`.
    pub optional: bool,
    /// Mount-poll timing.
    pub mount_poll: MountPollConfig,
    /// Custom scrollbar settings.
    pub scrollbar: ScrollbarConfig,
    /// Style class applied to the overlay backdrop.
    pub backdrop_class: String,
}

impl Default for DropdownConfig {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            optional: false,
            mount_poll: MountPollConfig::default(),
            scrollbar: ScrollbarConfig::default(),
            backdrop_class: "transparent-bg".to_string(),
        }
    }
}

impl DropdownConfig {
    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

/// How the overlay waits for its panel to mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountPollConfig {
    /// Time between mount checks, in milliseconds.
    pub interval_ms: u64,
    /// Total time budget before polling gives up, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for MountPollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 50,
            timeout_ms: 2000,
        }
    }
}

impl MountPollConfig {
    /// The poll interval, never shorter than 1ms.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    /// The timeout budget.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Number of checks made before giving up (at least one).
    pub fn attempts(&self) -> u64 {
        self.timeout_ms.div_ceil(self.interval_ms.max(1)).max(1)
    }
}

/// Custom scrollbar settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollbarConfig {
    /// Constant offset added to the thumb position.
    pub padding: f32,
}

impl Default for ScrollbarConfig {
    fn default() -> Self {
        Self { padding: 10.0 }
    }
}

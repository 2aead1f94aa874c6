//! Option catalog and the values a host can bind to a dropdown.
//!
//! The catalog is an immutable, shared list of `{id, label}` entries. Hosts
//! replace it wholesale; the widget only ever reads it.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ============================================================================
// Identifiers
// ============================================================================

/// The identifier of an option.
///
/// Ids are opaque and comparable; in practice they are integers or strings.
/// Deserialization is untagged, so JSON numbers become [`OptionId::Int`] and
/// JSON strings become [`OptionId::Str`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionId {
    /// A numeric id.
    Int(i64),
    /// A string id.
    Str(String),
}

impl OptionId {
    /// Check whether this id, used as a lookup key, denotes `stored`.
    ///
    /// Identical variants compare directly. A string key matches a numeric
    /// stored id when it parses (after trimming) to the same integer, so a
    /// host that round-trips ids through text still finds its option.
    pub fn matches(&self, stored: &OptionId) -> bool {
        match (stored, self) {
            (Self::Int(stored), Self::Int(key)) => stored == key,
            (Self::Str(stored), Self::Str(key)) => stored == key,
            (Self::Int(stored), Self::Str(key)) => {
                key.trim().parse::<i64>().is_ok_and(|key| key == *stored)
            }
            (Self::Str(_), Self::Int(_)) => false,
        }
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for OptionId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for OptionId {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u32> for OptionId {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<&str> for OptionId {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for OptionId {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

// ============================================================================
// Options
// ============================================================================

/// A single entry of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DropdownOption {
    /// The option's identifier.
    pub id: OptionId,
    /// The text shown for this option.
    #[serde(default)]
    pub label: String,
}

impl DropdownOption {
    /// Create a new option.
    pub fn new(id: impl Into<OptionId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// The ordered, immutable list of options shown by a dropdown.
///
/// Cloning is cheap and shares the underlying list. Two catalogs are the
/// *same* catalog only if they share storage (see [`same_catalog`](Self::same_catalog));
/// a freshly built catalog with equal contents still counts as a replacement.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<DropdownOption>")]
pub struct OptionCatalog {
    options: Arc<[DropdownOption]>,
}

impl OptionCatalog {
    /// Create a catalog from a list of options.
    pub fn new(options: Vec<DropdownOption>) -> Self {
        Self {
            options: options.into(),
        }
    }

    /// Create an empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a catalog from a JSON array of `{ "id": ..., "label": ... }` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get the number of options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Check whether the catalog has no options.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Get the option at `index`.
    pub fn get(&self, index: usize) -> Option<&DropdownOption> {
        self.options.get(index)
    }

    /// Iterate over the options in order.
    pub fn iter(&self) -> std::slice::Iter<'_, DropdownOption> {
        self.options.iter()
    }

    /// The options as a slice.
    pub fn as_slice(&self) -> &[DropdownOption] {
        &self.options
    }

    /// Find the first option whose id is matched by `key`.
    ///
    /// Duplicate ids are not rejected; the first match wins.
    pub fn find_by_id(&self, key: &OptionId) -> Option<&DropdownOption> {
        self.options.iter().find(|option| key.matches(&option.id))
    }

    /// Index of the first option whose id is matched by `key`.
    pub fn position(&self, key: &OptionId) -> Option<usize> {
        self.options.iter().position(|option| key.matches(&option.id))
    }

    /// Check whether both handles share the same storage.
    pub fn same_catalog(&self, other: &OptionCatalog) -> bool {
        Arc::ptr_eq(&self.options, &other.options)
    }
}

impl fmt::Debug for OptionCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.options.iter()).finish()
    }
}

impl From<Vec<DropdownOption>> for OptionCatalog {
    fn from(options: Vec<DropdownOption>) -> Self {
        Self::new(options)
    }
}

impl FromIterator<DropdownOption> for OptionCatalog {
    fn from_iter<I: IntoIterator<Item = DropdownOption>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a OptionCatalog {
    type Item = &'a DropdownOption;
    type IntoIter = std::slice::Iter<'a, DropdownOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Selected values
// ============================================================================

/// A value bound to the dropdown by its host.
///
/// Hosts bind either a bare id or a whole option record; both denote the same
/// option when their ids match. "Nothing selected" is `None` at every API
/// boundary (`Option<SelectedValue>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectedValue {
    /// An option-shaped record.
    Record(DropdownOption),
    /// A bare identifier.
    Id(OptionId),
}

impl SelectedValue {
    /// The identifier this value is looked up by.
    pub fn key(&self) -> &OptionId {
        match self {
            Self::Record(option) => &option.id,
            Self::Id(id) => id,
        }
    }

    /// Parse a bound value from JSON; `null` yields `None`.
    pub fn from_json(json: &str) -> Result<Option<Self>> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<OptionId> for SelectedValue {
    fn from(id: OptionId) -> Self {
        Self::Id(id)
    }
}

impl From<DropdownOption> for SelectedValue {
    fn from(option: DropdownOption) -> Self {
        Self::Record(option)
    }
}

impl From<i64> for SelectedValue {
    fn from(value: i64) -> Self {
        Self::Id(value.into())
    }
}

impl From<i32> for SelectedValue {
    fn from(value: i32) -> Self {
        Self::Id(value.into())
    }
}

impl From<&str> for SelectedValue {
    fn from(value: &str) -> Self {
        Self::Id(value.into())
    }
}

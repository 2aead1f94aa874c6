//! Reconciliation of a bound value against the current catalog.
//!
//! A bound value (bare id or option record) is looked up in the catalog by
//! id; the match supplies both the display label and the id used for the
//! "selected" highlight. Missing matches clear both.

use crate::option::{OptionCatalog, OptionId, SelectedValue};

/// The outcome of resolving a bound value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Id of the matched option, or `None` when nothing matched.
    pub id: Option<OptionId>,
    /// Label of the matched option, or `None` when nothing matched.
    pub label: Option<String>,
}

impl Resolution {
    /// Whether the value matched an option.
    pub fn is_resolved(&self) -> bool {
        self.id.is_some()
    }
}

/// The key used to look up `value` in a catalog.
///
/// Records are looked up by their `id` field, bare ids by themselves.
pub fn lookup_key(value: &SelectedValue) -> &OptionId {
    value.key()
}

/// Resolve `value` against `catalog`.
///
/// `None` and unmatched values resolve to an empty [`Resolution`]. The
/// function is pure; callers decide when to re-run it.
pub fn resolve(value: Option<&SelectedValue>, catalog: &OptionCatalog) -> Resolution {
    let Some(value) = value else {
        return Resolution::default();
    };

    match catalog.find_by_id(lookup_key(value)) {
        Some(option) => Resolution {
            id: Some(option.id.clone()),
            label: Some(option.label.clone()),
        },
        None => Resolution::default(),
    }
}

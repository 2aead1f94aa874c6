//! Selection state and the commit protocol.
//!
//! [`SelectionState`] holds the host-bound raw value and the catalog, and
//! keeps the derived [`Resolution`] in step with both. Every write goes
//! through an explicit recompute; nothing is derived lazily.

use std::fmt;
use std::sync::Arc;

use horizon_dropdown_core::Property;
use horizon_dropdown_core::logging::targets;

use crate::option::{DropdownOption, OptionCatalog, OptionId, SelectedValue};
use crate::reconcile::{self, Resolution};

/// The value produced by a commit and delivered to the host.
pub type CommittedValue = Option<SelectedValue>;

type ProjectFn = dyn Fn(&DropdownOption) -> SelectedValue + Send + Sync;

/// Maps a chosen option to the value that is committed and emitted.
///
/// The default projection commits the option's id. Clearing the selection
/// always commits `None` without consulting the projection.
#[derive(Clone)]
pub struct ValueProjection {
    project: Arc<ProjectFn>,
}

impl ValueProjection {
    /// Create a projection from a closure.
    pub fn new<F>(project: F) -> Self
    where
        F: Fn(&DropdownOption) -> SelectedValue + Send + Sync + 'static,
    {
        Self {
            project: Arc::new(project),
        }
    }

    /// Commit the option's id.
    pub fn by_id() -> Self {
        Self::new(|option| SelectedValue::Id(option.id.clone()))
    }

    /// Commit the whole option record.
    pub fn record() -> Self {
        Self::new(|option| SelectedValue::Record(option.clone()))
    }

    /// Project `option` into a committed value.
    pub fn project(&self, option: Option<&DropdownOption>) -> CommittedValue {
        option.map(|option| (self.project)(option))
    }
}

impl Default for ValueProjection {
    fn default() -> Self {
        Self::by_id()
    }
}

impl fmt::Debug for ValueProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueProjection").finish_non_exhaustive()
    }
}

/// Raw value, catalog and the resolution derived from them.
#[derive(Debug, Default)]
pub struct SelectionState {
    raw: Property<CommittedValue>,
    catalog: Property<OptionCatalog>,
    resolution: Property<Resolution>,
    committed_id: Property<Option<OptionId>>,
}

impl SelectionState {
    /// Create state over `catalog` with nothing selected.
    pub fn new(catalog: OptionCatalog) -> Self {
        Self {
            catalog: Property::new(catalog),
            ..Self::default()
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Replace the raw value from outside, without committing.
    ///
    /// Returns `true` if the resolution changed.
    pub fn write_value(&self, value: CommittedValue) -> bool {
        self.raw.set(value);
        self.recompute()
    }

    /// Replace the catalog and re-resolve the current value.
    ///
    /// The resolution is recomputed even if the new catalog has equal
    /// contents. Returns `true` if the resolution changed.
    pub fn set_catalog(&self, catalog: OptionCatalog) -> bool {
        self.catalog.set_silent(catalog);
        self.recompute()
    }

    /// Commit `option` (or a clear) through `projection`.
    ///
    /// Stores the committed id and the projected value, re-resolves, and
    /// returns the projected value for delivery to the host.
    pub fn commit(
        &self,
        option: Option<&DropdownOption>,
        projection: &ValueProjection,
    ) -> CommittedValue {
        let value = projection.project(option);
        self.committed_id.set(option.map(|option| option.id.clone()));
        self.raw.set(value.clone());
        self.recompute();
        tracing::debug!(target: targets::SELECTION, ?value, "selection committed");
        value
    }

    fn recompute(&self) -> bool {
        let resolution = self
            .raw
            .with(|raw| self.catalog.with(|catalog| reconcile::resolve(raw.as_ref(), catalog)));
        let changed = self.resolution.set(resolution);
        if changed {
            tracing::trace!(
                target: targets::SELECTION,
                resolution = ?self.resolution.get(),
                "selection re-resolved"
            );
        }
        changed
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The raw value as last written or committed.
    pub fn raw_value(&self) -> CommittedValue {
        self.raw.get()
    }

    /// The current catalog.
    pub fn catalog(&self) -> OptionCatalog {
        self.catalog.get()
    }

    /// The current resolution.
    pub fn resolution(&self) -> Resolution {
        self.resolution.get()
    }

    /// Id of the option the raw value resolves to.
    pub fn resolved_id(&self) -> Option<OptionId> {
        self.resolution.with(|resolution| resolution.id.clone())
    }

    /// Label of the option the raw value resolves to.
    pub fn label(&self) -> Option<String> {
        self.resolution.with(|resolution| resolution.label.clone())
    }

    /// Id of the option chosen by the last commit.
    pub fn committed_id(&self) -> Option<OptionId> {
        self.committed_id.get()
    }

    /// Whether `option` is the resolved selection.
    pub fn is_selected(&self, option: &DropdownOption) -> bool {
        self.resolution
            .with(|resolution| resolution.id.as_ref() == Some(&option.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> OptionCatalog {
        OptionCatalog::new(vec![
            DropdownOption::new(1, "A"),
            DropdownOption::new(2, "B"),
        ])
    }

    #[test]
    fn test_write_value_resolves_label() {
        let state = SelectionState::new(catalog());
        assert!(state.write_value(Some(SelectedValue::from(1))));
        assert_eq!(state.label().as_deref(), Some("A"));
        assert_eq!(state.resolved_id(), Some(OptionId::Int(1)));
    }

    #[test]
    fn test_catalog_replacement_clears_label() {
        let state = SelectionState::new(catalog());
        state.write_value(Some(SelectedValue::from(1)));

        let changed =
            state.set_catalog(OptionCatalog::new(vec![DropdownOption::new(2, "B")]));
        assert!(changed);
        assert_eq!(state.label(), None);
        assert_eq!(state.resolved_id(), None);
        assert_eq!(state.raw_value(), Some(SelectedValue::from(1)));
    }

    #[test]
    fn test_catalog_replacement_relabels() {
        let state = SelectionState::new(catalog());
        state.write_value(Some(SelectedValue::from(2)));
        state.set_catalog(OptionCatalog::new(vec![DropdownOption::new(2, "Bee")]));
        assert_eq!(state.label().as_deref(), Some("Bee"));
    }

    #[test]
    fn test_commit_default_projection() {
        let state = SelectionState::new(catalog());
        let option = DropdownOption::new(2, "B");

        let value = state.commit(Some(&option), &ValueProjection::default());
        assert_eq!(value, Some(SelectedValue::Id(OptionId::Int(2))));
        assert_eq!(state.committed_id(), Some(OptionId::Int(2)));
        assert_eq!(state.label().as_deref(), Some("B"));
        assert!(state.is_selected(&option));
    }

    #[test]
    fn test_commit_clear_skips_projection() {
        let state = SelectionState::new(catalog());
        let projection = ValueProjection::new(|_| panic!("projection consulted for clear"));
        state.write_value(Some(SelectedValue::from(1)));

        assert_eq!(state.commit(None, &projection), None);
        assert_eq!(state.committed_id(), None);
        assert_eq!(state.label(), None);
    }

    #[test]
    fn test_record_projection() {
        let state = SelectionState::new(catalog());
        let option = DropdownOption::new(1, "A");
        let value = state.commit(Some(&option), &ValueProjection::record());
        assert_eq!(value, Some(SelectedValue::Record(option)));
        assert_eq!(state.label().as_deref(), Some("A"));
    }
}

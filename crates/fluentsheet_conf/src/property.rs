//! Fluent builder over one property's [`SpecCellConfig`].

use std::sync::Arc;

use crate::spec::{EnumCellIndex, EnumCellValue, SpecCellConfig};

/// Configuration for one named model member.
///
/// Every mutator returns `&mut Self` so calls chain. An explicit index and
/// automatic indexing are mutually exclusive: whichever was requested last wins.
#[derive(Debug, Clone, Default)]
pub struct PropertyConfiguration {
    cell_config: SpecCellConfig,
}

impl PropertyConfiguration {
    /// Property with default cell state (unresolved index, no flags).
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cell state.
    pub fn cell_config(&self) -> &SpecCellConfig {
        &self.cell_config
    }

    /// Set the value transform applied before writing.
    pub fn has_convert<F>(&mut self, convert: F) -> &mut Self
    where
        F: Fn(EnumCellValue) -> EnumCellValue + Send + Sync + 'static,
    {
        self.cell_config.convert = Some(Arc::new(convert));
        self
    }

    /// Pin the column index; disables automatic indexing.
    pub fn has_excel_index(&mut self, index: usize) -> &mut Self {
        self.set_explicit_index(EnumCellIndex::At(index));
        self.cell_config.if_auto_index = false;
        self
    }

    /// Set the header text. An empty title suppresses the header cell.
    pub fn has_excel_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.cell_config.title = Some(title.into());
        self
    }

    /// Clear the header text so the member name is used.
    pub fn reset_excel_title(&mut self) -> &mut Self {
        self.cell_config.title = None;
        self
    }

    /// Set the value-format pattern.
    pub fn has_data_formatter(&mut self, formatter: impl Into<String>) -> &mut Self {
        self.cell_config.formatter = Some(formatter.into());
        self
    }

    /// Request automatic indexing; resets any explicit index.
    pub fn has_auto_index(&mut self) -> &mut Self {
        self.cell_config.if_auto_index = true;
        self.set_explicit_index(EnumCellIndex::Unresolved);
        self
    }

    /// Allow adjacent equal values in this column to be merged.
    pub fn is_merge_enabled(&mut self) -> &mut Self {
        self.cell_config.if_allow_merge = true;
        self
    }

    /// Set the export/import suppression flags.
    pub fn is_ignored(&mut self, if_export_ignored: bool, if_import_ignored: bool) -> &mut Self {
        self.cell_config.if_export_ignored = if_export_ignored;
        self.cell_config.if_import_ignored = if_import_ignored;
        self
    }

    /// Set index, title, formatter and both suppression flags in one call.
    ///
    /// Leaves the automatic-indexing flag untouched.
    pub fn is_ignored_cell(
        &mut self,
        index: usize,
        title: Option<&str>,
        formatter: Option<&str>,
        if_export_ignored: bool,
        if_import_ignored: bool,
    ) -> &mut Self {
        self.set_explicit_index(EnumCellIndex::At(index));
        self.cell_config.title = title.map(ToString::to_string);
        self.cell_config.formatter = formatter.map(ToString::to_string);
        self.cell_config.if_export_ignored = if_export_ignored;
        self.cell_config.if_import_ignored = if_import_ignored;
        self
    }

    /// Configure an explicitly placed cell in one call.
    pub fn has_excel_cell(
        &mut self,
        index: usize,
        title: Option<&str>,
        formatter: Option<&str>,
        if_allow_merge: bool,
    ) -> &mut Self {
        self.set_explicit_index(EnumCellIndex::At(index));
        self.cell_config.title = title.map(ToString::to_string);
        self.cell_config.formatter = formatter.map(ToString::to_string);
        self.cell_config.if_auto_index = false;
        self.cell_config.if_allow_merge = if_allow_merge;
        self
    }

    /// Configure an automatically placed cell in one call.
    pub fn has_auto_index_excel_cell(
        &mut self,
        title: Option<&str>,
        formatter: Option<&str>,
        if_allow_merge: bool,
    ) -> &mut Self {
        self.set_explicit_index(EnumCellIndex::Unresolved);
        self.cell_config.title = title.map(ToString::to_string);
        self.cell_config.formatter = formatter.map(ToString::to_string);
        self.cell_config.if_auto_index = true;
        self.cell_config.if_allow_merge = if_allow_merge;
        self
    }

    fn set_explicit_index(&mut self, index: EnumCellIndex) {
        self.cell_config.index = index;
        self.cell_config.if_index_from_auto = false;
    }

    // Used by automatic resolution: moves the index, keeps the auto flag.
    pub(crate) fn assign_resolved_index(&mut self, index: usize) {
        self.cell_config.index = EnumCellIndex::At(index);
        self.cell_config.if_index_from_auto = true;
    }

    // Drops an index left by a previous resolution pass.
    pub(crate) fn release_resolved_index(&mut self) {
        if self.cell_config.if_index_from_auto {
            self.set_explicit_index(EnumCellIndex::Unresolved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_index_after_auto_index_wins() {
        let mut pc = PropertyConfiguration::new();
        pc.has_auto_index().has_excel_index(5);
        assert_eq!(pc.cell_config().index(), EnumCellIndex::At(5));
        assert!(!pc.cell_config().if_auto_index());
    }

    #[test]
    fn test_auto_index_after_explicit_index_wins() {
        let mut pc = PropertyConfiguration::new();
        pc.has_excel_index(5).has_auto_index();
        assert_eq!(pc.cell_config().index(), EnumCellIndex::Unresolved);
        assert!(pc.cell_config().if_auto_index());
    }

    #[test]
    fn test_title_formatter_merge_and_convert() {
        let mut pc = PropertyConfiguration::new();
        pc.has_excel_title("Amount")
            .has_data_formatter("0.00")
            .is_merge_enabled()
            .has_convert(|value| match value {
                EnumCellValue::Number(n) => EnumCellValue::Number(n * 100.0),
                other => other,
            });

        let cfg = pc.cell_config();
        assert_eq!(cfg.title(), Some("Amount"));
        assert_eq!(cfg.formatter(), Some("0.00"));
        assert!(cfg.if_allow_merge());
        assert_eq!(
            cfg.apply_convert(EnumCellValue::Number(0.5)),
            EnumCellValue::Number(50.0)
        );

        pc.reset_excel_title();
        assert_eq!(pc.cell_config().title(), None);
    }

    #[test]
    fn test_is_ignored_sets_both_directions_independently() {
        let mut pc = PropertyConfiguration::new();
        pc.is_ignored(true, false);
        assert!(pc.cell_config().if_export_ignored());
        assert!(!pc.cell_config().if_import_ignored());
    }

    #[test]
    fn test_is_ignored_cell_keeps_auto_flag() {
        let mut pc = PropertyConfiguration::new();
        pc.has_auto_index()
            .is_ignored_cell(4, Some("Note"), None, true, true);
        let cfg = pc.cell_config();
        assert_eq!(cfg.index(), EnumCellIndex::At(4));
        assert!(cfg.if_auto_index());
        assert_eq!(cfg.title(), Some("Note"));
        assert!(cfg.if_export_ignored() && cfg.if_import_ignored());
    }

    #[test]
    fn test_release_drops_only_auto_assigned_index() {
        let mut pc = PropertyConfiguration::new();
        pc.has_auto_index().assign_resolved_index(2);
        pc.release_resolved_index();
        assert_eq!(pc.cell_config().index(), EnumCellIndex::Unresolved);
        assert!(pc.cell_config().if_auto_index());

        pc.assign_resolved_index(2);
        pc.is_ignored_cell(4, None, None, true, false);
        pc.release_resolved_index();
        assert_eq!(pc.cell_config().index(), EnumCellIndex::At(4));
    }

    #[test]
    fn test_bulk_cell_setters_respect_index_precedence() {
        let mut pc = PropertyConfiguration::new();
        pc.has_auto_index()
            .has_excel_cell(2, Some("Name"), Some("@"), true);
        assert_eq!(pc.cell_config().index(), EnumCellIndex::At(2));
        assert!(!pc.cell_config().if_auto_index());
        assert!(pc.cell_config().if_allow_merge());

        pc.has_auto_index_excel_cell(Some("Name"), None, false);
        assert_eq!(pc.cell_config().index(), EnumCellIndex::Unresolved);
        assert!(pc.cell_config().if_auto_index());
        assert_eq!(pc.cell_config().formatter(), None);
        assert!(!pc.cell_config().if_allow_merge());
    }
}

//! Model-level configuration: property registry, annotation import, and
//! automatic column-index resolution.
//!
//! A [`ModelConfiguration`] is built once during a setup phase and then treated
//! as read-only. It has no internal locking; callers that share it across
//! threads should [`ModelConfiguration::freeze`] it and share the snapshot.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::conf::N_AUTO_INDEX_SEED;
use crate::property::PropertyConfiguration;
use crate::selector::MemberSelector;
use crate::spec::{
    ConfError, SpecColumnLayout, SpecFilterConfig, SpecFreezeConfig, SpecMemberDescriptor,
    SpecModelLayout, SpecStatisticsConfig,
};
use crate::util::{
    derive_formatter_from_display_format, derive_header_title, select_title_position,
};

/// Introspection hook for a model type.
pub trait SheetModel {
    /// Members in declaration order, with their annotations.
    fn members() -> Vec<SpecMemberDescriptor>;
}

/// Fluent configuration for model type `M`.
pub struct ModelConfiguration<M: SheetModel> {
    dict_property_configs: BTreeMap<String, PropertyConfiguration>,
    l_members: Vec<SpecMemberDescriptor>,
    l_statistics_configs: Vec<SpecStatisticsConfig>,
    l_filter_configs: Vec<SpecFilterConfig>,
    l_freeze_configs: Vec<SpecFreezeConfig>,
    _model: PhantomData<fn() -> M>,
}

impl<M: SheetModel> Default for ModelConfiguration<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: SheetModel> std::fmt::Debug for ModelConfiguration<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfiguration")
            .field("property_configs", &self.dict_property_configs)
            .field("members", &self.l_members)
            .field("statistics_configs", &self.l_statistics_configs)
            .field("filter_configs", &self.l_filter_configs)
            .field("freeze_configs", &self.l_freeze_configs)
            .finish()
    }
}

impl<M: SheetModel> ModelConfiguration<M> {
    /// Capture `M`'s members once; no properties are configured yet.
    pub fn new() -> Self {
        Self {
            dict_property_configs: BTreeMap::new(),
            l_members: M::members(),
            l_statistics_configs: Vec::new(),
            l_filter_configs: Vec::new(),
            l_freeze_configs: Vec::new(),
            _model: PhantomData,
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    // #region Accessors

    /// Members captured at construction, in declaration order.
    pub fn members(&self) -> &[SpecMemberDescriptor] {
        &self.l_members
    }

    /// All configured properties keyed by member name.
    pub fn property_configs(&self) -> &BTreeMap<String, PropertyConfiguration> {
        &self.dict_property_configs
    }

    /// Configured property for `member`, if any.
    pub fn get_property(&self, member: &str) -> Option<&PropertyConfiguration> {
        self.dict_property_configs.get(member)
    }

    /// Summary rows in insertion order.
    pub fn statistics_configs(&self) -> &[SpecStatisticsConfig] {
        &self.l_statistics_configs
    }

    /// Auto-filter regions in insertion order.
    pub fn filter_configs(&self) -> &[SpecFilterConfig] {
        &self.l_filter_configs
    }

    /// Pane-freeze points in insertion order.
    pub fn freeze_configs(&self) -> &[SpecFreezeConfig] {
        &self.l_freeze_configs
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region PropertyLookup

    /// Get or create the property addressed by `selector`.
    ///
    /// Fails when `selector` is not a direct member access on `M`. Selectors
    /// built for another model do not type-check:
    ///
    /// ```compile_fail
    /// use fluentsheet_conf::{member, ModelConfiguration, SheetModel, SpecMemberDescriptor};
    ///
    /// struct User {
    ///     id: i64,
    /// }
    /// struct Invoice {
    ///     total: f64,
    /// }
    /// impl SheetModel for User {
    ///     fn members() -> Vec<SpecMemberDescriptor> {
    ///         vec![SpecMemberDescriptor::new("id")]
    ///     }
    /// }
    ///
    /// let mut fc = ModelConfiguration::<User>::new();
    /// fc.property(&member!(Invoice, total));
    /// ```
    pub fn property(
        &mut self,
        selector: &MemberSelector<M>,
    ) -> Result<&mut PropertyConfiguration, ConfError> {
        let c_member = selector.member_name()?;
        Ok(self.property_by_name(c_member))
    }

    /// Get or create the property for `member`.
    pub fn property_by_name(&mut self, member: &str) -> &mut PropertyConfiguration {
        self.dict_property_configs
            .entry(member.to_string())
            .or_insert_with(|| {
                trace!(member, "Creating property configuration");
                PropertyConfiguration::new()
            })
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region IgnoreList

    /// Ignore the selected members in both directions.
    ///
    /// Members without a configuration are skipped. All selectors are resolved
    /// before any property is touched.
    pub fn set_ignore(&mut self, selectors: &[MemberSelector<M>]) -> Result<&mut Self, ConfError> {
        let l_members = selectors
            .iter()
            .map(MemberSelector::member_name)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.set_ignore_by_name(l_members))
    }

    /// Ignore the named members in both directions; unknown names are skipped.
    pub fn set_ignore_by_name<I, S>(&mut self, members: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for c_member in members {
            let c_member = c_member.as_ref();
            match self.dict_property_configs.get_mut(c_member) {
                Some(pc) => {
                    pc.is_ignored(true, true);
                }
                None => trace!(member = c_member, "Ignore skipped: member not configured"),
            }
        }
        self
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region AnnotationImport

    /// Apply member annotations as property defaults.
    ///
    /// Overwrites titles and indices set earlier through the fluent API, so call
    /// it before any per-property overrides.
    pub fn from_annotations(&mut self) -> &mut Self {
        let Self {
            dict_property_configs,
            l_members,
            ..
        } = self;

        for member in l_members.iter() {
            let pc = dict_property_configs
                .entry(member.name.clone())
                .or_default();

            match &member.display {
                Some(display) => {
                    match &display.name {
                        Some(c_name) => pc.has_excel_title(c_name.as_str()),
                        None => pc.reset_excel_title(),
                    };
                    if let Some(n_order) = display.order {
                        pc.has_excel_index(n_order);
                    }
                }
                None => {
                    pc.has_excel_title(member.name.as_str());
                }
            }

            if let Some(c_display_format) = &member.display_format {
                pc.has_data_formatter(derive_formatter_from_display_format(c_display_format));
            }

            if !pc.cell_config().index().is_resolved() {
                pc.has_auto_index();
            }

            debug!(
                member = %member.name,
                index = %pc.cell_config().index(),
                title = ?pc.cell_config().title(),
                "Imported member annotations"
            );
        }

        self
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region AutoIndex

    /// Assign column indices to auto-indexed properties.
    ///
    /// Members are visited in declaration order. Each auto-indexed, exported
    /// property takes the lowest index at or above a shared cursor that no other
    /// property holds; the cursor then moves past it. Explicit indices act as
    /// reserved slots. Duplicate explicit indices are left as they are.
    ///
    /// Indices from an earlier pass are released first, so re-running after a
    /// configuration change yields the same layout as a single fresh pass.
    pub fn auto_index(&mut self) {
        let Self {
            dict_property_configs,
            l_members,
            ..
        } = self;

        for pc in dict_property_configs.values_mut() {
            pc.release_resolved_index();
        }

        let mut n_idx_cursor = N_AUTO_INDEX_SEED;
        for member in l_members.iter() {
            let Some(cell_config) = dict_property_configs
                .get(&member.name)
                .map(PropertyConfiguration::cell_config)
            else {
                continue;
            };
            if cell_config.if_export_ignored() || !cell_config.if_auto_index() {
                trace!(member = %member.name, "Auto index skipped");
                continue;
            }

            while is_index_claimed_by_other(dict_property_configs, &member.name, n_idx_cursor) {
                n_idx_cursor += 1;
            }

            if let Some(pc) = dict_property_configs.get_mut(&member.name) {
                pc.assign_resolved_index(n_idx_cursor);
            }
            debug!(member = %member.name, index = n_idx_cursor, "Auto index assigned");
            n_idx_cursor += 1;
        }
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region SheetLevelConfigs

    /// Append a summary row applying `formula` over `columns`.
    pub fn has_statistics(
        &mut self,
        name: impl Into<String>,
        formula: impl Into<String>,
        columns: &[usize],
    ) -> &mut Self {
        self.l_statistics_configs.push(SpecStatisticsConfig {
            name: name.into(),
            formula: formula.into(),
            columns: columns.to_vec(),
        });
        self
    }

    /// Append an auto-filter region. `last_row = None` resolves at write time.
    pub fn has_filter(
        &mut self,
        first_column: usize,
        last_column: usize,
        first_row: usize,
        last_row: Option<usize>,
    ) -> &mut Self {
        self.l_filter_configs.push(SpecFilterConfig {
            first_column,
            last_column,
            first_row,
            last_row,
        });
        self
    }

    /// Append a pane-freeze point.
    pub fn has_freeze(
        &mut self,
        column_split: usize,
        row_split: usize,
        left_most_column: usize,
        top_most_row: usize,
    ) -> &mut Self {
        self.l_freeze_configs.push(SpecFreezeConfig {
            column_split,
            row_split,
            left_most_column,
            top_most_row,
        });
        self
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
    // #region Contract

    /// Map members to column positions in an existing header row.
    ///
    /// Import-ignored properties are excluded. A resolved index is used as-is;
    /// otherwise the property is located by its effective title. Properties
    /// whose title is absent from `header_titles` are omitted.
    pub fn discover_indices_by_title(&self, header_titles: &[String]) -> BTreeMap<String, usize> {
        let mut dict_indices = BTreeMap::new();
        for (c_member, pc) in &self.dict_property_configs {
            let cell_config = pc.cell_config();
            if cell_config.if_import_ignored() {
                continue;
            }

            let n_idx = cell_config.index().position().or_else(|| {
                derive_header_title(c_member, cell_config.title())
                    .and_then(|c_title| select_title_position(header_titles, c_title))
            });
            match n_idx {
                Some(n_idx) => {
                    dict_indices.insert(c_member.clone(), n_idx);
                }
                None => trace!(member = %c_member, "Title not found in header row"),
            }
        }
        dict_indices
    }

    /// Immutable snapshot for writers and readers.
    ///
    /// Columns are ordered by index, unresolved last; ties follow declaration
    /// order, and members outside the declared list come after declared ones.
    pub fn freeze(&self) -> SpecModelLayout {
        let dict_decl_pos: BTreeMap<&str, usize> = self
            .l_members
            .iter()
            .enumerate()
            .map(|(n_pos, member)| (member.name.as_str(), n_pos))
            .collect();

        let mut l_columns: Vec<SpecColumnLayout> = self
            .dict_property_configs
            .iter()
            .map(|(c_member, pc)| {
                let cell_config = pc.cell_config();
                SpecColumnLayout {
                    member: c_member.clone(),
                    index: cell_config.index(),
                    if_auto_index: cell_config.if_auto_index(),
                    header: derive_header_title(c_member, cell_config.title())
                        .map(ToString::to_string),
                    formatter: cell_config.formatter().map(ToString::to_string),
                    if_allow_merge: cell_config.if_allow_merge(),
                    if_export_ignored: cell_config.if_export_ignored(),
                    if_import_ignored: cell_config.if_import_ignored(),
                    convert: cell_config.convert().cloned(),
                }
            })
            .collect();

        l_columns.sort_by_key(|col| {
            (
                col.index.position().unwrap_or(usize::MAX),
                dict_decl_pos
                    .get(col.member.as_str())
                    .copied()
                    .unwrap_or(usize::MAX),
            )
        });

        SpecModelLayout {
            columns: l_columns,
            statistics: self.l_statistics_configs.clone(),
            filters: self.l_filter_configs.clone(),
            freezes: self.l_freeze_configs.clone(),
        }
    }

    // #endregion
    ////////////////////////////////////////////////////////////////////////////
}

fn is_index_claimed_by_other(
    dict_property_configs: &BTreeMap<String, PropertyConfiguration>,
    member: &str,
    index: usize,
) -> bool {
    dict_property_configs.iter().any(|(c_member, pc)| {
        c_member != member && pc.cell_config().index().position() == Some(index)
    })
}

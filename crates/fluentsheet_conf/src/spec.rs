//! Cell/sheet configuration models and top-level error types.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Column position of one property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnumCellIndex {
    /// No position yet; automatic resolution may assign one.
    #[default]
    Unresolved,
    /// Zero-based column position.
    At(usize),
}

impl EnumCellIndex {
    /// Zero-based position, if resolved.
    pub fn position(self) -> Option<usize> {
        match self {
            Self::Unresolved => None,
            Self::At(n_idx) => Some(n_idx),
        }
    }

    /// Whether a position has been assigned.
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::At(_))
    }
}

impl fmt::Display for EnumCellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved => write!(f, "unresolved"),
            Self::At(n_idx) => write!(f, "{n_idx}"),
        }
    }
}

/// Cell value handed to `convert` and to downstream writers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

impl EnumCellValue {
    /// Whether the value renders as an empty cell.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::String(s) => s.is_empty(),
            Self::Number(_) | Self::Boolean(_) => false,
        }
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for EnumCellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for EnumCellValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl<T: Into<EnumCellValue>> From<Option<T>> for EnumCellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

/// Value transform applied before a cell is written.
pub type FnCellConvert = Arc<dyn Fn(EnumCellValue) -> EnumCellValue + Send + Sync>;

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellConfig

/// Per-property cell placement/format state.
///
/// Fields are mutated only through [`crate::PropertyConfiguration`], which keeps
/// `index` and `if_auto_index` from both being authoritative at once.
#[derive(Clone, Default)]
pub struct SpecCellConfig {
    pub(crate) index: EnumCellIndex,
    pub(crate) if_auto_index: bool,
    pub(crate) title: Option<String>,
    pub(crate) formatter: Option<String>,
    pub(crate) convert: Option<FnCellConvert>,
    pub(crate) if_allow_merge: bool,
    pub(crate) if_export_ignored: bool,
    pub(crate) if_import_ignored: bool,
    // Set when `index` was assigned by automatic resolution.
    pub(crate) if_index_from_auto: bool,
}

impl SpecCellConfig {
    /// Target column position.
    pub fn index(&self) -> EnumCellIndex {
        self.index
    }

    /// Whether automatic index resolution runs for this property.
    pub fn if_auto_index(&self) -> bool {
        self.if_auto_index
    }

    /// Column header. `None` falls back to the member name, `Some("")` suppresses it.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Value-format pattern applied on write.
    pub fn formatter(&self) -> Option<&str> {
        self.formatter.as_deref()
    }

    /// Value transform applied before writing.
    pub fn convert(&self) -> Option<&FnCellConvert> {
        self.convert.as_ref()
    }

    /// Whether adjacent equal values in this column may be merged.
    pub fn if_allow_merge(&self) -> bool {
        self.if_allow_merge
    }

    /// Suppressed when writing.
    pub fn if_export_ignored(&self) -> bool {
        self.if_export_ignored
    }

    /// Suppressed when reading.
    pub fn if_import_ignored(&self) -> bool {
        self.if_import_ignored
    }

    /// Run `value` through `convert`, or return it unchanged.
    pub fn apply_convert(&self, value: EnumCellValue) -> EnumCellValue {
        match &self.convert {
            Some(fn_convert) => fn_convert(value),
            None => value,
        }
    }
}

impl fmt::Debug for SpecCellConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecCellConfig")
            .field("index", &self.index)
            .field("if_auto_index", &self.if_auto_index)
            .field("title", &self.title)
            .field("formatter", &self.formatter)
            .field("convert", &self.convert.as_ref().map(|_| "<fn>"))
            .field("if_allow_merge", &self.if_allow_merge)
            .field("if_export_ignored", &self.if_export_ignored)
            .field("if_import_ignored", &self.if_import_ignored)
            .field("if_index_from_auto", &self.if_index_from_auto)
            .finish()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetLevelConfigs

/// One summary row: `formula` applied over each of `columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecStatisticsConfig {
    /// Row label (e.g. `Total`).
    pub name: String,
    /// Aggregate function name (e.g. `SUM`, `AVERAGE`).
    pub formula: String,
    /// Zero-based column indices aggregated by `formula`.
    pub columns: Vec<usize>,
}

/// One rectangular auto-filter region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecFilterConfig {
    /// First column index (inclusive).
    pub first_column: usize,
    /// Last column index (inclusive).
    pub last_column: usize,
    /// First row index (inclusive).
    pub first_row: usize,
    /// Last row index (inclusive); `None` resolves to the last written row.
    pub last_row: Option<usize>,
}

/// One pane-freeze point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecFreezeConfig {
    /// Number of frozen columns.
    pub column_split: usize,
    /// Number of frozen rows.
    pub row_split: usize,
    /// Left-most visible column in the scrolling pane.
    pub left_most_column: usize,
    /// Top-most visible row in the scrolling pane.
    pub top_most_row: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MemberDescriptors

/// Display metadata attached to a model member.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecDisplayMeta {
    /// Human-readable member name.
    pub name: Option<String>,
    /// Explicit column order.
    pub order: Option<usize>,
}

/// One named member of a model, with its optional annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecMemberDescriptor {
    /// Declared member name.
    pub name: String,
    /// Display metadata, if annotated.
    pub display: Option<SpecDisplayMeta>,
    /// Display-format string such as `{0:yyyy-MM-dd}`, if annotated.
    pub display_format: Option<String>,
}

impl SpecMemberDescriptor {
    /// Member without annotations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display: None,
            display_format: None,
        }
    }

    /// Attach display metadata.
    pub fn with_display(mut self, name: Option<&str>, order: Option<usize>) -> Self {
        self.display = Some(SpecDisplayMeta {
            name: name.map(ToString::to_string),
            order,
        });
        self
    }

    /// Attach a display-format string.
    pub fn with_display_format(mut self, display_format: impl Into<String>) -> Self {
        self.display_format = Some(display_format.into());
        self
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LayoutSnapshot

/// Frozen per-property contract consumed by writers/readers.
#[derive(Clone, Serialize, Deserialize)]
pub struct SpecColumnLayout {
    /// Declared member name.
    pub member: String,
    /// Resolved column position.
    pub index: EnumCellIndex,
    /// Whether the position came from automatic resolution.
    pub if_auto_index: bool,
    /// Effective header text; `None` means no header cell is written.
    pub header: Option<String>,
    /// Value-format pattern.
    pub formatter: Option<String>,
    /// Merge adjacent equal values.
    pub if_allow_merge: bool,
    /// Suppressed when writing.
    pub if_export_ignored: bool,
    /// Suppressed when reading.
    pub if_import_ignored: bool,
    /// Value transform applied before writing.
    #[serde(skip)]
    pub convert: Option<FnCellConvert>,
}

impl SpecColumnLayout {
    /// Run `value` through `convert`, or return it unchanged.
    pub fn apply_convert(&self, value: EnumCellValue) -> EnumCellValue {
        match &self.convert {
            Some(fn_convert) => fn_convert(value),
            None => value,
        }
    }
}

impl fmt::Debug for SpecColumnLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecColumnLayout")
            .field("member", &self.member)
            .field("index", &self.index)
            .field("if_auto_index", &self.if_auto_index)
            .field("header", &self.header)
            .field("formatter", &self.formatter)
            .field("if_allow_merge", &self.if_allow_merge)
            .field("if_export_ignored", &self.if_export_ignored)
            .field("if_import_ignored", &self.if_import_ignored)
            .field("convert", &self.convert.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Immutable snapshot of a finished model configuration.
///
/// Columns are sorted by resolved index; unresolved columns come last.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecModelLayout {
    /// Per-property contracts in column order.
    pub columns: Vec<SpecColumnLayout>,
    /// Summary rows in emission order.
    pub statistics: Vec<SpecStatisticsConfig>,
    /// Auto-filter regions.
    pub filters: Vec<SpecFilterConfig>,
    /// Pane-freeze points.
    pub freezes: Vec<SpecFreezeConfig>,
}

impl SpecModelLayout {
    /// Columns a writer emits.
    pub fn export_columns(&self) -> impl Iterator<Item = &SpecColumnLayout> {
        self.columns.iter().filter(|col| !col.if_export_ignored)
    }

    /// Columns a reader populates.
    pub fn import_columns(&self) -> impl Iterator<Item = &SpecColumnLayout> {
        self.columns.iter().filter(|col| !col.if_import_ignored)
    }

    /// Locate a column by member name.
    pub fn column(&self, member: &str) -> Option<&SpecColumnLayout> {
        self.columns.iter().find(|col| col.member == member)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Configuration-time failures. Raised at the offending call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfError {
    /// Selector does not reduce to a direct member access.
    #[error("Selector must be a simple member access, got: {expr}")]
    InvalidSelector {
        /// Rendered selector expression.
        expr: String,
    },
    /// Member access has no owning type.
    #[error("Member {member:?} does not have a declaring type.")]
    MissingDeclaringType {
        /// Member name.
        member: String,
    },
    /// Member access is declared on a type other than the configured model.
    #[error("Member {member:?} belongs to {declaring_type}, not {model}.")]
    ForeignMember {
        /// Member name.
        member: String,
        /// Type the member was selected on.
        declaring_type: String,
        /// Configured model type.
        model: String,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

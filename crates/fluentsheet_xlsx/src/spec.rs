//! Sheet format/options/report models and errors.

use rust_xlsxwriter::XlsxError;
use thiserror::Error;

use crate::conf::derive_default_sheet_formats;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format preset for one sheet region (header, records, statistics).
///
/// Unset fields inherit from the preset they are overlaid on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold text.
    pub bold: Option<bool>,
    /// Horizontal alignment: `general`, `left`, `center` or `right`.
    pub align: Option<String>,
    /// Vertical alignment: `top`, `vcenter` or `bottom`.
    pub valign: Option<String>,
    /// Border style code for all sides (`1` thin .. `7` hair).
    pub border: Option<i64>,
    /// Number format code; column formatters override it per column.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: patch.font_name.or_else(|| self.font_name.clone()),
            font_size: patch.font_size.or(self.font_size),
            bold: patch.bold.or(self.bold),
            align: patch.align.or_else(|| self.align.clone()),
            valign: patch.valign.or_else(|| self.valign.clone()),
            border: patch.border.or(self.border),
            num_format: patch.num_format.or_else(|| self.num_format.clone()),
            bg_color: patch.bg_color.or_else(|| self.bg_color.clone()),
        }
    }

    /// Overlay a column formatter as the number format.
    pub fn with_num_format(&self, num_format: Option<&str>) -> SpecCellFormat {
        self.with_(SpecCellFormat {
            num_format: num_format.map(ToString::to_string),
            ..Default::default()
        })
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Per-sheet write options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetWriteOptions {
    /// Header row format.
    pub fmt_header: SpecCellFormat,
    /// Base format for record cells; a column formatter overrides `num_format`.
    pub fmt_body: SpecCellFormat,
    /// Format for statistics labels and formulas.
    pub fmt_statistics: SpecCellFormat,
    /// Write the header row.
    pub if_write_header: bool,
}

impl Default for SpecSheetWriteOptions {
    fn default() -> Self {
        let dict_fmt = derive_default_sheet_formats();
        let fmt_preset = |key: &str| dict_fmt.get(key).cloned().unwrap_or_default();
        Self {
            fmt_header: fmt_preset("header"),
            fmt_body: fmt_preset("body"),
            fmt_statistics: fmt_preset("statistics"),
            if_write_header: true,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Vertical merge applied to one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetMerge {
    /// Sheet column index.
    pub col_idx: usize,
    /// First merged sheet row (inclusive).
    pub row_idx_start: usize,
    /// Last merged sheet row (inclusive).
    pub row_idx_end: usize,
}

/// Per-sheet write report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecSheetReport {
    /// Worksheet name.
    pub sheet_name: String,
    /// Number of record rows written.
    pub n_rows_data: usize,
    /// Sheet column indices written, ascending.
    pub cols_written: Vec<usize>,
    /// Vertical merges applied.
    pub merges: Vec<SpecSheetMerge>,
    /// Number of statistics rows written.
    pub n_rows_statistics: usize,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecSheetReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        tracing::warn!(sheet = %self.sheet_name, "{}", msg.as_ref());
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failures while applying a layout to a worksheet.
#[derive(Debug, Error)]
pub enum XlsxApplyError {
    /// Row index does not fit the worksheet row type.
    #[error("row index overflow: {0}")]
    RowOverflow(usize),
    /// Column index does not fit the worksheet column type.
    #[error("column index overflow: {0}")]
    ColumnOverflow(usize),
    /// Underlying writer rejected an operation.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

//! `fluentsheet_xlsx` v1:
//! Applies a frozen `fluentsheet_conf` layout to in-memory XLSX worksheets.
//!
//! Architecture:
//! - `conf`   : sheet limits and default format presets
//! - `spec`   : formats/options/reports and errors
//! - `util`   : pure helper functions
//! - `writer` : record writer over `rust_xlsxwriter`
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, N_ROW_DATA_START,
    N_ROW_HEADER, TUP_EXCEL_ILLEGAL, derive_default_sheet_formats,
};
pub use spec::{
    SpecCellFormat, SpecSheetMerge, SpecSheetReport, SpecSheetWriteOptions, XlsxApplyError,
};
pub use util::{
    create_statistics_formula, derive_cell_reference, derive_column_letter,
    derive_unique_sheet_name, plan_vertical_value_runs, sanitize_sheet_name,
};
pub use writer::{SheetRecord, SheetWriter, write_records_to_worksheet};

//! Sheet writer that applies a frozen model layout to worksheets.

use std::collections::{BTreeMap, BTreeSet};

use fluentsheet_conf::{EnumCellValue, SpecColumnLayout, SpecModelLayout};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use tracing::debug;

use crate::conf::{N_ROW_DATA_START, N_ROW_HEADER};
use crate::spec::{
    SpecCellFormat, SpecSheetMerge, SpecSheetReport, SpecSheetWriteOptions, XlsxApplyError,
};
use crate::util::{
    cast_col_num, cast_row_num, create_statistics_formula, derive_unique_sheet_name,
    plan_vertical_value_runs, sanitize_sheet_name,
};

/// Source of per-member cell values for one record.
pub trait SheetRecord {
    /// Raw value of `member`, before `convert`.
    fn cell_value(&self, member: &str) -> EnumCellValue;
}

/// Stateful workbook writer.
///
/// The workbook stays in memory; callers persist it via
/// [`Self::save_to_buffer`] or [`Self::into_workbook`].
pub struct SheetWriter {
    workbook: Workbook,
    options: SpecSheetWriteOptions,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecSheetReport>,
}

impl SheetWriter {
    /// Create writer with the given per-sheet options.
    pub fn new(options: SpecSheetWriteOptions) -> Self {
        Self {
            workbook: Workbook::new(),
            options,
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
        }
    }

    /// Return immutable snapshot of per-sheet write reports.
    pub fn report(&self) -> Vec<SpecSheetReport> {
        self.l_reports.clone()
    }

    /// Add one sheet holding `records` laid out by `layout`.
    pub fn write_sheet<R: SheetRecord>(
        &mut self,
        sheet_name: &str,
        layout: &SpecModelLayout,
        records: &[R],
    ) -> Result<&SpecSheetReport, XlsxApplyError> {
        let sheet_name_unique = derive_unique_sheet_name(
            &mut self.set_sheet_names_existing,
            &sanitize_sheet_name(sheet_name, "_"),
        );

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&sheet_name_unique)?;

        let mut report = write_records_to_worksheet(worksheet, layout, records, &self.options)?;
        report.sheet_name = sheet_name_unique;

        self.l_reports.push(report);
        Ok(&self.l_reports[self.l_reports.len() - 1])
    }

    /// Serialize the workbook to XLSX bytes.
    pub fn save_to_buffer(&mut self) -> Result<Vec<u8>, XlsxApplyError> {
        Ok(self.workbook.save_to_buffer()?)
    }

    /// Hand the workbook over to the caller.
    pub fn into_workbook(self) -> Workbook {
        self.workbook
    }
}

/// Write header, records, statistics, filters and freezes onto `worksheet`.
///
/// Header goes to row 0 and records start at row 1, one column per exported
/// property at its resolved index. Columns without a resolved index are
/// skipped with a warning. Statistics rows follow the last record row.
pub fn write_records_to_worksheet<R: SheetRecord>(
    worksheet: &mut Worksheet,
    layout: &SpecModelLayout,
    records: &[R],
    options: &SpecSheetWriteOptions,
) -> Result<SpecSheetReport, XlsxApplyError> {
    let mut report = SpecSheetReport {
        n_rows_data: records.len(),
        ..Default::default()
    };

    let mut dict_cols_by_idx: BTreeMap<usize, &SpecColumnLayout> = BTreeMap::new();
    for col in layout.export_columns() {
        let Some(n_idx_col) = col.index.position() else {
            report.warn(format!(
                "Column {:?} has no resolved index; run auto_index() before freezing.",
                col.member
            ));
            continue;
        };
        if let Some(col_prev) = dict_cols_by_idx.insert(n_idx_col, col) {
            report.warn(format!(
                "Columns {:?} and {:?} share index {n_idx_col}; keeping {:?}.",
                col_prev.member, col.member, col.member
            ));
        }
    }

    let fmt_header = create_cell_format(&options.fmt_header);
    let fmt_statistics = create_cell_format(&options.fmt_statistics);

    if options.if_write_header {
        for (n_idx_col, col) in &dict_cols_by_idx {
            if let Some(c_header) = &col.header {
                worksheet.write_string_with_format(
                    cast_row_num(N_ROW_HEADER)?,
                    cast_col_num(*n_idx_col)?,
                    c_header,
                    &fmt_header,
                )?;
            }
        }
    }

    for (n_idx_col, col) in &dict_cols_by_idx {
        let fmt_body = create_cell_format(&options.fmt_body.with_num_format(col.formatter.as_deref()));

        let l_values: Vec<EnumCellValue> = records
            .iter()
            .map(|record| col.apply_convert(record.cell_value(&col.member)))
            .collect();

        for (n_idx_row, value) in l_values.iter().enumerate() {
            write_cell_with_format(
                worksheet,
                N_ROW_DATA_START + n_idx_row,
                *n_idx_col,
                value,
                &fmt_body,
            )?;
        }

        if !col.if_allow_merge {
            continue;
        }
        for (n_idx_run_start, n_idx_run_end) in plan_vertical_value_runs(&l_values) {
            let n_row_start = N_ROW_DATA_START + n_idx_run_start;
            let n_row_end = N_ROW_DATA_START + n_idx_run_end;
            worksheet.merge_range(
                cast_row_num(n_row_start)?,
                cast_col_num(*n_idx_col)?,
                cast_row_num(n_row_end)?,
                cast_col_num(*n_idx_col)?,
                "",
                &fmt_body,
            )?;
            write_cell_with_format(
                worksheet,
                n_row_start,
                *n_idx_col,
                &l_values[n_idx_run_start],
                &fmt_body,
            )?;
            report.merges.push(SpecSheetMerge {
                col_idx: *n_idx_col,
                row_idx_start: n_row_start,
                row_idx_end: n_row_end,
            });
        }
    }
    report.cols_written = dict_cols_by_idx.keys().copied().collect();

    let n_row_data_last = N_ROW_HEADER + records.len();
    for (n_offset, stat) in layout.statistics.iter().enumerate() {
        let n_row_stat = n_row_data_last + 1 + n_offset;
        worksheet.write_string_with_format(
            cast_row_num(n_row_stat)?,
            0,
            &stat.name,
            &fmt_statistics,
        )?;

        if stat.columns.contains(&0) {
            report.warn(format!(
                "Statistics {:?} aggregates column 0; its formula replaces the row label.",
                stat.name
            ));
        }

        if records.is_empty() {
            report.warn(format!(
                "Statistics {:?} has no record rows to aggregate; formulas skipped.",
                stat.name
            ));
        } else {
            for n_idx_col in &stat.columns {
                worksheet.write_formula_with_format(
                    cast_row_num(n_row_stat)?,
                    cast_col_num(*n_idx_col)?,
                    create_statistics_formula(
                        &stat.formula,
                        *n_idx_col,
                        N_ROW_DATA_START,
                        n_row_data_last,
                    )
                    .as_str(),
                    &fmt_statistics,
                )?;
            }
        }
        report.n_rows_statistics += 1;
    }

    if layout.filters.len() > 1 {
        report.warn(format!(
            "{} filters configured; a worksheet holds one, only the last is applied.",
            layout.filters.len()
        ));
    }
    for filter in &layout.filters {
        worksheet.autofilter(
            cast_row_num(filter.first_row)?,
            cast_col_num(filter.first_column)?,
            cast_row_num(filter.last_row.unwrap_or(n_row_data_last))?,
            cast_col_num(filter.last_column)?,
        )?;
    }

    if layout.freezes.len() > 1 {
        report.warn(format!(
            "{} freezes configured; a worksheet holds one, only the last is applied.",
            layout.freezes.len()
        ));
    }
    for freeze in &layout.freezes {
        worksheet.set_freeze_panes(
            cast_row_num(freeze.row_split)?,
            cast_col_num(freeze.column_split)?,
        )?;
        worksheet.set_freeze_panes_top_cell(
            cast_row_num(freeze.top_most_row)?,
            cast_col_num(freeze.left_most_column)?,
        )?;
    }

    debug!(
        n_rows = records.len(),
        n_cols = report.cols_written.len(),
        n_merges = report.merges.len(),
        "Records written to worksheet"
    );
    Ok(report)
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), XlsxApplyError> {
    let n_row = cast_row_num(row_idx)?;
    let n_col = cast_col_num(col_idx)?;
    match value {
        EnumCellValue::None => {
            worksheet.write_blank(n_row, n_col, format)?;
        }
        EnumCellValue::String(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        EnumCellValue::Number(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean_with_format(n_row, n_col, *val, format)?;
        }
    }
    Ok(())
}

fn create_cell_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.as_str());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold == Some(true) {
        format = format.set_bold();
    }
    if let Some(align) = spec.align.as_deref().and_then(derive_format_halign) {
        format = format.set_align(align);
    }
    if let Some(align) = spec.valign.as_deref().and_then(derive_format_valign) {
        format = format.set_align(align);
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.as_str());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }

    format
}

fn derive_format_border(code: i64) -> FormatBorder {
    match code {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

// Horizontal names only; vertical names are ignored here.
fn derive_format_halign(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        _ => None,
    }
}

fn derive_format_valign(valign: &str) -> Option<FormatAlign> {
    match valign.trim().to_ascii_lowercase().as_str() {
        "top" => Some(FormatAlign::Top),
        "vcenter" | "center" => Some(FormatAlign::VerticalCenter),
        "bottom" => Some(FormatAlign::Bottom),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use fluentsheet_conf::{ModelConfiguration, SheetModel, SpecMemberDescriptor};

    use super::*;

    struct Sale {
        region: &'static str,
        product: &'static str,
        amount: f64,
        internal: &'static str,
    }

    impl SheetModel for Sale {
        fn members() -> Vec<SpecMemberDescriptor> {
            vec![
                SpecMemberDescriptor::new("region").with_display(Some("Region"), None),
                SpecMemberDescriptor::new("product").with_display(Some("Product"), None),
                SpecMemberDescriptor::new("amount")
                    .with_display(Some("Amount"), None)
                    .with_display_format("{0:#,##0.00}"),
                SpecMemberDescriptor::new("internal"),
            ]
        }
    }

    impl SheetRecord for Sale {
        fn cell_value(&self, member: &str) -> EnumCellValue {
            match member {
                "region" => self.region.into(),
                "product" => self.product.into(),
                "amount" => self.amount.into(),
                "internal" => self.internal.into(),
                _ => EnumCellValue::None,
            }
        }
    }

    fn sample_sales() -> Vec<Sale> {
        vec![
            Sale {
                region: "North",
                product: "Tea",
                amount: 10.0,
                internal: "x",
            },
            Sale {
                region: "North",
                product: "Coffee",
                amount: 12.5,
                internal: "y",
            },
            Sale {
                region: "South",
                product: "Tea",
                amount: 7.25,
                internal: "z",
            },
        ]
    }

    fn sample_layout() -> SpecModelLayout {
        let mut fc = ModelConfiguration::<Sale>::new();
        fc.from_annotations();
        fc.property_by_name("region").is_merge_enabled();
        fc.property_by_name("product")
            .has_convert(|value| match value {
                EnumCellValue::String(s) => EnumCellValue::String(s.to_uppercase()),
                other => other,
            });
        fc.set_ignore_by_name(["internal"])
            .has_statistics("Total", "SUM", &[2])
            .has_filter(0, 2, 0, None)
            .has_freeze(0, 1, 0, 1);
        fc.auto_index();
        fc.freeze()
    }

    #[test]
    fn test_write_sheet_applies_layout_and_reports() {
        let mut writer = SheetWriter::new(SpecSheetWriteOptions::default());
        let report = writer
            .write_sheet("Sales/2024", &sample_layout(), &sample_sales())
            .expect("write sheet")
            .clone();

        assert_eq!(report.sheet_name, "Sales_2024");
        assert_eq!(report.n_rows_data, 3);
        assert_eq!(report.cols_written, vec![0, 1, 2]);
        assert_eq!(
            report.merges,
            vec![SpecSheetMerge {
                col_idx: 0,
                row_idx_start: 1,
                row_idx_end: 2,
            }]
        );
        assert_eq!(report.n_rows_statistics, 1);
        assert!(report.warnings.is_empty());

        let v_bytes = writer.save_to_buffer().expect("save");
        assert!(v_bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_write_sheet_deduplicates_sheet_names() {
        let mut writer = SheetWriter::new(SpecSheetWriteOptions::default());
        let layout = sample_layout();
        writer
            .write_sheet("Sales", &layout, &sample_sales())
            .expect("first");
        writer
            .write_sheet("Sales", &layout, &sample_sales())
            .expect("second");

        let l_names: Vec<String> = writer
            .report()
            .into_iter()
            .map(|report| report.sheet_name)
            .collect();
        assert_eq!(l_names, vec!["Sales".to_string(), "Sales__2".to_string()]);
    }

    #[test]
    fn test_unresolved_and_duplicate_columns_are_reported() {
        let mut fc = ModelConfiguration::<Sale>::new();
        fc.property_by_name("region").has_auto_index();
        fc.property_by_name("product").has_excel_index(0);
        fc.property_by_name("amount").has_excel_index(0);
        let layout = fc.freeze();

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let report = write_records_to_worksheet(
            worksheet,
            &layout,
            &sample_sales(),
            &SpecSheetWriteOptions::default(),
        )
        .expect("write");

        assert_eq!(report.cols_written, vec![0]);
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings.iter().any(|w| w.contains("\"region\"")));
    }

    #[test]
    fn test_statistics_without_records_skip_formulas() {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let report = write_records_to_worksheet::<Sale>(
            worksheet,
            &sample_layout(),
            &[],
            &SpecSheetWriteOptions {
                if_write_header: false,
                ..Default::default()
            },
        )
        .expect("write");

        assert_eq!(report.n_rows_data, 0);
        assert_eq!(report.n_rows_statistics, 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.merges.is_empty());
    }

    #[test]
    fn test_repeated_filters_freezes_and_label_column_are_reported() {
        let mut layout = sample_layout();
        layout.filters.push(layout.filters[0]);
        layout.freezes.push(layout.freezes[0]);
        layout.statistics[0].columns = vec![0, 2];

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let report = write_records_to_worksheet(
            worksheet,
            &layout,
            &sample_sales(),
            &SpecSheetWriteOptions::default(),
        )
        .expect("write");

        assert_eq!(report.warnings.len(), 3);
        assert!(report.warnings.iter().any(|w| w.contains("2 filters")));
        assert!(report.warnings.iter().any(|w| w.contains("2 freezes")));
        assert!(report.warnings.iter().any(|w| w.contains("column 0")));
    }

    #[test]
    fn test_alignment_names_map_to_their_own_axis() {
        let fmt_valign_top = create_cell_format(&SpecCellFormat {
            valign: Some("top".to_string()),
            ..Default::default()
        });
        assert_eq!(fmt_valign_top, Format::new().set_align(FormatAlign::Top));

        let fmt_align_top = create_cell_format(&SpecCellFormat {
            align: Some("top".to_string()),
            ..Default::default()
        });
        assert_eq!(fmt_align_top, Format::new());

        let fmt_centered = create_cell_format(&SpecCellFormat {
            align: Some("center".to_string()),
            valign: Some("center".to_string()),
            ..Default::default()
        });
        assert_eq!(
            fmt_centered,
            Format::new()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
        );
    }

    #[test]
    fn test_default_options_use_presets() {
        let options = SpecSheetWriteOptions::default();
        assert_eq!(options.fmt_header.bold, Some(true));
        assert_eq!(options.fmt_body.font_size, Some(11));
        assert!(options.if_write_header);
    }
}

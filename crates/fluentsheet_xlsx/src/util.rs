//! Stateless helper utilities used by the sheet writer.

use std::collections::BTreeSet;

use fluentsheet_conf::EnumCellValue;

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::spec::XlsxApplyError;

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let c_name = TUP_EXCEL_ILLEGAL
        .iter()
        .fold(name.to_string(), |c_acc, c_illegal| c_acc.replace(c_illegal, replace_to));
    match c_name.trim() {
        "" => "Sheet".to_string(),
        c_trimmed => c_trimmed.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect(),
    }
}

/// Claim `name` in `set_taken`, suffixing `__2`, `__3`, ... on collision.
///
/// The base is shortened so the suffixed name stays within the sheet-name
/// limit.
pub fn derive_unique_sheet_name(set_taken: &mut BTreeSet<String>, name: &str) -> String {
    let mut c_candidate = name.to_string();
    let mut n_suffix = 1usize;
    while set_taken.contains(&c_candidate) {
        n_suffix += 1;
        let c_suffix = format!("__{n_suffix}");
        let n_len_base = N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_suffix.chars().count());
        c_candidate = name.chars().take(n_len_base).chain(c_suffix.chars()).collect();
    }
    set_taken.insert(c_candidate.clone());
    c_candidate
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellReferences

/// Zero-based column index to letters (`0 -> A`, `26 -> AA`).
pub fn derive_column_letter(col_idx: usize) -> String {
    let mut l_chars = Vec::new();
    let mut n_rest = col_idx;
    loop {
        l_chars.push((b'A' + (n_rest % 26) as u8) as char);
        if n_rest < 26 {
            break;
        }
        n_rest = n_rest / 26 - 1;
    }
    l_chars.iter().rev().collect()
}

/// Zero-based `(row, col)` to an A1 reference.
pub fn derive_cell_reference(row_idx: usize, col_idx: usize) -> String {
    format!("{}{}", derive_column_letter(col_idx), row_idx + 1)
}

/// Build `=FORMULA(A2:A9)` over one column between two zero-based rows.
pub fn create_statistics_formula(
    formula: &str,
    col_idx: usize,
    row_idx_first: usize,
    row_idx_last: usize,
) -> String {
    format!(
        "={formula}({}:{})",
        derive_cell_reference(row_idx_first, col_idx),
        derive_cell_reference(row_idx_last, col_idx)
    )
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MergeUtils

/// Inclusive `(start, end)` runs of equal, non-empty adjacent values.
///
/// Runs of length one are not reported.
pub fn plan_vertical_value_runs(values: &[EnumCellValue]) -> Vec<(usize, usize)> {
    let mut l_runs = Vec::new();
    let n_rows = values.len();

    let mut n_row_idx_start = 0;
    while n_row_idx_start < n_rows {
        let val_current = &values[n_row_idx_start];
        if val_current.is_empty() {
            n_row_idx_start += 1;
            continue;
        }

        let mut n_row_idx_next = n_row_idx_start + 1;
        while n_row_idx_next < n_rows && values[n_row_idx_next] == *val_current {
            n_row_idx_next += 1;
        }

        if n_row_idx_next - n_row_idx_start > 1 {
            l_runs.push((n_row_idx_start, n_row_idx_next - 1));
        }
        n_row_idx_start = n_row_idx_next;
    }

    l_runs
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Casts

/// Convert a row index to the worksheet row type, bounded by the sheet size.
pub fn cast_row_num(value: usize) -> Result<u32, XlsxApplyError> {
    if value >= N_NROWS_EXCEL_MAX {
        return Err(XlsxApplyError::RowOverflow(value));
    }
    u32::try_from(value).map_err(|_| XlsxApplyError::RowOverflow(value))
}

/// Convert a column index to the worksheet column type, bounded by the sheet size.
pub fn cast_col_num(value: usize) -> Result<u16, XlsxApplyError> {
    if value >= N_NCOLS_EXCEL_MAX {
        return Err(XlsxApplyError::ColumnOverflow(value));
    }
    u16::try_from(value).map_err(|_| XlsxApplyError::ColumnOverflow(value))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("a/b:c", "_"), "a_b_c");
        assert_eq!(sanitize_sheet_name("  ", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40), "_").len(), 31);
    }

    #[test]
    fn test_derive_unique_sheet_name_suffixes_within_limit() {
        let mut set_taken = BTreeSet::new();
        assert_eq!(derive_unique_sheet_name(&mut set_taken, "Sales"), "Sales");
        assert_eq!(derive_unique_sheet_name(&mut set_taken, "Sales"), "Sales__2");
        assert_eq!(derive_unique_sheet_name(&mut set_taken, "Sales"), "Sales__3");

        let c_long = "y".repeat(31);
        assert_eq!(derive_unique_sheet_name(&mut set_taken, &c_long), c_long);
        let c_second = derive_unique_sheet_name(&mut set_taken, &c_long);
        assert_eq!(c_second.chars().count(), 31);
        assert!(c_second.ends_with("__2"));
    }

    #[test]
    fn test_derive_column_letter() {
        assert_eq!(derive_column_letter(0), "A");
        assert_eq!(derive_column_letter(25), "Z");
        assert_eq!(derive_column_letter(26), "AA");
        assert_eq!(derive_column_letter(701), "ZZ");
        assert_eq!(derive_column_letter(702), "AAA");
        assert_eq!(derive_column_letter(16_383), "XFD");
        assert!(derive_column_letter(usize::MAX).chars().all(|c| c.is_ascii_uppercase()));
        assert_eq!(derive_cell_reference(1, 2), "C2");
    }

    #[test]
    fn test_create_statistics_formula() {
        assert_eq!(create_statistics_formula("SUM", 1, 1, 3), "=SUM(B2:B4)");
    }

    #[test]
    fn test_plan_vertical_value_runs_detects_only_contiguous_non_empty_runs() {
        let values = vec![
            EnumCellValue::from("A"),
            EnumCellValue::from("A"),
            EnumCellValue::None,
            EnumCellValue::None,
            EnumCellValue::Number(1.0),
            EnumCellValue::Number(1.0),
            EnumCellValue::Number(1.0),
            EnumCellValue::from("B"),
            EnumCellValue::from(""),
            EnumCellValue::from(""),
        ];

        assert_eq!(plan_vertical_value_runs(&values), vec![(0, 1), (4, 6)]);
        assert!(plan_vertical_value_runs(&[]).is_empty());
    }

    #[test]
    fn test_casts_reject_overflow() {
        assert_eq!(cast_col_num(3).ok(), Some(3));
        assert!(matches!(
            cast_col_num(70_000),
            Err(XlsxApplyError::ColumnOverflow(70_000))
        ));
        assert!(cast_row_num(1_048_575).is_ok());
        assert!(matches!(
            cast_row_num(1_048_576),
            Err(XlsxApplyError::RowOverflow(1_048_576))
        ));
    }
}

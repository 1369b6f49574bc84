//! Stateless helpers shared by annotation import and layout resolution.

use crate::conf::{C_FORMAT_PLACEHOLDER_PREFIX, C_FORMAT_PLACEHOLDER_SUFFIX};

/// Strip display-format syntax (`{0:...}`) down to its bare pattern.
pub fn derive_formatter_from_display_format(display_format: &str) -> String {
    display_format
        .replace(C_FORMAT_PLACEHOLDER_PREFIX, "")
        .replace(C_FORMAT_PLACEHOLDER_SUFFIX, "")
}

/// Effective header for a member: the title, the member name when no title is
/// set, or `None` when the title is explicitly empty.
pub fn derive_header_title<'a>(member: &'a str, title: Option<&'a str>) -> Option<&'a str> {
    match title {
        None => Some(member),
        Some("") => None,
        Some(c_title) => Some(c_title),
    }
}

/// Position of the first header cell equal to `title`.
pub fn select_title_position(header_titles: &[String], title: &str) -> Option<usize> {
    header_titles.iter().position(|c_header| c_header == title)
}

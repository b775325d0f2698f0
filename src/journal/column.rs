//! Column header normalization.
//!
//! Payroll exports label their columns inconsistently ("Department Code",
//! "DEPARTMENT_CODE ", "Monthly Transp."). Every header is reduced to a
//! canonical identifier before any other component looks at the table.

use crate::models::CellValue;

/// The normalized name of the department code column.
pub const DEPARTMENT_COLUMN: &str = "departmentcode";

/// Canonicalizes a header: lower-case, trim, then drop every character that
/// is neither alphanumeric nor an underscore.
///
/// The function is pure and idempotent.
///
/// # Example
///
/// ```
/// use payroll_jv::journal::normalize_column_name;
///
/// assert_eq!(normalize_column_name(" Department Code "), "departmentcode");
/// assert_eq!(normalize_column_name("Retroactive Appraisal/Arrears"), "retroactiveappraisalarrears");
/// assert_eq!(normalize_column_name("emp_id"), "emp_id");
/// ```
pub fn normalize_column_name(raw: &str) -> String {
    raw.to_lowercase()
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Renders a header cell of any type as text.
///
/// Blank headers are named after their position, `Unnamed: {index}`, so
/// that they never collide with a recognised column.
pub fn header_text(cell: &CellValue, index: usize) -> String {
    if cell.is_blank() {
        return format!("Unnamed: {}", index);
    }
    cell.to_string()
}

/// Normalizes a whole header row.
pub fn normalize_header_row(cells: &[CellValue]) -> Vec<String> {
    cells
        .iter()
        .enumerate()
        .map(|(index, cell)| normalize_column_name(&header_text(cell, index)))
        .collect()
}

//! Payroll sheet reader.
//!
//! Reads one sheet of an `.xlsx` or `.xls` workbook with `calamine`. The first
//! row of the sheet's used range is the header; it is normalized before the
//! table is handed to the aggregation engine.

use calamine::{Data, Reader, Sheets, open_workbook_auto};
use std::path::Path;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::journal::normalize_header_row;
use crate::models::{CellValue, PayrollTable};

/// Message reported when a file cannot be opened as a workbook.
pub const INVALID_WORKBOOK: &str = "Invalid Excel file format.";

/// Finds the workbook sheet a user asked for.
///
/// Sheet names are compared with their surrounding whitespace stripped, so a
/// sheet called `"Payroll "` answers to `"Payroll"`. Returns the name as it
/// is stored in the workbook.
///
/// # Example
///
/// ```
/// use payroll_jv::workbook::resolve_sheet_name;
///
/// let names = vec!["Summary".to_string(), " Payroll ".to_string()];
/// assert_eq!(resolve_sheet_name(&names, "Payroll").unwrap(), " Payroll ");
/// assert!(resolve_sheet_name(&names, "JSR").is_err());
/// ```
pub fn resolve_sheet_name(names: &[String], requested: &str) -> EngineResult<String> {
    names
        .iter()
        .find(|name| name.trim() == requested)
        .cloned()
        .ok_or_else(|| EngineError::SheetNotFound {
            sheet: requested.to_string(),
        })
}

/// Reads a payroll sheet into a [`PayrollTable`].
///
/// Fails with [`EngineError::UnsupportedFileType`] when the file is not a
/// readable workbook and with [`EngineError::SheetNotFound`] when the sheet
/// does not exist.
pub fn read_payroll_sheet(path: &Path, sheet_name: &str) -> EngineResult<PayrollTable> {
    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|e| match e {
        calamine::Error::Io(io) => EngineError::io(path, io),
        _ => EngineError::UnsupportedFileType {
            message: INVALID_WORKBOOK.to_string(),
        },
    })?;

    let actual = resolve_sheet_name(&workbook.sheet_names(), sheet_name)?;
    let range = workbook
        .worksheet_range(&actual)
        .map_err(|_| EngineError::UnsupportedFileType {
            message: INVALID_WORKBOOK.to_string(),
        })?;

    let mut rows = range.rows();
    let columns = match rows.next() {
        Some(header) => {
            let header: Vec<CellValue> = header.iter().map(cell_value).collect();
            normalize_header_row(&header)
        }
        None => Vec::new(),
    };
    let data: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    debug!(
        sheet = %actual,
        columns = columns.len(),
        rows = data.len(),
        "Read payroll sheet"
    );

    Ok(PayrollTable::new(columns, data))
}

/// Converts a `calamine` cell. Dates stay numeric serials; error cells read
/// as empty.
fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Float(n) => CellValue::Number(*n),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    fn write_sample(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("payroll.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Payroll ").unwrap();
        sheet.write_string(0, 0, "Department Code").unwrap();
        sheet.write_string(0, 1, "Monthly Food").unwrap();
        sheet.write_number(1, 0, 3003).unwrap();
        sheet.write_number(1, 1, 120.5).unwrap();
        sheet.write_string(2, 0, "3006").unwrap();
        sheet.write_boolean(2, 1, true).unwrap();
        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn test_reads_normalized_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir);

        let table = read_payroll_sheet(&path, "Payroll").unwrap();

        assert_eq!(table.columns(), ["departmentcode", "monthlyfood"]);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.cell(0, 0), &CellValue::Number(3003.0));
        assert_eq!(table.cell(0, 1), &CellValue::Number(120.5));
        assert_eq!(table.cell(1, 0), &CellValue::Text("3006".to_string()));
        assert_eq!(table.cell(1, 1), &CellValue::Bool(true));
    }

    #[test]
    fn test_missing_sheet() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir);

        match read_payroll_sheet(&path, "Salaries") {
            Err(EngineError::SheetNotFound { sheet }) => assert_eq!(sheet, "Salaries"),
            other => panic!("Expected SheetNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_file_is_invalid_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();

        match read_payroll_sheet(&path, "Payroll") {
            Err(EngineError::UnsupportedFileType { message }) => {
                assert_eq!(message, INVALID_WORKBOOK)
            }
            other => panic!("Expected UnsupportedFileType, got {:?}", other),
        }
    }

    #[test]
    fn test_exact_whitespace_name_does_not_match() {
        let names = vec![" Payroll ".to_string()];
        assert!(resolve_sheet_name(&names, " Payroll ").is_err());
    }

    #[test]
    fn test_cell_conversion() {
        assert_eq!(cell_value(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(
            cell_value(&Data::String("x".to_string())),
            CellValue::Text("x".to_string())
        );
    }
}

//! Workbook input and output.
//!
//! This module reads payroll sheets and writes journal-voucher lines back out:
//!
//! - [`reader`] - loads one sheet of an `.xlsx`/`.xls` file into a [`PayrollTable`](crate::models::PayrollTable)
//! - [`writer`] - writes a fresh single-sheet workbook
//! - [`package`] - edits an existing `.xlsx` package in place
//! - [`injector`] - merges journal lines into an existing workbook
//! - [`converter`] - converts legacy `.xls` files through an external tool

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{JOURNAL_COLUMNS, JournalVoucherLine};

pub mod converter;
pub mod injector;
pub mod package;
pub mod reader;
pub mod writer;

pub use converter::{
    ExternalConverter, FormatConverter, convert_legacy_workbook, verify_converted_artifact,
};
pub use injector::{AUXILIARY_SHEET, InjectionReport, inject_journal};
pub use package::XlsxPackage;
pub use reader::{read_payroll_sheet, resolve_sheet_name};
pub use writer::{PLAIN_SHEET_NAME, write_plain_journal};

/// A cell written to an output sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetCell {
    /// Nothing is written at this position.
    Empty,
    /// A text cell.
    Text(String),
    /// A numeric cell.
    Number(Decimal),
}

impl SheetCell {
    fn text(value: &str) -> Self {
        if value.is_empty() {
            SheetCell::Empty
        } else {
            SheetCell::Text(value.to_string())
        }
    }
}

/// A workbook that can be loaded whole, have sheets hidden, removed and
/// appended, and then be saved again.
///
/// Sheets are addressed by exact name.
pub trait SpreadsheetDocument {
    /// The sheet names, in tab order.
    fn sheet_names(&self) -> EngineResult<Vec<String>>;

    /// Marks a sheet hidden. Returns false when no such sheet exists.
    fn hide_sheet(&mut self, name: &str) -> EngineResult<bool>;

    /// Deletes a sheet and its content. Returns false when no such sheet
    /// exists.
    fn remove_sheet(&mut self, name: &str) -> EngineResult<bool>;

    /// Adds a sheet after the last one and fills it row by row from A1.
    fn append_sheet(&mut self, name: &str, rows: &[Vec<SheetCell>]) -> EngineResult<()>;
}

/// Lays journal lines out as sheet rows: the header row followed by one row
/// per line, in the order given.
///
/// Department codes keep the type of their source cell. An empty account
/// number leaves its cell blank.
pub fn journal_rows(lines: &[JournalVoucherLine]) -> Vec<Vec<SheetCell>> {
    let header = JOURNAL_COLUMNS
        .iter()
        .map(|name| SheetCell::Text(name.to_string()))
        .collect();

    std::iter::once(header)
        .chain(lines.iter().map(|line| {
            let department = if line.department.is_textual() {
                SheetCell::Text(line.department.label().to_string())
            } else {
                SheetCell::Number(Decimal::from(line.department.number()))
            };
            vec![
                SheetCell::text(&line.posting_date),
                SheetCell::text(&line.journal_code),
                SheetCell::text(line.gl_account()),
                department,
                SheetCell::text(&line.account_number),
                SheetCell::text(&line.description),
                SheetCell::Number(line.amount),
            ]
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DepartmentCode;

    fn line(department: DepartmentCode, account: &str) -> JournalVoucherLine {
        JournalVoucherLine {
            posting_date: "15/01/24".to_string(),
            journal_code: "PAYJV".to_string(),
            department,
            account_number: account.to_string(),
            description: "MONTHLY FOOD JANUARY 2024".to_string(),
            amount: Decimal::from(500),
        }
    }

    #[test]
    fn test_header_row_first() {
        let rows = journal_rows(&[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], SheetCell::Text("Posting Date".to_string()));
        assert_eq!(rows[0][6], SheetCell::Text("Amount".to_string()));
    }

    #[test]
    fn test_line_layout() {
        let rows = journal_rows(&[line(DepartmentCode::from_number(3003), "640140")]);
        assert_eq!(
            rows[1],
            vec![
                SheetCell::Text("15/01/24".to_string()),
                SheetCell::Text("PAYJV".to_string()),
                SheetCell::Text("G/L Account".to_string()),
                SheetCell::Number(Decimal::from(3003)),
                SheetCell::Text("640140".to_string()),
                SheetCell::Text("MONTHLY FOOD JANUARY 2024".to_string()),
                SheetCell::Number(Decimal::from(500)),
            ]
        );
    }

    #[test]
    fn test_textual_department_and_unmapped_account() {
        let department: DepartmentCode = "0042".parse().unwrap();
        let rows = journal_rows(&[line(department, "")]);
        assert_eq!(rows[1][3], SheetCell::Text("0042".to_string()));
        assert_eq!(rows[1][4], SheetCell::Empty);
    }
}

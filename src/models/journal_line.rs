//! Journal-voucher output models.
//!
//! This module contains the [`JournalVoucherLine`] type and the
//! [`JournalBatch`] that carries the ordered lines of one request together
//! with a summary and any warnings raised along the way.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{DepartmentCode, SalaryComponent};

/// The constant value of the "G/L Account" output column.
pub const GL_ACCOUNT_LABEL: &str = "G/L Account";

/// The output column headers, in output order.
pub const JOURNAL_COLUMNS: [&str; 7] = [
    "Posting Date",
    "Journal Code",
    "G/L Account",
    "Department Code",
    "Account Number",
    "Description",
    "Amount",
];

/// A single journal-voucher line.
///
/// The amount is never zero. The account number is empty when no GL rule
/// matches the description.
///
/// # Example
///
/// ```
/// use payroll_jv::models::{DepartmentCode, JournalVoucherLine};
/// use rust_decimal::Decimal;
///
/// let line = JournalVoucherLine {
///     posting_date: "15/01/24".to_string(),
///     journal_code: "PAY".to_string(),
///     department: DepartmentCode::from_number(3003),
///     account_number: "640100".to_string(),
///     description: "TOTAL BASIC SALARY JANUARY 2024".to_string(),
///     amount: Decimal::from(3000),
/// };
/// assert_eq!(line.gl_account(), "G/L Account");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalVoucherLine {
    /// The posting date, exactly as entered.
    pub posting_date: String,
    /// The journal code, used verbatim.
    pub journal_code: String,
    /// The department the amount is booked against.
    pub department: DepartmentCode,
    /// The GL account number, empty when unmapped.
    pub account_number: String,
    /// The component label followed by the long period label.
    pub description: String,
    /// The aggregated amount.
    pub amount: Decimal,
}

impl JournalVoucherLine {
    /// The constant "G/L Account" column value.
    pub fn gl_account(&self) -> &'static str {
        GL_ACCOUNT_LABEL
    }

    /// Returns true when no GL rule matched this line.
    pub fn is_unmapped(&self) -> bool {
        self.account_number.is_empty()
    }
}

/// A non-fatal condition noticed while building a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
}

/// Counts describing how a batch was built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Data rows present in the sheet.
    pub rows_read: usize,
    /// Rows skipped because their department cell was blank.
    pub rows_skipped: usize,
    /// Distinct departments aggregated.
    pub departments: usize,
    /// Components found in the sheet, in reshape order.
    pub components: Vec<SalaryComponent>,
    /// Department/component records dropped because they summed to zero.
    pub zero_lines_dropped: usize,
}

/// The result of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JournalBatch {
    /// The journal lines, sorted by department label then description.
    pub lines: Vec<JournalVoucherLine>,
    /// How the batch was built.
    pub summary: BatchSummary,
    /// Non-fatal conditions worth reporting.
    pub warnings: Vec<JournalWarning>,
}

impl JournalBatch {
    /// The sum of all line amounts.
    pub fn total_amount(&self) -> Decimal {
        self.lines.iter().map(|l| l.amount).sum()
    }
}

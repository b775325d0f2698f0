//! Payroll table, row and aggregate models.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::{CellValue, DepartmentCode, SalaryComponent};

/// A payroll sheet with normalized headers and raw data rows.
///
/// Rows may be shorter than the header; missing trailing cells read as
/// [`CellValue::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayrollTable {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl PayrollTable {
    /// Creates a table from already-normalized column names and data rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    /// The normalized column names, in sheet order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The data rows, excluding the header.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Returns the index of the first column with the given normalized name.
    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == key)
    }

    /// Returns the cell at the given position, or `Empty` past the row end.
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }
}

/// One payroll record after ingestion.
///
/// Only components that coerced to a number are present in `amounts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollRow {
    /// The employee's department.
    pub department: DepartmentCode,
    /// Numeric-coerced amount per component.
    pub amounts: BTreeMap<SalaryComponent, Decimal>,
}

/// Component sums for one department.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentAggregate {
    /// The department the sums belong to.
    pub department: DepartmentCode,
    /// Sum per present component. Every selected component has an entry,
    /// zero when no row carried a number for it.
    pub totals: BTreeMap<SalaryComponent, Decimal>,
}

impl DepartmentAggregate {
    /// Returns the total for a component, zero if it was not aggregated.
    pub fn total(&self, component: SalaryComponent) -> Decimal {
        self.totals
            .get(&component)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> PayrollTable {
        PayrollTable::new(
            vec![
                "employee".to_string(),
                "departmentcode".to_string(),
                "monthlyfood".to_string(),
                "departmentcode".to_string(),
            ],
            vec![
                vec![
                    CellValue::Text("A".to_string()),
                    CellValue::Number(3003.0),
                    CellValue::Number(50.0),
                ],
                vec![CellValue::Text("B".to_string())],
            ],
        )
    }

    #[test]
    fn test_column_index_returns_first_match() {
        let table = sample_table();
        assert_eq!(table.column_index("departmentcode"), Some(1));
        assert_eq!(table.column_index("monthlyhousing"), None);
        assert_eq!(table.column_index("monthlyfood"), Some(2));
    }

    #[test]
    fn test_cell_past_row_end_is_empty() {
        let table = sample_table();
        assert_eq!(table.cell(0, 2), &CellValue::Number(50.0));
        assert_eq!(table.cell(1, 2), &CellValue::Empty);
        assert_eq!(table.cell(9, 0), &CellValue::Empty);
    }

    #[test]
    fn test_aggregate_total_defaults_to_zero() {
        let mut totals = BTreeMap::new();
        totals.insert(SalaryComponent::MonthlyFood, Decimal::from(500));
        let aggregate = DepartmentAggregate {
            department: DepartmentCode::from_number(9999),
            totals,
        };
        assert_eq!(aggregate.total(SalaryComponent::MonthlyFood), Decimal::from(500));
        assert_eq!(aggregate.total(SalaryComponent::MonthlyHousing), Decimal::ZERO);
    }
}

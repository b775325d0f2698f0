//! Department aggregation and journal-line assembly.
//!
//! This module turns a normalized payroll table into journal-voucher lines:
//! it selects the salary components present in the sheet, validates and
//! groups rows by department, sums each component, reshapes the wide
//! aggregate into one record per department and component, resolves the GL
//! account of every record, drops zero amounts and sorts the result.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    BatchSummary, DepartmentAggregate, DepartmentCode, JournalBatch, JournalVoucherLine,
    JournalWarning, PayrollRow, PayrollTable, SalaryComponent,
};

use super::column::DEPARTMENT_COLUMN;
use super::gl_account::resolve_gl_account;
use super::period::PostingPeriod;

/// Warning code for rows skipped because their department cell was blank.
pub const WARNING_BLANK_DEPARTMENT: &str = "BLANK_DEPARTMENT";

/// Warning code for lines whose description matched no GL rule.
pub const WARNING_UNMAPPED_ACCOUNT: &str = "UNMAPPED_ACCOUNT";

/// Request-level values stamped onto every journal line.
#[derive(Debug, Clone)]
pub struct JournalContext {
    /// The parsed posting date.
    pub period: PostingPeriod,
    /// The journal code, used verbatim.
    pub journal_code: String,
}

/// A component selected for aggregation and the column it is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentColumn {
    /// The salary component.
    pub component: SalaryComponent,
    /// Index of its column in the table.
    pub index: usize,
}

/// Rows that survived ingestion, plus how many were skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestedRows {
    /// Rows with a valid department code.
    pub rows: Vec<PayrollRow>,
    /// Rows dropped because the department cell was blank.
    pub skipped: usize,
}

/// Keeps the components whose column exists in the table, in the order given.
///
/// Fails with [`EngineError::NoAggregationColumns`] when none is present.
pub fn select_components(
    table: &PayrollTable,
    components: &[SalaryComponent],
) -> EngineResult<Vec<ComponentColumn>> {
    let selected: Vec<ComponentColumn> = components
        .iter()
        .filter_map(|&component| {
            table
                .column_index(component.key())
                .map(|index| ComponentColumn { component, index })
        })
        .collect();

    if selected.is_empty() {
        return Err(EngineError::NoAggregationColumns);
    }
    Ok(selected)
}

/// Validates department codes and coerces component cells to amounts.
///
/// Rows with a blank department are skipped. A department that is not an
/// integer fails the whole ingestion with
/// [`EngineError::MalformedDepartmentCode`]. Component cells that do not
/// coerce to a number are left out of the row. A finite number too large for
/// a decimal amount fails with [`EngineError::AmountOutOfRange`].
pub fn ingest_rows(
    table: &PayrollTable,
    department_index: usize,
    columns: &[ComponentColumn],
) -> EngineResult<IngestedRows> {
    let mut ingested = IngestedRows::default();

    for row_index in 0..table.rows().len() {
        let Some(department) = DepartmentCode::from_cell(table.cell(row_index, department_index))?
        else {
            ingested.skipped += 1;
            continue;
        };

        let mut amounts = BTreeMap::new();
        for column in columns {
            let cell = table.cell(row_index, column.index);
            match cell.to_amount() {
                Some(amount) => {
                    amounts.insert(column.component, amount);
                }
                None if cell.exceeds_amount_range() => {
                    warn!(
                        row = row_index,
                        department = %department,
                        component = column.component.label(),
                        value = %cell,
                        "Amount out of decimal range"
                    );
                    return Err(EngineError::AmountOutOfRange {
                        department: department.to_string(),
                        component: column.component.label().to_string(),
                    });
                }
                None => {}
            }
        }

        ingested.rows.push(PayrollRow {
            department,
            amounts,
        });
    }

    Ok(ingested)
}

/// Groups rows by department and sums every selected component.
///
/// Each aggregate carries an entry for every component in `components`,
/// zero when no row of the department had a number for it. Aggregates are
/// returned in department order. A total that overflows the decimal range
/// fails with [`EngineError::AmountOutOfRange`].
pub fn aggregate_by_department(
    rows: &[PayrollRow],
    components: &[SalaryComponent],
) -> EngineResult<Vec<DepartmentAggregate>> {
    let mut groups: BTreeMap<DepartmentCode, BTreeMap<SalaryComponent, Decimal>> =
        BTreeMap::new();

    for row in rows {
        let totals = groups.entry(row.department.clone()).or_insert_with(|| {
            components
                .iter()
                .map(|&component| (component, Decimal::ZERO))
                .collect()
        });
        for (component, amount) in &row.amounts {
            if let Some(total) = totals.get_mut(component) {
                *total = total.checked_add(*amount).ok_or_else(|| {
                    EngineError::AmountOutOfRange {
                        department: row.department.to_string(),
                        component: component.label().to_string(),
                    }
                })?;
            }
        }
    }

    Ok(groups
        .into_iter()
        .map(|(department, totals)| DepartmentAggregate { department, totals })
        .collect())
}

/// Reshapes aggregates into journal lines: one record per department and
/// component (a full cross product), with the period suffix appended to the
/// description and the GL account resolved.
///
/// Zero records are kept here; [`build_journal`] drops them.
pub fn reshape_to_lines(
    aggregates: &[DepartmentAggregate],
    components: &[SalaryComponent],
    context: &JournalContext,
) -> Vec<JournalVoucherLine> {
    let period_label = context.period.long_label();

    components
        .iter()
        .flat_map(|&component| {
            aggregates.iter().map(move |aggregate| (component, aggregate))
        })
        .map(|(component, aggregate)| {
            let description = format!("{} {}", component.label(), period_label);
            let account_number = resolve_gl_account(&description, &aggregate.department);
            JournalVoucherLine {
                posting_date: context.period.as_entered().to_string(),
                journal_code: context.journal_code.clone(),
                department: aggregate.department.clone(),
                account_number,
                description,
                amount: aggregate.total(component),
            }
        })
        .collect()
}

/// Builds the journal-voucher batch for a payroll table.
///
/// Checks run in a fixed order: the department column must exist
/// ([`EngineError::MissingDepartmentColumn`]), at least one component column
/// must exist ([`EngineError::NoAggregationColumns`]), and every non-blank
/// department must be an integer ([`EngineError::MalformedDepartmentCode`]),
/// and every amount and total must fit a decimal
/// ([`EngineError::AmountOutOfRange`]). Any failure fails the whole batch.
///
/// # Example
///
/// ```
/// use payroll_jv::journal::{JournalContext, PostingPeriod, build_journal};
/// use payroll_jv::models::{CellValue, PayrollTable, SalaryComponent};
/// use rust_decimal::Decimal;
///
/// let table = PayrollTable::new(
///     vec!["departmentcode".to_string(), "totalbasicsalary".to_string()],
///     vec![
///         vec![CellValue::Number(3003.0), CellValue::Number(1000.0)],
///         vec![CellValue::Number(3003.0), CellValue::Number(2000.0)],
///     ],
/// );
/// let context = JournalContext {
///     period: PostingPeriod::parse("15/01/24").unwrap(),
///     journal_code: "PAY".to_string(),
/// };
///
/// let batch = build_journal(&table, &SalaryComponent::ALL, &context).unwrap();
/// assert_eq!(batch.lines.len(), 1);
/// assert_eq!(batch.lines[0].description, "TOTAL BASIC SALARY JANUARY 2024");
/// assert_eq!(batch.lines[0].account_number, "640100");
/// assert_eq!(batch.lines[0].amount, Decimal::from(3000));
/// ```
pub fn build_journal(
    table: &PayrollTable,
    components: &[SalaryComponent],
    context: &JournalContext,
) -> EngineResult<JournalBatch> {
    let department_index = table
        .column_index(DEPARTMENT_COLUMN)
        .ok_or(EngineError::MissingDepartmentColumn)?;

    let columns = select_components(table, components)?;
    let selected: Vec<SalaryComponent> = columns.iter().map(|c| c.component).collect();

    let ingested = ingest_rows(table, department_index, &columns)?;
    let aggregates = aggregate_by_department(&ingested.rows, &selected)?;
    debug!(
        rows = ingested.rows.len(),
        departments = aggregates.len(),
        components = selected.len(),
        "Aggregated payroll rows"
    );

    let records = reshape_to_lines(&aggregates, &selected, context);
    let record_count = records.len();
    let mut lines: Vec<JournalVoucherLine> = records
        .into_iter()
        .filter(|line| !line.amount.is_zero())
        .collect();
    lines.sort_by(|a, b| {
        a.department
            .cmp(&b.department)
            .then_with(|| a.description.cmp(&b.description))
    });

    let mut warnings = Vec::new();
    if ingested.skipped > 0 {
        warn!(rows = ingested.skipped, "Skipped rows without a department code");
        warnings.push(JournalWarning {
            code: WARNING_BLANK_DEPARTMENT.to_string(),
            message: format!(
                "{} row(s) without a department code were skipped",
                ingested.skipped
            ),
        });
    }
    for line in lines.iter().filter(|line| line.is_unmapped()) {
        warn!(
            department = %line.department,
            description = %line.description,
            "No GL account mapped"
        );
        warnings.push(JournalWarning {
            code: WARNING_UNMAPPED_ACCOUNT.to_string(),
            message: format!(
                "No GL account for '{}' in department {}",
                line.description, line.department
            ),
        });
    }

    let summary = BatchSummary {
        rows_read: table.rows().len(),
        rows_skipped: ingested.skipped,
        departments: aggregates.len(),
        components: selected,
        zero_lines_dropped: record_count - lines.len(),
    };

    Ok(JournalBatch {
        lines,
        summary,
        warnings,
    })
}

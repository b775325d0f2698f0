//! Journal-voucher construction.
//!
//! This module contains the pure transformation from a payroll table to
//! journal-voucher lines:
//!
//! - [`column`] - header normalization
//! - [`period`] - posting date parsing and period labels
//! - [`gl_account`] - the GL account mapping table
//! - [`aggregation`] - department grouping, reshaping and ordering

pub mod aggregation;
pub mod column;
pub mod gl_account;
pub mod period;

pub use aggregation::{
    ComponentColumn, IngestedRows, JournalContext, WARNING_BLANK_DEPARTMENT,
    WARNING_UNMAPPED_ACCOUNT, aggregate_by_department, build_journal, ingest_rows,
    reshape_to_lines, select_components,
};
pub use column::{DEPARTMENT_COLUMN, header_text, normalize_column_name, normalize_header_row};
pub use gl_account::{
    CostCentre, DISTINGUISHED_DEPARTMENTS, GL_ACCOUNT_RULES, GlAccountRule, lookup_account,
    resolve_gl_account, resolve_gl_account_raw, strip_period_suffix,
};
pub use period::{POSTING_DATE_FORMAT, POSTING_DATE_PATTERN, PostingPeriod};

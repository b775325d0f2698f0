//! Core data models for the journal-voucher engine.
//!
//! This module contains all the domain models used throughout the engine.

mod cell;
mod component;
mod department;
mod journal_line;
mod payroll;

pub use cell::CellValue;
pub use component::SalaryComponent;
pub use department::DepartmentCode;
pub use journal_line::{
    BatchSummary, GL_ACCOUNT_LABEL, JOURNAL_COLUMNS, JournalBatch, JournalVoucherLine,
    JournalWarning,
};
pub use payroll::{DepartmentAggregate, PayrollRow, PayrollTable};

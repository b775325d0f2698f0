//! Payroll Journal-Voucher Engine
//!
//! This crate turns a payroll export workbook into journal-voucher lines:
//! salary components are summed per department, each total is posted to the
//! GL account its component and cost centre map to, and the journal is
//! written either as a workbook of its own or as a sheet added to the
//! uploaded workbook.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod journal;
pub mod models;
pub mod pipeline;
pub mod workbook;

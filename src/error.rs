//! Error types for the payroll journal-voucher engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while turning a payroll export
//! into journal-voucher lines.

use thiserror::Error;

/// The main error type for the journal-voucher engine.
///
/// Every operation in the engine returns this error type. Input-validation
/// failures are reported as client errors, conversion and I/O failures as
/// server-side failures (see [`EngineError::is_client_error`]).
///
/// # Example
///
/// ```
/// use payroll_jv::error::EngineError;
///
/// let error = EngineError::SheetNotFound {
///     sheet: "Payroll".to_string(),
/// };
/// assert_eq!(error.to_string(), "Sheet 'Payroll' not found.");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// The posting date did not match the expected pattern or is not a real
    /// calendar date.
    #[error("Invalid date format. Please use ({expected}).")]
    InvalidDateFormat {
        /// The pattern the date must follow.
        expected: String,
    },

    /// The uploaded file is not a workbook the engine can read.
    #[error("{message}")]
    UnsupportedFileType {
        /// A description of why the file was rejected.
        message: String,
    },

    /// The requested sheet does not exist in the workbook.
    #[error("Sheet '{sheet}' not found.")]
    SheetNotFound {
        /// The requested sheet name.
        sheet: String,
    },

    /// The payroll sheet has no department code column.
    #[error("Missing 'Department Code' column.")]
    MissingDepartmentColumn,

    /// None of the recognised salary component columns is present.
    #[error("No required aggregation columns found.")]
    NoAggregationColumns,

    /// A department code could not be interpreted as an integer.
    #[error("Malformed department code '{value}'")]
    MalformedDepartmentCode {
        /// The offending cell value.
        value: String,
    },

    /// A component amount, or a department total, does not fit the decimal range.
    #[error("Amount of '{component}' for department {department} is out of range")]
    AmountOutOfRange {
        /// The department the amount belongs to.
        department: String,
        /// The salary component label.
        component: String,
    },

    /// Legacy workbook conversion failed or produced an unusable artifact.
    #[error("Workbook conversion failed: {message}")]
    ConversionFailed {
        /// Diagnostic output from the converter or the artifact check.
        message: String,
    },

    /// Reading or writing a file failed.
    #[error("I/O failure on '{path}': {message}")]
    IoFailure {
        /// The path involved in the failed operation.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl EngineError {
    /// Builds an [`EngineError::IoFailure`] from a path and any displayable error.
    pub fn io(path: impl AsRef<std::path::Path>, error: impl std::fmt::Display) -> Self {
        EngineError::IoFailure {
            path: path.as_ref().display().to_string(),
            message: error.to_string(),
        }
    }

    /// Returns true when the error was caused by the caller's input.
    ///
    /// Client errors are never retried; everything else is a server-side
    /// failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidDateFormat { .. }
                | EngineError::UnsupportedFileType { .. }
                | EngineError::SheetNotFound { .. }
                | EngineError::MissingDepartmentColumn
                | EngineError::NoAggregationColumns
                | EngineError::MalformedDepartmentCode { .. }
                | EngineError::AmountOutOfRange { .. }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_date_format_displays_expected_pattern() {
        let error = EngineError::InvalidDateFormat {
            expected: "dd/mm/yy".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid date format. Please use (dd/mm/yy)."
        );
    }

    #[test]
    fn test_sheet_not_found_displays_sheet() {
        let error = EngineError::SheetNotFound {
            sheet: "Payroll".to_string(),
        };
        assert_eq!(error.to_string(), "Sheet 'Payroll' not found.");
    }

    #[test]
    fn test_missing_department_column_message() {
        assert_eq!(
            EngineError::MissingDepartmentColumn.to_string(),
            "Missing 'Department Code' column."
        );
    }

    #[test]
    fn test_no_aggregation_columns_message() {
        assert_eq!(
            EngineError::NoAggregationColumns.to_string(),
            "No required aggregation columns found."
        );
    }

    #[test]
    fn test_malformed_department_code_displays_value() {
        let error = EngineError::MalformedDepartmentCode {
            value: "HQ".to_string(),
        };
        assert_eq!(error.to_string(), "Malformed department code 'HQ'");
    }

    #[test]
    fn test_amount_out_of_range_names_department_and_component() {
        let error = EngineError::AmountOutOfRange {
            department: "3003".to_string(),
            component: "MONTHLY FOOD".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Amount of 'MONTHLY FOOD' for department 3003 is out of range"
        );
        assert!(error.is_client_error());
    }

    #[test]
    fn test_io_helper_captures_path_and_message() {
        let error = EngineError::io("/tmp/out.xlsx", "disk full");
        match error {
            EngineError::IoFailure { path, message } => {
                assert_eq!(path, "/tmp/out.xlsx");
                assert_eq!(message, "disk full");
            }
            other => panic!("Expected IoFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_client_error_classification() {
        assert!(EngineError::MissingDepartmentColumn.is_client_error());
        assert!(EngineError::NoAggregationColumns.is_client_error());
        assert!(
            EngineError::UnsupportedFileType {
                message: "bad".to_string()
            }
            .is_client_error()
        );
        assert!(
            !EngineError::ConversionFailed {
                message: "timeout".to_string()
            }
            .is_client_error()
        );
        assert!(!EngineError::io("/x", "denied").is_client_error());
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_missing_column() -> EngineResult<()> {
            Err(EngineError::MissingDepartmentColumn)
        }

        fn propagates_error() -> EngineResult<()> {
            returns_missing_column()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}

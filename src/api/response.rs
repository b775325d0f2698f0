//! Response types for the journal API.
//!
//! This module defines the success body of `POST /journal` and the error
//! response structures for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{JournalVoucherLine, JournalWarning};
use crate::pipeline::JournalOutput;

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "API is up".
    pub status: String,
}

/// Body of a successful `POST /journal`.
#[derive(Debug, Clone, Serialize)]
pub struct JournalApiResponse {
    /// File name of the written workbook.
    pub file_name: String,
    /// Server-side path of the written workbook.
    pub output_path: String,
    /// The journal sheet, when the journal was added to the upload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    /// Number of journal lines.
    pub line_count: usize,
    /// Number of departments aggregated.
    pub departments: usize,
    /// Sum of all line amounts.
    pub total_amount: Decimal,
    /// Non-fatal conditions.
    pub warnings: Vec<JournalWarning>,
    /// The journal lines.
    pub lines: Vec<JournalVoucherLine>,
}

impl From<JournalOutput> for JournalApiResponse {
    fn from(output: JournalOutput) -> Self {
        Self {
            file_name: output.file_name,
            output_path: output.path.display().to_string(),
            sheet_name: output.sheet_name,
            line_count: output.batch.lines.len(),
            departments: output.batch.summary.departments,
            total_amount: output.batch.total_amount(),
            warnings: output.batch.warnings,
            lines: output.batch.lines,
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an internal error response.
    pub fn internal(details: impl Into<String>) -> Self {
        Self::with_details("INTERNAL_ERROR", "Internal server error", details)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

/// The API error code of an engine error.
pub fn error_code(error: &EngineError) -> &'static str {
    match error {
        EngineError::InvalidDateFormat { .. } => "INVALID_DATE_FORMAT",
        EngineError::UnsupportedFileType { .. } => "UNSUPPORTED_FILE_TYPE",
        EngineError::SheetNotFound { .. } => "SHEET_NOT_FOUND",
        EngineError::MissingDepartmentColumn => "MISSING_DEPARTMENT_COLUMN",
        EngineError::NoAggregationColumns => "NO_AGGREGATION_COLUMNS",
        EngineError::MalformedDepartmentCode { .. } => "MALFORMED_DEPARTMENT_CODE",
        EngineError::AmountOutOfRange { .. } => "AMOUNT_OUT_OF_RANGE",
        EngineError::ConversionFailed { .. } => "CONVERSION_FAILED",
        EngineError::IoFailure { .. } => "IO_ERROR",
        EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
            "CONFIG_ERROR"
        }
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let code = error_code(&error);
        if error.is_client_error() {
            ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new(code, error.to_string()),
            }
        } else {
            ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(code, "Journal generation failed", error.to_string()),
            }
        }
    }
}

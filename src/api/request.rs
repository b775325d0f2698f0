//! Request types for the journal API.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pipeline::{JournalRequest, OutputMode};

/// Body of `POST /journal`.
///
/// The workbook is referenced by a path the server can read; the upload
/// itself is handled in front of this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalApiRequest {
    /// Server-side path of the uploaded workbook.
    pub input_path: PathBuf,
    /// The payroll sheet to read.
    pub sheet_name: String,
    /// Posting date, `dd/mm/yy`.
    pub posting_date: String,
    /// Journal code written to every line.
    pub journal_code: String,
    /// Add the journal to the uploaded workbook instead of writing a new one.
    #[serde(default)]
    pub preserve_formatting: bool,
    /// The original upload name, when `input_path` is a temporary file.
    #[serde(default)]
    pub file_name: Option<String>,
}

impl From<JournalApiRequest> for JournalRequest {
    fn from(req: JournalApiRequest) -> Self {
        JournalRequest {
            input_path: req.input_path,
            file_name: req.file_name,
            sheet_name: req.sheet_name,
            posting_date: req.posting_date,
            journal_code: req.journal_code,
            mode: if req.preserve_formatting {
                OutputMode::PreserveWorkbook
            } else {
                OutputMode::Plain
            },
        }
    }
}

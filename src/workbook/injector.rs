//! Journal sheet injection.
//!
//! Merges journal-voucher lines into an existing workbook as a dedicated
//! sheet, leaving the rest of the workbook as it was.

use serde::Serialize;
use tracing::info;

use crate::error::EngineResult;
use crate::models::JournalVoucherLine;

use super::{SpreadsheetDocument, journal_rows};

/// The auxiliary sheet that is hidden whenever a journal is injected.
pub const AUXILIARY_SHEET: &str = "JSR";

/// What [`inject_journal`] did to the workbook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InjectionReport {
    /// The auxiliary sheet existed and is now hidden.
    pub auxiliary_hidden: bool,
    /// A sheet with the journal's name existed and was replaced.
    pub replaced_existing: bool,
    /// Rows written, header included.
    pub rows_written: usize,
}

/// Writes journal lines into `document` as the sheet `sheet_name`.
///
/// The auxiliary sheet is hidden, never deleted. A sheet already named
/// `sheet_name` is deleted and recreated, so running the same period twice
/// leaves a single journal sheet. The new sheet holds the header row and one
/// row per line, in the order given.
pub fn inject_journal<D: SpreadsheetDocument>(
    document: &mut D,
    sheet_name: &str,
    lines: &[JournalVoucherLine],
) -> EngineResult<InjectionReport> {
    let auxiliary_hidden = document.hide_sheet(AUXILIARY_SHEET)?;
    let replaced_existing = document.remove_sheet(sheet_name)?;

    let rows = journal_rows(lines);
    document.append_sheet(sheet_name, &rows)?;

    info!(
        sheet = %sheet_name,
        lines = lines.len(),
        auxiliary_hidden,
        replaced_existing,
        "Injected journal sheet"
    );

    Ok(InjectionReport {
        auxiliary_hidden,
        replaced_existing,
        rows_written: rows.len(),
    })
}

//! Plain journal workbook writer.

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::JournalVoucherLine;

use super::{SheetCell, journal_rows};

/// The name of the only sheet in a plain journal workbook.
pub const PLAIN_SHEET_NAME: &str = "Sheet1";

/// Writes a new workbook holding just the journal lines, header included.
pub fn write_plain_journal(path: &Path, lines: &[JournalVoucherLine]) -> EngineResult<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold().set_border(FormatBorder::Thin);

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(PLAIN_SHEET_NAME)
        .map_err(|e| EngineError::io(path, e))?;

    for (row, cells) in journal_rows(lines).iter().enumerate() {
        let format = (row == 0).then_some(&header_format);
        write_row(worksheet, row as u32, cells, format).map_err(|e| EngineError::io(path, e))?;
    }

    workbook.save(path).map_err(|e| EngineError::io(path, e))
}

fn write_row(
    worksheet: &mut Worksheet,
    row: u32,
    cells: &[SheetCell],
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    for (col, cell) in cells.iter().enumerate() {
        let col = col as u16;
        match (cell, format) {
            (SheetCell::Empty, _) => {}
            (SheetCell::Text(text), Some(format)) => {
                worksheet.write_string_with_format(row, col, text, format)?;
            }
            (SheetCell::Text(text), None) => {
                worksheet.write_string(row, col, text)?;
            }
            (SheetCell::Number(number), _) => {
                worksheet.write_number(row, col, number.to_f64().unwrap_or_default())?;
            }
        }
    }
    Ok(())
}

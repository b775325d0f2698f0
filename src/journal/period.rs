//! Posting period resolution.
//!
//! The user supplies a posting date as `dd/mm/yy`. The engine derives from it
//! the long period label appended to every description (`JANUARY 2024`) and
//! the short label used for the target sheet and the output file name
//! (`Jan 2024`).

use chrono::{Datelike, NaiveDate};

use crate::error::{EngineError, EngineResult};

/// The `chrono` format of the posting date.
pub const POSTING_DATE_FORMAT: &str = "%d/%m/%y";

/// The posting-date pattern shown to users.
pub const POSTING_DATE_PATTERN: &str = "dd/mm/yy";

/// Two-digit years from this one upward are read as 19xx.
const CENTURY_PIVOT: i32 = 69;

/// A parsed posting date.
///
/// # Example
///
/// ```
/// use payroll_jv::journal::PostingPeriod;
///
/// let period = PostingPeriod::parse("15/01/24").unwrap();
/// assert_eq!(period.long_label(), "JANUARY 2024");
/// assert_eq!(period.short_label(), "Jan 2024");
/// assert_eq!(period.sheet_name(), "JV Jan 2024");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingPeriod {
    date: NaiveDate,
    entered: String,
}

impl PostingPeriod {
    /// Parses a `dd/mm/yy` date.
    ///
    /// Two-digit years `69`-`99` fall in the 1900s, `00`-`68` in the 2000s.
    ///
    /// Fails with [`EngineError::InvalidDateFormat`] when the text does not
    /// match the pattern or names a day that does not exist (`31/02/24`).
    pub fn parse(input: &str) -> EngineResult<Self> {
        let invalid = || EngineError::InvalidDateFormat {
            expected: POSTING_DATE_PATTERN.to_string(),
        };
        let mut date =
            NaiveDate::parse_from_str(input, POSTING_DATE_FORMAT).map_err(|_| invalid())?;
        if date.year() == 2000 + CENTURY_PIVOT {
            date = date.with_year(1900 + CENTURY_PIVOT).ok_or_else(invalid)?;
        }
        Ok(Self {
            date,
            entered: input.to_string(),
        })
    }

    /// The calendar date.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The posting date exactly as the user entered it.
    pub fn as_entered(&self) -> &str {
        &self.entered
    }

    /// Full month name and year, upper-cased: `JANUARY 2024`.
    pub fn long_label(&self) -> String {
        self.date.format("%B %Y").to_string().to_uppercase()
    }

    /// Three-letter month abbreviation: `Jan`.
    pub fn month_abbreviation(&self) -> String {
        self.date.format("%b").to_string()
    }

    /// The four-digit year.
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// Abbreviated month and year: `Jan 2024`.
    pub fn short_label(&self) -> String {
        format!("{} {}", self.month_abbreviation(), self.year())
    }

    /// The name of the sheet the journal is written to: `JV Jan 2024`.
    pub fn sheet_name(&self) -> String {
        format!("JV {}", self.short_label())
    }

    /// The output file name for a workbook that keeps its original content.
    ///
    /// `stem` is the uploaded file name without its extension.
    pub fn output_file_name(&self, stem: &str) -> String {
        format!(
            "{}_with_JV_{}_{}.xlsx",
            stem,
            self.month_abbreviation(),
            self.year()
        )
    }
}

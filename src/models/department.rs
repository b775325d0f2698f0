//! Department code model.
//!
//! Department codes arrive as numeric or text cells. They are validated once
//! at ingestion so that GL resolution never sees a code it cannot interpret.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::{EngineError, EngineResult};

use super::CellValue;

/// A validated department code.
///
/// Holds the integer used for GL rule selection, the label written to the
/// output and used for ordering, and whether the source cell was text.
///
/// # Example
///
/// ```
/// use payroll_jv::models::DepartmentCode;
///
/// let dept: DepartmentCode = "3003".parse().unwrap();
/// assert_eq!(dept.number(), 3003);
/// assert_eq!(dept.label(), "3003");
/// assert!("HQ".parse::<DepartmentCode>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DepartmentCode {
    number: i64,
    label: String,
    textual: bool,
}

impl DepartmentCode {
    /// Creates a department code from a numeric value.
    pub fn from_number(number: i64) -> Self {
        Self {
            number,
            label: number.to_string(),
            textual: false,
        }
    }

    /// Validates a department cell.
    ///
    /// Returns `Ok(None)` for a blank cell, since such rows cannot be grouped.
    /// Integral numbers and integer text are accepted; anything else fails
    /// with [`EngineError::MalformedDepartmentCode`].
    pub fn from_cell(cell: &CellValue) -> EngineResult<Option<Self>> {
        if cell.is_blank() {
            return Ok(None);
        }
        match cell {
            CellValue::Number(n)
                if n.is_finite()
                    && n.fract() == 0.0
                    && *n >= i64::MIN as f64
                    && *n < i64::MAX as f64 =>
            {
                Ok(Some(Self::from_number(*n as i64)))
            }
            CellValue::Text(s) => s.parse().map(Some),
            other => Err(EngineError::MalformedDepartmentCode {
                value: other.to_string(),
            }),
        }
    }

    /// The integer value used for GL rule selection.
    pub fn number(&self) -> i64 {
        self.number
    }

    /// The label written to the output and used for ordering.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns true if the code came from a text cell.
    pub fn is_textual(&self) -> bool {
        self.textual
    }
}

impl FromStr for DepartmentCode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        let number = label
            .parse::<i64>()
            .map_err(|_| EngineError::MalformedDepartmentCode {
                value: s.to_string(),
            })?;
        Ok(Self {
            number,
            label: label.to_string(),
            textual: true,
        })
    }
}

impl Ord for DepartmentCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.label
            .cmp(&other.label)
            .then(self.number.cmp(&other.number))
            .then(self.textual.cmp(&other.textual))
    }
}

impl PartialOrd for DepartmentCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for DepartmentCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

impl Serialize for DepartmentCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

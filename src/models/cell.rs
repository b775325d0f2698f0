//! Raw spreadsheet cell values.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use std::str::FromStr;

/// A cell value as read from the payroll sheet, before any coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// No value.
    Empty,
    /// A numeric cell (integers, floats and date serials alike).
    Number(f64),
    /// A text cell.
    Text(String),
    /// A boolean cell.
    Bool(bool),
}

impl CellValue {
    /// Coerces the cell to a monetary amount.
    ///
    /// Numbers convert directly, text is parsed after trimming (plain or
    /// scientific notation). Anything else, including NaN, infinities and
    /// booleans, is absent. Coercion never fails; finite numbers too large
    /// for a `Decimal` are also absent here and are reported by
    /// [`CellValue::exceeds_amount_range`].
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_jv::models::CellValue;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(CellValue::Number(1500.0).to_amount(), Some(Decimal::from(1500)));
    /// assert_eq!(CellValue::Text(" 250 ".to_string()).to_amount(), Some(Decimal::from(250)));
    /// assert_eq!(CellValue::Text("n/a".to_string()).to_amount(), None);
    /// ```
    pub fn to_amount(&self) -> Option<Decimal> {
        match self {
            CellValue::Number(n) => Decimal::from_f64(*n),
            CellValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return None;
                }
                Decimal::from_str(s)
                    .or_else(|_| Decimal::from_scientific(s))
                    .ok()
            }
            CellValue::Empty | CellValue::Bool(_) => None,
        }
    }

    /// Returns true when the cell holds a finite number whose magnitude is
    /// beyond what a `Decimal` amount can represent.
    ///
    /// ```
    /// use payroll_jv::models::CellValue;
    ///
    /// assert!(CellValue::Number(1e30).exceeds_amount_range());
    /// assert!(!CellValue::Number(1e20).exceeds_amount_range());
    /// assert!(!CellValue::Number(f64::INFINITY).exceeds_amount_range());
    /// ```
    pub fn exceeds_amount_range(&self) -> bool {
        let overflows = |n: f64| n.is_finite() && n.abs() >= 1.0 && Decimal::from_f64(n).is_none();
        match self {
            CellValue::Number(n) => overflows(*n),
            CellValue::Text(s) => {
                self.to_amount().is_none() && s.trim().parse::<f64>().is_ok_and(overflows)
            }
            CellValue::Empty | CellValue::Bool(_) => false,
        }
    }

    /// Returns true when the cell holds nothing, or only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) | CellValue::Bool(_) => false,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{:.1}", n),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
        }
    }
}

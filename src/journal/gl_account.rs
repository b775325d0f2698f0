//! GL account resolution.
//!
//! A journal line's account depends on the salary component and on the
//! department's cost centre: departments in [`DISTINGUISHED_DEPARTMENTS`]
//! post to the 640xxx range, every other department to the 701xxx range.
//! The rule table is static and shared by every request.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::EngineResult;
use crate::models::DepartmentCode;

/// Departments that post to the distinguished chart-of-accounts range.
pub const DISTINGUISHED_DEPARTMENTS: [i64; 2] = [3003, 3006];

/// One row of the GL mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlAccountRule {
    /// The canonical component label.
    pub label: &'static str,
    /// Account for distinguished departments.
    pub distinguished: &'static str,
    /// Account for every other department.
    pub standard: &'static str,
}

/// The GL mapping table.
pub const GL_ACCOUNT_RULES: [GlAccountRule; 8] = [
    GlAccountRule {
        label: "TOTAL BASIC SALARY",
        distinguished: "640100",
        standard: "701100",
    },
    GlAccountRule {
        label: "Retroactive Appraisal/Arrears",
        distinguished: "640100",
        standard: "701100",
    },
    GlAccountRule {
        label: "MONTHLY FOOD",
        distinguished: "640140",
        standard: "701210",
    },
    GlAccountRule {
        label: "MONTHLY TRANSP",
        distinguished: "640142",
        standard: "701220",
    },
    GlAccountRule {
        label: "MONTHLY HOUSING",
        distinguished: "640143",
        standard: "701230",
    },
    GlAccountRule {
        label: "MONTHLY OTHER ALL",
        distinguished: "640141",
        standard: "701200",
    },
    GlAccountRule {
        label: "Educatin All",
        distinguished: "701200",
        standard: "701200",
    },
    GlAccountRule {
        label: "MONTHLY OVER TIME",
        distinguished: "640120",
        standard: "701150",
    },
];

/// Matches the " MONTH YYYY" suffix appended to every description.
static PERIOD_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\w+\s+\d{4}$").expect("period suffix pattern is valid"));

/// Which half of the mapping table a department uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostCentre {
    /// Departments listed in [`DISTINGUISHED_DEPARTMENTS`].
    Distinguished,
    /// Every other department.
    Standard,
}

impl CostCentre {
    /// Selects the cost centre for a department.
    pub fn for_department(department: &DepartmentCode) -> Self {
        if DISTINGUISHED_DEPARTMENTS.contains(&department.number()) {
            CostCentre::Distinguished
        } else {
            CostCentre::Standard
        }
    }
}

/// Removes a trailing period suffix (`JANUARY 2024`) from a description and
/// trims the result, giving back the canonical component label.
///
/// # Example
///
/// ```
/// use payroll_jv::journal::strip_period_suffix;
///
/// assert_eq!(strip_period_suffix("MONTHLY FOOD JANUARY 2024"), "MONTHLY FOOD");
/// assert_eq!(strip_period_suffix("MONTHLY FOOD"), "MONTHLY FOOD");
/// ```
pub fn strip_period_suffix(description: &str) -> String {
    PERIOD_SUFFIX
        .replace(description, "")
        .trim()
        .to_string()
}

/// Looks up the account for a canonical label in one half of the table.
pub fn lookup_account(label: &str, cost_centre: CostCentre) -> Option<&'static str> {
    GL_ACCOUNT_RULES
        .iter()
        .find(|rule| rule.label == label)
        .map(|rule| match cost_centre {
            CostCentre::Distinguished => rule.distinguished,
            CostCentre::Standard => rule.standard,
        })
}

/// Resolves the GL account for a journal description and department.
///
/// Returns an empty string when no rule matches; an unmapped line is kept
/// with a blank account.
///
/// # Example
///
/// ```
/// use payroll_jv::journal::resolve_gl_account;
/// use payroll_jv::models::DepartmentCode;
///
/// let dept = DepartmentCode::from_number(3003);
/// assert_eq!(resolve_gl_account("TOTAL BASIC SALARY JANUARY 2024", &dept), "640100");
/// assert_eq!(resolve_gl_account("BONUS JANUARY 2024", &dept), "");
/// ```
pub fn resolve_gl_account(description: &str, department: &DepartmentCode) -> String {
    let label = strip_period_suffix(description);
    lookup_account(&label, CostCentre::for_department(department))
        .unwrap_or_default()
        .to_string()
}

/// Resolves the GL account for a department given as raw text.
///
/// Fails with [`crate::error::EngineError::MalformedDepartmentCode`] when the
/// department is not an integer.
pub fn resolve_gl_account_raw(description: &str, department: &str) -> EngineResult<String> {
    let department: DepartmentCode = department.parse()?;
    Ok(resolve_gl_account(description, &department))
}

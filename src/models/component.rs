//! Salary component descriptors.
//!
//! This module defines the fixed set of salary components the engine
//! recognises in a payroll export, each with its normalized column key and
//! its display label.

use serde::{Deserialize, Serialize};

/// A recognised salary component.
///
/// The set is static configuration: each variant maps a normalized column
/// header to the label used in journal descriptions and GL lookups.
///
/// # Example
///
/// ```
/// use payroll_jv::models::SalaryComponent;
///
/// let component = SalaryComponent::TotalBasicSalary;
/// assert_eq!(component.key(), "totalbasicsalary");
/// assert_eq!(component.label(), "TOTAL BASIC SALARY");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryComponent {
    /// Basic salary for the month.
    TotalBasicSalary,
    /// Retroactive appraisal adjustments and arrears.
    RetroactiveAppraisalArrears,
    /// Monthly food allowance.
    MonthlyFood,
    /// Monthly transport allowance.
    MonthlyTransport,
    /// Monthly housing allowance.
    MonthlyHousing,
    /// Other monthly allowances.
    MonthlyOtherAllowance,
    /// Education allowance.
    EducationAllowance,
    /// Monthly overtime pay.
    MonthlyOvertime,
}

impl SalaryComponent {
    /// All components, in the order their columns are reshaped.
    pub const ALL: [SalaryComponent; 8] = [
        SalaryComponent::TotalBasicSalary,
        SalaryComponent::RetroactiveAppraisalArrears,
        SalaryComponent::MonthlyFood,
        SalaryComponent::MonthlyTransport,
        SalaryComponent::MonthlyHousing,
        SalaryComponent::MonthlyOtherAllowance,
        SalaryComponent::EducationAllowance,
        SalaryComponent::MonthlyOvertime,
    ];

    /// The normalized column header for this component.
    pub const fn key(self) -> &'static str {
        match self {
            SalaryComponent::TotalBasicSalary => "totalbasicsalary",
            SalaryComponent::RetroactiveAppraisalArrears => "retroactiveappraisalarrears",
            SalaryComponent::MonthlyFood => "monthlyfood",
            SalaryComponent::MonthlyTransport => "monthlytransp",
            SalaryComponent::MonthlyHousing => "monthlyhousing",
            SalaryComponent::MonthlyOtherAllowance => "monthlyotherall",
            SalaryComponent::EducationAllowance => "educatinall",
            SalaryComponent::MonthlyOvertime => "monthlyovertime",
        }
    }

    /// The canonical display label, as it appears in journal descriptions.
    ///
    /// The spelling matches the payroll export's headers, typos included.
    pub const fn label(self) -> &'static str {
        match self {
            SalaryComponent::TotalBasicSalary => "TOTAL BASIC SALARY",
            SalaryComponent::RetroactiveAppraisalArrears => "Retroactive Appraisal/Arrears",
            SalaryComponent::MonthlyFood => "MONTHLY FOOD",
            SalaryComponent::MonthlyTransport => "MONTHLY TRANSP",
            SalaryComponent::MonthlyHousing => "MONTHLY HOUSING",
            SalaryComponent::MonthlyOtherAllowance => "MONTHLY OTHER ALL",
            SalaryComponent::EducationAllowance => "Educatin All",
            SalaryComponent::MonthlyOvertime => "MONTHLY OVER TIME",
        }
    }

    /// Looks up a component by its normalized column key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }
}

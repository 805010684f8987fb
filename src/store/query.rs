//! Whitelisted filter and ordering options for list queries.

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmployeeOrder {
    #[default]
    Name,
    Email,
    HireDate,
    Salary,
    Id,
}

impl EmployeeOrder {
    pub(crate) fn column(self) -> &'static str {
        match self {
            EmployeeOrder::Name => "name",
            EmployeeOrder::Email => "email",
            EmployeeOrder::HireDate => "hire_date",
            EmployeeOrder::Salary => "salary",
            EmployeeOrder::Id => "id",
        }
    }
}

/// Equality filters on employees, ordered by name ascending unless told otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeQuery {
    pub is_active: Option<bool>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub order_by: EmployeeOrder,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordOrder {
    /// Year, then month.
    #[default]
    Year,
    /// Month, then year.
    Month,
    TotalAmount,
    Id,
}

impl RecordOrder {
    pub(crate) fn clause(self, direction: SortDirection) -> String {
        let dir = direction.sql();
        match self {
            RecordOrder::Year => format!("r.year {dir}, r.month {dir}, r.id {dir}"),
            RecordOrder::Month => format!("r.month {dir}, r.year {dir}, r.id {dir}"),
            RecordOrder::TotalAmount => format!("r.total_amount {dir}, r.id {dir}"),
            RecordOrder::Id => format!("r.id {dir}"),
        }
    }
}

/// Equality filters on monthly records, newest period first unless told otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordQuery {
    pub employee_id: Option<i64>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub order_by: RecordOrder,
    pub direction: SortDirection,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            employee_id: None,
            year: None,
            month: None,
            order_by: RecordOrder::Year,
            direction: SortDirection::Desc,
        }
    }
}

impl RecordQuery {
    pub fn for_employee(employee_id: i64) -> Self {
        Self {
            employee_id: Some(employee_id),
            ..Default::default()
        }
    }
}

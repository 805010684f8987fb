use super::PayAmounts;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub telephone: String,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub hire_date: Option<String>,
    pub is_active: bool,
    pub salary: f64,
    pub weekend_rate: f64,
    pub holiday_rate: f64,
    pub has_insurance: bool,
    pub insurance_amount: f64,
    pub has_transport_fee: bool,
    pub transport_fee_daily: f64,
    pub has_food_support: bool,
    pub food_support_amount: f64,
    pub bank_name: Option<String>,
    pub bank_branch: Option<String>,
    pub bank_account: Option<String>,
    pub bank_pix: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Employee {
    /// Pay for the given counts at this employee's current rates.
    pub fn pay_for(&self, weekends_worked: i64, holidays_worked: i64) -> PayAmounts {
        PayAmounts::compute(
            self.weekend_rate,
            self.holiday_rate,
            weekends_worked,
            holidays_worked,
        )
    }

    pub fn summary(&self) -> EmployeeSummary {
        EmployeeSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            weekend_rate: self.weekend_rate,
            holiday_rate: self.holiday_rate,
        }
    }
}

/// Employee fields embedded in joined monthly record views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub weekend_rate: f64,
    pub holiday_rate: f64,
}

/// Data for a new employee. Flags and amounts not supplied take the store defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub telephone: String,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub hire_date: Option<String>,
    pub is_active: bool,
    pub salary: f64,
    pub weekend_rate: f64,
    pub holiday_rate: f64,
    pub has_insurance: bool,
    pub insurance_amount: f64,
    pub has_transport_fee: bool,
    pub transport_fee_daily: f64,
    pub has_food_support: bool,
    pub food_support_amount: f64,
    pub bank_name: Option<String>,
    pub bank_branch: Option<String>,
    pub bank_account: Option<String>,
    pub bank_pix: Option<String>,
}

impl NewEmployee {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        telephone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            telephone: telephone.into(),
            cpf: None,
            rg: None,
            hire_date: None,
            is_active: true,
            salary: 0.0,
            weekend_rate: 0.0,
            holiday_rate: 0.0,
            has_insurance: false,
            insurance_amount: 0.0,
            has_transport_fee: false,
            transport_fee_daily: 0.0,
            has_food_support: false,
            food_support_amount: 0.0,
            bank_name: None,
            bank_branch: None,
            bank_account: None,
            bank_pix: None,
        }
    }

    pub fn with_rates(mut self, weekend_rate: f64, holiday_rate: f64) -> Self {
        self.weekend_rate = weekend_rate;
        self.holiday_rate = holiday_rate;
        self
    }
}

/// Partial update of an employee. `None` leaves a field untouched; for nullable
/// columns `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub cpf: Option<Option<String>>,
    pub rg: Option<Option<String>>,
    pub hire_date: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub salary: Option<f64>,
    pub weekend_rate: Option<f64>,
    pub holiday_rate: Option<f64>,
    pub has_insurance: Option<bool>,
    pub insurance_amount: Option<f64>,
    pub has_transport_fee: Option<bool>,
    pub transport_fee_daily: Option<f64>,
    pub has_food_support: Option<bool>,
    pub food_support_amount: Option<f64>,
    pub bank_name: Option<Option<String>>,
    pub bank_branch: Option<Option<String>>,
    pub bank_account: Option<Option<String>>,
    pub bank_pix: Option<Option<String>>,
}

impl EmployeePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

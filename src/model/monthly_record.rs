use super::{EmployeeSummary, PayAmounts};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyWorkRecord {
    pub id: i64,
    pub employee_id: i64,
    pub year: i32,
    pub month: u32,
    pub weekends_worked: i64,
    pub holidays_worked: i64,
    pub weekend_amount: f64,
    pub holiday_amount: f64,
    pub total_amount: f64,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl MonthlyWorkRecord {
    pub fn amounts(&self) -> PayAmounts {
        PayAmounts {
            weekend_amount: self.weekend_amount,
            holiday_amount: self.holiday_amount,
            total_amount: self.total_amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyWorkRecordWithEmployee {
    #[serde(flatten)]
    pub record: MonthlyWorkRecord,
    pub employee: EmployeeSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMonthlyWorkRecord {
    pub employee_id: i64,
    pub year: i32,
    pub month: u32,
    pub weekends_worked: i64,
    pub holidays_worked: i64,
    pub amounts: PayAmounts,
    pub notes: Option<String>,
}

/// Partial update of a monthly record. Amounts are only ever set together,
/// recomputed from the owning employee's rates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub weekends_worked: Option<i64>,
    pub holidays_worked: Option<i64>,
    pub amounts: Option<PayAmounts>,
    pub notes: Option<Option<String>>,
}

impl RecordPatch {
    pub fn touches_counts(&self) -> bool {
        self.weekends_worked.is_some() || self.holidays_worked.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joined_record_serializes_flat_with_employee() {
        let joined = MonthlyWorkRecordWithEmployee {
            record: MonthlyWorkRecord {
                id: 7,
                employee_id: 3,
                year: 2024,
                month: 3,
                weekends_worked: 2,
                holidays_worked: 1,
                weekend_amount: 200.0,
                holiday_amount: 150.0,
                total_amount: 350.0,
                notes: None,
                created_at: "2024-03-01T00:00:00+00:00".to_string(),
                updated_at: "2024-03-01T00:00:00+00:00".to_string(),
            },
            employee: EmployeeSummary {
                id: 3,
                name: "Ana".to_string(),
                email: "ana@x.com".to_string(),
                weekend_rate: 100.0,
                holiday_rate: 150.0,
            },
        };

        let value = serde_json::to_value(&joined).unwrap();
        assert_eq!(value["id"], json!(7));
        assert_eq!(value["employeeId"], json!(3));
        assert_eq!(value["totalAmount"], json!(350.0));
        assert_eq!(value["employee"]["name"], json!("Ana"));
        assert_eq!(value["employee"]["weekendRate"], json!(100.0));
    }
}

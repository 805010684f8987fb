//! Request bodies shared by the e2e tests.

#![allow(dead_code)]

use super::constants::*;
use serde_json::{json, Value};

/// Employee with both rates set, used by most record scenarios.
pub fn ana() -> Value {
    json!({
        "name": ANA_NAME,
        "email": ANA_EMAIL,
        "telephone": "111",
        "weekendRate": ANA_WEEKEND_RATE,
        "holidayRate": ANA_HOLIDAY_RATE,
    })
}

/// Employee relying on default rates.
pub fn bruno() -> Value {
    json!({
        "name": BRUNO_NAME,
        "email": BRUNO_EMAIL,
        "telephone": "222",
    })
}

pub fn record_for(employee_id: i64, year: i32, month: u32, weekends: i64, holidays: i64) -> Value {
    json!({
        "employeeId": employee_id,
        "year": year,
        "month": month,
        "weekendsWorked": weekends,
        "holidaysWorked": holidays,
    })
}

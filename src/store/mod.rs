mod query;
mod schema;
mod sqlite_workforce_store;

pub use query::{EmployeeOrder, EmployeeQuery, RecordOrder, RecordQuery, SortDirection};
pub use schema::WORKFORCE_VERSIONED_SCHEMAS;
pub use sqlite_workforce_store::SqliteWorkforceStore;

use crate::model::{
    Employee, EmployeePatch, MonthlyWorkRecord, MonthlyWorkRecordWithEmployee, NewEmployee,
    NewMonthlyWorkRecord, RecordPatch,
};
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Employee not found")]
    EmployeeNotFound,

    #[error("Monthly work record not found")]
    RecordNotFound,

    #[error("A record already exists for this employee, year, and month")]
    DuplicatePeriod,

    #[error("An employee with this email already exists")]
    DuplicateEmail,

    #[error("Database error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("Store connection lock poisoned")]
    Poisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
            if failure.code == ErrorCode::ConstraintViolation {
                if message.starts_with("UNIQUE constraint failed") {
                    if message.contains("monthly_work_record.employee_id") {
                        return StoreError::DuplicatePeriod;
                    }
                    if message.contains("employee.email") {
                        return StoreError::DuplicateEmail;
                    }
                }
                if message.starts_with("FOREIGN KEY constraint failed") {
                    return StoreError::EmployeeNotFound;
                }
            }
        }
        StoreError::Sqlite(err)
    }
}

/// Persistence of employees and their monthly work records.
///
/// Update and delete report a missing target as `EmployeeNotFound` or
/// `RecordNotFound`. Writes that would break the one-record-per-period rule fail
/// with `DuplicatePeriod`.
pub trait WorkforceStore: Send + Sync {
    // Employees
    fn get_employee(&self, id: i64) -> Result<Option<Employee>, StoreError>;
    fn list_employees(&self, query: &EmployeeQuery) -> Result<Vec<Employee>, StoreError>;
    fn create_employee(&self, employee: &NewEmployee) -> Result<Employee, StoreError>;
    fn update_employee(&self, id: i64, patch: &EmployeePatch) -> Result<Employee, StoreError>;
    /// Deletes the employee together with its monthly records.
    fn delete_employee(&self, id: i64) -> Result<(), StoreError>;
    fn count_employees(&self) -> Result<usize, StoreError>;

    // Monthly work records
    fn get_record(&self, id: i64) -> Result<Option<MonthlyWorkRecord>, StoreError>;
    fn get_record_with_employee(
        &self,
        id: i64,
    ) -> Result<Option<MonthlyWorkRecordWithEmployee>, StoreError>;
    fn find_record_for_period(
        &self,
        employee_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Option<MonthlyWorkRecord>, StoreError>;
    fn list_records(
        &self,
        query: &RecordQuery,
    ) -> Result<Vec<MonthlyWorkRecordWithEmployee>, StoreError>;
    fn create_record(&self, record: &NewMonthlyWorkRecord)
        -> Result<MonthlyWorkRecord, StoreError>;
    fn update_record(&self, id: i64, patch: &RecordPatch)
        -> Result<MonthlyWorkRecord, StoreError>;
    fn delete_record(&self, id: i64) -> Result<(), StoreError>;
    fn count_records(&self) -> Result<usize, StoreError>;
}

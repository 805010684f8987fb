//! Employee and monthly work record types shared by the store, the dispatcher and the tools.

mod employee;
mod monthly_record;
mod pay;

pub use employee::{Employee, EmployeePatch, EmployeeSummary, NewEmployee};
pub use monthly_record::{
    MonthlyWorkRecord, MonthlyWorkRecordWithEmployee, NewMonthlyWorkRecord, RecordPatch,
};
pub use pay::PayAmounts;

//! Self-description of the dispatch surface, served alongside live row counts.

use chrono::Utc;
use serde_json::{json, Value};

use crate::store::{StoreError, WorkforceStore};

pub const SCHEMA_VERSION: &str = "1.0";

fn id_param(description: &str) -> Value {
    json!({ "id": { "type": "integer", "description": description, "required": true } })
}

fn list_params() -> Value {
    json!({
        "orderBy": {
            "type": "string | object",
            "description": "Field name, or a single {field: \"asc\" | \"desc\"} pair",
            "required": false
        },
        "direction": { "type": "string", "enum": ["asc", "desc"], "required": false },
        "where": { "type": "object", "description": "Equality filters", "required": false }
    })
}

fn record_create_data(description: &str) -> Value {
    json!({
        "type": "object",
        "description": description,
        "required": true,
        "properties": {
            "employeeId": { "type": "integer", "required": true },
            "year": { "type": "integer", "required": false, "default": "current year" },
            "month": { "type": "integer", "required": false, "default": "current month" },
            "weekendsWorked": { "type": "integer", "required": true },
            "holidaysWorked": { "type": "integer", "required": true },
            "notes": { "type": "string", "required": false }
        }
    })
}

pub fn employee_schema() -> Value {
    json!({
        "name": "Employee",
        "description": "A person on the payroll, with the rates used to pay weekend and holiday work",
        "properties": {
            "id": { "type": "integer", "description": "Assigned by the store", "required": false },
            "name": { "type": "string", "description": "Full name", "required": true },
            "email": { "type": "string", "description": "Unique email address", "required": true },
            "telephone": { "type": "string", "description": "Contact number", "required": true },
            "cpf": { "type": "string", "required": false },
            "rg": { "type": "string", "required": false },
            "hireDate": { "type": "string", "format": "date", "required": false },
            "isActive": { "type": "boolean", "default": true, "required": false },
            "salary": { "type": "number", "default": 0, "required": false },
            "weekendRate": {
                "type": "number",
                "description": "Pay per weekend worked",
                "default": 0,
                "required": false
            },
            "holidayRate": {
                "type": "number",
                "description": "Pay per holiday worked",
                "default": 0,
                "required": false
            },
            "hasInsurance": { "type": "boolean", "required": false },
            "insuranceAmount": { "type": "number", "required": false },
            "hasTransportFee": { "type": "boolean", "required": false },
            "transportFeeDaily": { "type": "number", "required": false },
            "hasFoodSupport": { "type": "boolean", "required": false },
            "foodSupportAmount": { "type": "number", "required": false },
            "bankName": { "type": "string", "required": false },
            "bankBranch": { "type": "string", "required": false },
            "bankAccount": { "type": "string", "required": false },
            "bankPix": { "type": "string", "required": false }
        },
        "actions": {
            "list": {
                "description": "All employees, by name unless ordered otherwise",
                "params": list_params(),
                "filters": ["isActive", "name", "email"],
                "orderBy": ["name", "email", "hireDate", "salary", "id"]
            },
            "get": { "description": "One employee by id", "params": id_param("Employee ID") },
            "create": {
                "description": "Create an employee",
                "data": {
                    "type": "object",
                    "required": true,
                    "properties": {
                        "name": { "type": "string", "required": true },
                        "email": { "type": "string", "required": true },
                        "telephone": { "type": "string", "required": true }
                    }
                }
            },
            "update": {
                "description": "Change any subset of an employee's fields",
                "params": id_param("Employee ID"),
                "data": { "type": "object", "required": true }
            },
            "delete": {
                "description": "Delete an employee and its monthly records",
                "params": id_param("Employee ID")
            }
        }
    })
}

pub fn monthly_work_record_schema() -> Value {
    json!({
        "name": "MonthlyWorkRecord",
        "description": "Weekends and holidays an employee worked in one calendar month",
        "properties": {
            "id": { "type": "integer", "required": false },
            "employeeId": { "type": "integer", "required": true },
            "year": { "type": "integer", "required": false },
            "month": { "type": "integer", "description": "1-12", "required": false },
            "weekendsWorked": { "type": "integer", "required": true },
            "holidaysWorked": { "type": "integer", "required": true },
            "weekendAmount": { "type": "number", "derived": "weekendRate * weekendsWorked" },
            "holidayAmount": { "type": "number", "derived": "holidayRate * holidaysWorked" },
            "totalAmount": { "type": "number", "derived": "weekendAmount + holidayAmount" },
            "notes": { "type": "string", "required": false }
        },
        "actions": {
            "list": {
                "description": "All records, newest period first, with their employee",
                "params": list_params(),
                "filters": ["employeeId", "year", "month"],
                "orderBy": ["year", "month", "totalAmount", "id"]
            },
            "getByEmployee": {
                "description": "Records of one employee, optionally narrowed to a year and month",
                "params": {
                    "employeeId": { "type": "integer", "required": true },
                    "year": { "type": "integer", "required": false },
                    "month": { "type": "integer", "required": false }
                }
            },
            "get": { "description": "One record by id", "params": id_param("Record ID") },
            "create": {
                "description": "Record a month of work; fails if the period is already recorded",
                "data": record_create_data("Monthly work record")
            },
            "addQuickRecord": {
                "description": "Same as create",
                "data": record_create_data("Monthly work record")
            },
            "update": {
                "description": "Change counts, period or notes; amounts follow the employee's current rates",
                "params": id_param("Record ID"),
                "data": { "type": "object", "required": true }
            },
            "delete": { "description": "Delete a record", "params": id_param("Record ID") }
        }
    })
}

/// `{schema, metadata}` with current row counts.
pub fn schema_document(store: &dyn WorkforceStore) -> Result<Value, StoreError> {
    let employees = store.count_employees()?;
    let records = store.count_records()?;
    Ok(json!({
        "schema": {
            "version": SCHEMA_VERSION,
            "description": "Workforce dispatch API schema",
            "entities": {
                "employee": employee_schema(),
                "monthlyWorkRecord": monthly_work_record_schema()
            }
        },
        "metadata": {
            "counts": {
                "employees": employees,
                "monthlyWorkRecords": records
            },
            "lastUpdated": Utc::now().to_rfc3339()
        }
    }))
}

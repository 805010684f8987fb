use serde_json::Value;
use tracing::debug;

use super::coerce::{Payload, ValidationError};
use super::options::employee_query;
use super::protocol::{DispatchError, EmployeeAction, Outcome};
use super::{required_id, to_json};
use crate::model::{EmployeePatch, NewEmployee};
use crate::store::{StoreError, WorkforceStore};

const REQUIRED_FIELDS: &[&str] = &["name", "email", "telephone"];

const WRITABLE_FIELDS: &[&str] = &[
    "name",
    "email",
    "telephone",
    "cpf",
    "rg",
    "hireDate",
    "isActive",
    "salary",
    "weekendRate",
    "holidayRate",
    "hasInsurance",
    "insuranceAmount",
    "hasTransportFee",
    "transportFeeDaily",
    "hasFoodSupport",
    "foodSupportAmount",
    "bankName",
    "bankBranch",
    "bankAccount",
    "bankPix",
];

/// Store-maintained keys a client may echo back; never written.
const READ_ONLY_FIELDS: &[&str] = &["id", "createdAt", "updatedAt"];

pub(super) fn handle(
    store: &dyn WorkforceStore,
    action: EmployeeAction,
    params: Option<&Value>,
    data: Option<&Value>,
) -> Result<Outcome, DispatchError> {
    match action {
        EmployeeAction::List => {
            let query = employee_query(params)?;
            let employees = store.list_employees(&query)?;
            Ok(Outcome::Done(Some(to_json(&employees)?)))
        }
        EmployeeAction::Get => {
            let id = required_id(params, "id", "Employee ID is required")?;
            match store.get_employee(id)? {
                Some(employee) => Ok(Outcome::Done(Some(to_json(&employee)?))),
                None => Err(StoreError::EmployeeNotFound.into()),
            }
        }
        EmployeeAction::Create => {
            let data = data.ok_or_else(|| DispatchError::rejected("Employee data is required"))?;
            let employee = parse_new_employee(data)?;
            let created = store.create_employee(&employee)?;
            debug!("Employee {} created", created.id);
            Ok(Outcome::Done(Some(to_json(&created)?)))
        }
        EmployeeAction::Update => {
            let id = required_id(params, "id", "Employee ID is required")?;
            let data = data.ok_or_else(|| DispatchError::rejected("Update data is required"))?;
            let patch = parse_employee_patch(data)?;
            let updated = store.update_employee(id, &patch)?;
            Ok(Outcome::Done(Some(to_json(&updated)?)))
        }
        EmployeeAction::Delete => {
            let id = required_id(params, "id", "Employee ID is required")?;
            store.delete_employee(id)?;
            debug!("Employee {} deleted", id);
            Ok(Outcome::Done(None))
        }
    }
}

fn non_negative(field: &'static str, value: Option<f64>) -> Result<Option<f64>, ValidationError> {
    match value {
        Some(v) if v < 0.0 => Err(ValidationError::OutOfRange {
            field,
            reason: "must not be negative",
        }),
        other => Ok(other),
    }
}

pub(crate) fn parse_new_employee(data: &Value) -> Result<NewEmployee, ValidationError> {
    let payload = Payload::new(data, "Employee data")?;
    payload.reject_unknown(WRITABLE_FIELDS, READ_ONLY_FIELDS)?;
    payload.require(REQUIRED_FIELDS)?;

    // Presence was checked above; a non-string value fails here.
    let required = |key: &'static str| -> Result<String, ValidationError> {
        payload
            .string(key)?
            .ok_or(ValidationError::MissingFields(vec![key]))
    };
    let mut employee = NewEmployee::new(
        required("name")?,
        required("email")?,
        required("telephone")?,
    );

    employee.cpf = payload.string("cpf")?;
    employee.rg = payload.string("rg")?;
    employee.hire_date = payload.string("hireDate")?;
    employee.bank_name = payload.string("bankName")?;
    employee.bank_branch = payload.string("bankBranch")?;
    employee.bank_account = payload.string("bankAccount")?;
    employee.bank_pix = payload.string("bankPix")?;

    if let Some(is_active) = payload.boolean("isActive")? {
        employee.is_active = is_active;
    }
    employee.has_insurance = payload.boolean("hasInsurance")?.unwrap_or(false);
    employee.has_transport_fee = payload.boolean("hasTransportFee")?.unwrap_or(false);
    employee.has_food_support = payload.boolean("hasFoodSupport")?.unwrap_or(false);

    let amount = |key: &'static str| -> Result<f64, ValidationError> {
        Ok(non_negative(key, payload.number(key)?)?.unwrap_or(0.0))
    };
    employee.salary = amount("salary")?;
    employee.weekend_rate = amount("weekendRate")?;
    employee.holiday_rate = amount("holidayRate")?;
    employee.insurance_amount = amount("insuranceAmount")?;
    employee.transport_fee_daily = amount("transportFeeDaily")?;
    employee.food_support_amount = amount("foodSupportAmount")?;

    Ok(employee)
}

pub(crate) fn parse_employee_patch(data: &Value) -> Result<EmployeePatch, ValidationError> {
    let payload = Payload::new(data, "Update data")?;
    payload.reject_unknown(WRITABLE_FIELDS, READ_ONLY_FIELDS)?;

    // Required columns may be changed but not cleared.
    let not_null = |key: &'static str| -> Result<Option<String>, ValidationError> {
        match payload.nullable_string(key)? {
            Some(None) => Err(ValidationError::NotAString(key)),
            Some(Some(value)) => Ok(Some(value)),
            None => Ok(None),
        }
    };
    let amount = |key: &'static str| -> Result<Option<f64>, ValidationError> {
        non_negative(key, payload.number(key)?)
    };

    Ok(EmployeePatch {
        name: not_null("name")?,
        email: not_null("email")?,
        telephone: not_null("telephone")?,
        cpf: payload.nullable_string("cpf")?,
        rg: payload.nullable_string("rg")?,
        hire_date: payload.nullable_string("hireDate")?,
        is_active: payload.boolean("isActive")?,
        salary: amount("salary")?,
        weekend_rate: amount("weekendRate")?,
        holiday_rate: amount("holidayRate")?,
        has_insurance: payload.boolean("hasInsurance")?,
        insurance_amount: amount("insuranceAmount")?,
        has_transport_fee: payload.boolean("hasTransportFee")?,
        transport_fee_daily: amount("transportFeeDaily")?,
        has_food_support: payload.boolean("hasFoodSupport")?,
        food_support_amount: amount("foodSupportAmount")?,
        bank_name: payload.nullable_string("bankName")?,
        bank_branch: payload.nullable_string("bankBranch")?,
        bank_account: payload.nullable_string("bankAccount")?,
        bank_pix: payload.nullable_string("bankPix")?,
    })
}

use serde_json::Value;
use tracing::{debug, info};

use super::clock::Clock;
use super::coerce::{check_month, check_range, check_year, Payload, ValidationError};
use super::options::record_query;
use super::protocol::{DispatchError, Outcome, RecordAction};
use super::{required_id, to_json};
use crate::model::{NewMonthlyWorkRecord, RecordPatch};
use crate::store::{RecordQuery, StoreError, WorkforceStore};

const REQUIRED_FIELDS: &[&str] = &["employeeId", "weekendsWorked", "holidaysWorked"];

const CREATE_FIELDS: &[&str] = &[
    "employeeId",
    "year",
    "month",
    "weekendsWorked",
    "holidaysWorked",
    "notes",
];

const UPDATE_FIELDS: &[&str] = &[
    "employeeId",
    "year",
    "month",
    "weekendsWorked",
    "holidaysWorked",
    "notes",
];

/// Derived or store-maintained keys; a caller can send them but they are never taken as given.
const IGNORED_FIELDS: &[&str] = &[
    "id",
    "weekendAmount",
    "holidayAmount",
    "totalAmount",
    "createdAt",
    "updatedAt",
    "employee",
];

pub(super) fn handle(
    store: &dyn WorkforceStore,
    clock: &dyn Clock,
    action: RecordAction,
    params: Option<&Value>,
    data: Option<&Value>,
) -> Result<Outcome, DispatchError> {
    match action {
        RecordAction::List => {
            let query = record_query(params)?;
            let records = store.list_records(&query)?;
            Ok(Outcome::Done(Some(to_json(&records)?)))
        }
        RecordAction::GetByEmployee => {
            let employee_id = required_id(params, "employeeId", "Employee ID is required")?;
            let mut query = RecordQuery::for_employee(employee_id);
            if let Some(params) = params {
                let params = Payload::new(params, "params")?;
                query.year = params.integer("year")?.map(check_year).transpose()?;
                query.month = params.integer("month")?.map(check_month).transpose()?;
            }
            let records = store.list_records(&query)?;
            Ok(Outcome::Done(Some(to_json(&records)?)))
        }
        RecordAction::Get => {
            let id = required_id(params, "id", "Record ID is required")?;
            match store.get_record_with_employee(id)? {
                Some(record) => Ok(Outcome::Done(Some(to_json(&record)?))),
                None => Err(StoreError::RecordNotFound.into()),
            }
        }
        RecordAction::Create => {
            let data = data.ok_or_else(|| DispatchError::rejected("Record data is required"))?;
            create(store, clock, data)
        }
        RecordAction::Update => {
            let id = required_id(params, "id", "Record ID is required")?;
            let data = data.ok_or_else(|| DispatchError::rejected("Update data is required"))?;
            update(store, id, data)
        }
        RecordAction::Delete => {
            let id = required_id(params, "id", "Record ID is required")?;
            store.delete_record(id)?;
            debug!("Monthly record {} deleted", id);
            Ok(Outcome::Done(None))
        }
    }
}

fn count(field: &'static str, value: i64) -> Result<i64, ValidationError> {
    check_range(field, value, 0, i64::MAX, "must not be negative")
}

/// Create input before amounts are derived. `year`/`month` are `None` when defaulted.
#[derive(Debug, Clone, PartialEq)]
struct RecordDraft {
    employee_id: i64,
    year: Option<i32>,
    month: Option<u32>,
    weekends_worked: i64,
    holidays_worked: i64,
    notes: Option<String>,
}

fn parse_draft(data: &Value) -> Result<RecordDraft, ValidationError> {
    let payload = Payload::new(data, "Record data")?;
    payload.require(REQUIRED_FIELDS)?;
    payload.reject_unknown(CREATE_FIELDS, IGNORED_FIELDS)?;

    let employee_id = payload
        .integer("employeeId")?
        .ok_or(ValidationError::MissingFields(vec!["employeeId"]))?;
    check_range("employeeId", employee_id, 1, i64::MAX, "must be a positive integer")?;
    let weekends_worked = payload
        .integer("weekendsWorked")?
        .ok_or(ValidationError::MissingFields(vec!["weekendsWorked"]))?;
    let holidays_worked = payload
        .integer("holidaysWorked")?
        .ok_or(ValidationError::MissingFields(vec!["holidaysWorked"]))?;

    Ok(RecordDraft {
        employee_id,
        year: payload.integer("year")?.map(check_year).transpose()?,
        month: payload.integer("month")?.map(check_month).transpose()?,
        weekends_worked: count("weekendsWorked", weekends_worked)?,
        holidays_worked: count("holidaysWorked", holidays_worked)?,
        notes: payload.string("notes")?,
    })
}

fn conflict_with(
    store: &dyn WorkforceStore,
    employee_id: i64,
    year: i32,
    month: u32,
) -> Result<Outcome, DispatchError> {
    let existing = match store.find_record_for_period(employee_id, year, month)? {
        Some(found) => store.get_record_with_employee(found.id)?,
        None => None,
    };
    // Same shape as a successful create, employee included.
    match existing {
        Some(existing) => Ok(Outcome::Conflict {
            message: StoreError::DuplicatePeriod.to_string(),
            existing: to_json(&existing)?,
        }),
        None => Err(StoreError::DuplicatePeriod.into()),
    }
}

fn create(
    store: &dyn WorkforceStore,
    clock: &dyn Clock,
    data: &Value,
) -> Result<Outcome, DispatchError> {
    let draft = parse_draft(data)?;
    let (current_year, current_month) = clock.current_period();
    let year = draft.year.unwrap_or(current_year);
    let month = draft.month.unwrap_or(current_month);

    if store
        .find_record_for_period(draft.employee_id, year, month)?
        .is_some()
    {
        info!(
            "Record for employee {} already exists for {}-{:02}",
            draft.employee_id, year, month
        );
        return conflict_with(store, draft.employee_id, year, month);
    }

    let employee = store
        .get_employee(draft.employee_id)?
        .ok_or(StoreError::EmployeeNotFound)?;

    let record = NewMonthlyWorkRecord {
        employee_id: employee.id,
        year,
        month,
        weekends_worked: draft.weekends_worked,
        holidays_worked: draft.holidays_worked,
        amounts: employee.pay_for(draft.weekends_worked, draft.holidays_worked),
        notes: draft.notes,
    };

    let created = match store.create_record(&record) {
        Ok(created) => created,
        // Lost a race with a concurrent create for the same period.
        Err(StoreError::DuplicatePeriod) => {
            return conflict_with(store, record.employee_id, year, month)
        }
        Err(e) => return Err(e.into()),
    };

    let joined = store
        .get_record_with_employee(created.id)?
        .ok_or(StoreError::RecordNotFound)?;
    Ok(Outcome::Done(Some(to_json(&joined)?)))
}

struct ParsedUpdate {
    employee_id: Option<i64>,
    patch: RecordPatch,
}

fn parse_update(data: &Value) -> Result<ParsedUpdate, ValidationError> {
    let payload = Payload::new(data, "Update data")?;
    payload.reject_unknown(UPDATE_FIELDS, IGNORED_FIELDS)?;

    let patch = RecordPatch {
        year: payload.integer("year")?.map(check_year).transpose()?,
        month: payload.integer("month")?.map(check_month).transpose()?,
        weekends_worked: payload
            .integer("weekendsWorked")?
            .map(|v| count("weekendsWorked", v))
            .transpose()?,
        holidays_worked: payload
            .integer("holidaysWorked")?
            .map(|v| count("holidaysWorked", v))
            .transpose()?,
        amounts: None,
        notes: payload.nullable_string("notes")?,
    };
    Ok(ParsedUpdate {
        employee_id: payload.integer("employeeId")?,
        patch,
    })
}

fn update(store: &dyn WorkforceStore, id: i64, data: &Value) -> Result<Outcome, DispatchError> {
    let ParsedUpdate {
        employee_id,
        mut patch,
    } = parse_update(data)?;

    let existing = store.get_record(id)?.ok_or(StoreError::RecordNotFound)?;
    if matches!(employee_id, Some(requested) if requested != existing.employee_id) {
        return Err(DispatchError::rejected("employeeId cannot be changed"));
    }

    let employee = store
        .get_employee(existing.employee_id)?
        .ok_or(StoreError::EmployeeNotFound)?;

    if patch.touches_counts() {
        let weekends = patch.weekends_worked.unwrap_or(existing.weekends_worked);
        let holidays = patch.holidays_worked.unwrap_or(existing.holidays_worked);
        patch.amounts = Some(employee.pay_for(weekends, holidays));
    }

    match store.update_record(id, &patch) {
        Ok(_) => {}
        Err(StoreError::DuplicatePeriod) => {
            return conflict_with(
                store,
                existing.employee_id,
                patch.year.unwrap_or(existing.year),
                patch.month.unwrap_or(existing.month),
            )
        }
        Err(e) => return Err(e.into()),
    }

    let joined = store
        .get_record_with_employee(id)?
        .ok_or(StoreError::RecordNotFound)?;
    Ok(Outcome::Done(Some(to_json(&joined)?)))
}

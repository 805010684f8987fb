//! `list` options: `{orderBy?, direction?, where?}`.
//!
//! `orderBy` is either a field name (`"salary"`) or a single
//! `{field: direction}` pair (`{"salary": "desc"}`). Only whitelisted order
//! fields and equality filters are accepted.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::coerce::{check_month, check_year, Payload, ValidationError};
use crate::store::{EmployeeQuery, RecordQuery, SortDirection};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ListOptions {
    #[serde(default)]
    order_by: Option<Value>,
    #[serde(default)]
    direction: Option<SortDirection>,
    #[serde(default, rename = "where")]
    filter: Option<Map<String, Value>>,
}

fn invalid(message: impl ToString) -> ValidationError {
    ValidationError::ListOptions(message.to_string())
}

fn read_options(params: Option<&Value>) -> Result<ListOptions, ValidationError> {
    match params {
        None | Some(Value::Null) => Ok(ListOptions::default()),
        Some(value) => serde_json::from_value(value.clone()).map_err(invalid),
    }
}

fn parse_order<F: DeserializeOwned>(
    order_by: Option<Value>,
) -> Result<(Option<F>, Option<SortDirection>), ValidationError> {
    let field = |name: String| {
        serde_json::from_value::<F>(Value::String(name.clone()))
            .map_err(|_| invalid(format!("cannot order by `{}`", name)))
    };
    match order_by {
        None | Some(Value::Null) => Ok((None, None)),
        Some(Value::String(name)) => Ok((Some(field(name)?), None)),
        Some(Value::Object(pair)) if pair.len() == 1 => match pair.into_iter().next() {
            Some((name, direction)) => {
                let direction: SortDirection = serde_json::from_value(direction).map_err(invalid)?;
                Ok((Some(field(name)?), Some(direction)))
            }
            None => Ok((None, None)),
        },
        Some(_) => Err(invalid(
            "orderBy must be a field name or a single {field: direction} pair",
        )),
    }
}

pub fn employee_query(params: Option<&Value>) -> Result<EmployeeQuery, ValidationError> {
    let options = read_options(params)?;
    let (order_by, pair_direction) = parse_order(options.order_by)?;
    let mut query = EmployeeQuery {
        order_by: order_by.unwrap_or_default(),
        direction: pair_direction.or(options.direction).unwrap_or_default(),
        ..Default::default()
    };

    if let Some(filter) = &options.filter {
        let value = Value::Object(filter.clone());
        let filter = Payload::new(&value, "where")?;
        filter
            .reject_unknown(&["isActive", "name", "email"], &[])
            .map_err(invalid)?;
        query.is_active = filter.boolean("isActive").map_err(invalid)?;
        query.name = filter.string("name").map_err(invalid)?;
        query.email = filter.string("email").map_err(invalid)?;
    }
    Ok(query)
}

pub fn record_query(params: Option<&Value>) -> Result<RecordQuery, ValidationError> {
    let options = read_options(params)?;
    let (order_by, pair_direction) = parse_order(options.order_by)?;
    let defaults = RecordQuery::default();
    let mut query = RecordQuery {
        order_by: order_by.unwrap_or(defaults.order_by),
        direction: pair_direction
            .or(options.direction)
            .unwrap_or(defaults.direction),
        ..defaults
    };

    if let Some(filter) = &options.filter {
        let value = Value::Object(filter.clone());
        let filter = Payload::new(&value, "where")?;
        filter
            .reject_unknown(&["employeeId", "year", "month"], &[])
            .map_err(invalid)?;
        query.employee_id = filter.integer("employeeId").map_err(invalid)?;
        query.year = filter
            .integer("year")
            .and_then(|y| y.map(check_year).transpose())
            .map_err(invalid)?;
        query.month = filter
            .integer("month")
            .and_then(|m| m.map(check_month).transpose())
            .map_err(invalid)?;
    }
    Ok(query)
}

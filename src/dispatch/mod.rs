//! Command dispatch: one entry point taking `{action, entity, params, data}`
//! and routing it to the employee or monthly record handler.
//!
//! Handlers return [`Outcome`] or [`DispatchError`]; [`Dispatcher::dispatch`]
//! folds both into a [`DispatchResponse`] and is the only place failures are
//! contained. It never panics on bad input and never propagates a fault.

mod clock;
mod coerce;
mod employee;
mod monthly_record;
mod options;
mod protocol;
mod schema;

pub use clock::{Clock, FixedClock, SystemClock};
pub use coerce::{coerce_integer, coerce_number, ValidationError};
pub use protocol::{
    DispatchError, DispatchRequest, DispatchResponse, EmployeeAction, Entity, FailureKind,
    Outcome, RecordAction,
};
pub use schema::{employee_schema, monthly_work_record_schema, schema_document};

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::store::{StoreError, WorkforceStore};
use coerce::{check_range, Payload};

const INVALID_REQUEST: &str = "Invalid request: action and entity are required";
const UNKNOWN_ERROR: &str = "Unknown error occurred";

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<Value, DispatchError> {
    Ok(serde_json::to_value(value)?)
}

/// Reads a positive id from `params[key]`, failing with `missing_message` when absent.
pub(crate) fn required_id(
    params: Option<&Value>,
    key: &'static str,
    missing_message: &str,
) -> Result<i64, DispatchError> {
    let Some(params) = params.filter(|value| value.is_object()) else {
        return Err(DispatchError::rejected(missing_message));
    };
    let params = Payload::new(params, "params")?;
    if !params.is_present(key) {
        return Err(DispatchError::rejected(missing_message));
    }
    let id = params
        .integer(key)?
        .ok_or_else(|| DispatchError::rejected(missing_message))?;
    Ok(check_range(key, id, 1, i64::MAX, "must be a positive integer")?)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn WorkforceStore>,
    clock: Arc<dyn Clock>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn WorkforceStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn WorkforceStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<dyn WorkforceStore> {
        &self.store
    }

    /// Routes the request and runs the handler, keeping the typed result.
    pub fn execute(&self, request: &DispatchRequest) -> Result<Outcome, DispatchError> {
        let (action, entity_name) = match (non_blank(&request.action), non_blank(&request.entity))
        {
            (Some(action), Some(entity)) => (action, entity),
            _ => return Err(DispatchError::rejected(INVALID_REQUEST)),
        };

        let entity = Entity::parse(entity_name)
            .ok_or_else(|| DispatchError::rejected(format!("Unknown entity: {}", entity_name)))?;
        let unknown_action = || DispatchError::rejected(format!("Unknown action: {}", action));

        let params = request.params.as_ref();
        let data = request.data.as_ref();
        match entity {
            Entity::Employee => {
                let action = EmployeeAction::parse(action).ok_or_else(unknown_action)?;
                debug!("Dispatching employee {:?}", action);
                employee::handle(self.store.as_ref(), action, params, data)
            }
            Entity::MonthlyWorkRecord => {
                let action = RecordAction::parse(action).ok_or_else(unknown_action)?;
                debug!("Dispatching monthly record {:?}", action);
                monthly_record::handle(
                    self.store.as_ref(),
                    self.clock.as_ref(),
                    action,
                    params,
                    data,
                )
            }
        }
    }

    /// Runs the request and renders the result into the response envelope.
    pub fn dispatch(&self, request: &DispatchRequest) -> DispatchResponse {
        match self.execute(request) {
            Ok(Outcome::Done(data)) => DispatchResponse::ok(data),
            Ok(Outcome::Conflict { message, existing }) => {
                DispatchResponse::conflict(message, existing)
            }
            Err(err) => {
                if err.kind() == FailureKind::Fault {
                    error!(
                        "Dispatch of {:?} {:?} failed: {}",
                        request.action, request.entity, err
                    );
                } else {
                    debug!("Dispatch rejected: {}", err);
                }
                let message = err.to_string();
                if message.is_empty() {
                    DispatchResponse::failure(UNKNOWN_ERROR)
                } else {
                    DispatchResponse::failure(message)
                }
            }
        }
    }

    pub fn schema(&self) -> Result<Value, StoreError> {
        schema_document(self.store.as_ref())
    }
}

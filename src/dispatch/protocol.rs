//! Dispatch request/response envelope and routing vocabulary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::coerce::ValidationError;
use crate::store::StoreError;

// ============================================================================
// Envelope
// ============================================================================

/// Incoming command: `{action, entity, params?, data?}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl DispatchRequest {
    pub fn new(action: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            entity: Some(entity.into()),
            params: None,
            data: None,
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Uniform result envelope. A conflict is the one failure that carries `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchResponse {
    pub fn ok(data: Option<Value>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn conflict(message: impl Into<String>, existing: Value) -> Self {
        Self {
            success: false,
            data: Some(existing),
            error: Some(message.into()),
        }
    }
}

// ============================================================================
// Routing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Employee,
    MonthlyWorkRecord,
}

impl Entity {
    /// Case-insensitive, singular or plural.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "employee" | "employees" => Some(Entity::Employee),
            "monthlyworkrecord" | "monthlyworkrecords" => Some(Entity::MonthlyWorkRecord),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeAction {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl EmployeeAction {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "list" | "getall" => Some(EmployeeAction::List),
            "get" | "getbyid" => Some(EmployeeAction::Get),
            "create" => Some(EmployeeAction::Create),
            "update" => Some(EmployeeAction::Update),
            "delete" => Some(EmployeeAction::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    List,
    GetByEmployee,
    Get,
    /// Also reached through `addQuickRecord`.
    Create,
    Update,
    Delete,
}

impl RecordAction {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "list" | "getall" => Some(RecordAction::List),
            "getbyemployee" => Some(RecordAction::GetByEmployee),
            "get" | "getbyid" => Some(RecordAction::Get),
            "create" | "addquickrecord" => Some(RecordAction::Create),
            "update" => Some(RecordAction::Update),
            "delete" => Some(RecordAction::Delete),
            _ => None,
        }
    }
}

// ============================================================================
// Handler results
// ============================================================================

/// Successful or conflicting handler result; every other failure is a [`DispatchError`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Done(Option<Value>),
    Conflict { message: String, existing: Value },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Malformed or unroutable request, or a missing id/payload.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Coarse failure class, used to pick HTTP statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Invalid,
    NotFound,
    Conflict,
    Fault,
}

impl DispatchError {
    pub fn rejected(message: impl Into<String>) -> Self {
        DispatchError::Rejected(message.into())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            DispatchError::Rejected(_) | DispatchError::Validation(_) => FailureKind::Invalid,
            DispatchError::Store(StoreError::EmployeeNotFound)
            | DispatchError::Store(StoreError::RecordNotFound) => FailureKind::NotFound,
            DispatchError::Store(StoreError::DuplicatePeriod)
            | DispatchError::Store(StoreError::DuplicateEmail) => FailureKind::Conflict,
            DispatchError::Store(_) | DispatchError::Encode(_) => FailureKind::Fault,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_aliases_are_case_insensitive() {
        assert_eq!(Entity::parse("Employees"), Some(Entity::Employee));
        assert_eq!(
            Entity::parse("monthlyWorkRecord"),
            Some(Entity::MonthlyWorkRecord)
        );
        assert_eq!(Entity::parse("invoice"), None);
    }

    #[test]
    fn quick_record_is_create_for_records_only() {
        assert_eq!(
            RecordAction::parse("addQuickRecord"),
            Some(RecordAction::Create)
        );
        assert_eq!(EmployeeAction::parse("addQuickRecord"), None);
        assert_eq!(EmployeeAction::parse("getByEmployee"), None);
        assert_eq!(EmployeeAction::parse("GetAll"), Some(EmployeeAction::List));
    }

    #[test]
    fn response_omits_absent_fields() {
        let ok = serde_json::to_value(DispatchResponse::ok(None)).unwrap();
        assert_eq!(ok, json!({"success": true}));

        let conflict =
            serde_json::to_value(DispatchResponse::conflict("taken", json!({"id": 1}))).unwrap();
        assert_eq!(
            conflict,
            json!({"success": false, "error": "taken", "data": {"id": 1}})
        );
    }

    #[test]
    fn request_fields_are_all_optional() {
        let request: DispatchRequest = serde_json::from_value(json!({"action": "list"})).unwrap();
        assert_eq!(request.action.as_deref(), Some("list"));
        assert_eq!(request.entity, None);
    }
}

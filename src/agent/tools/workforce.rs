//! Workforce tools: each one maps to a dispatch call and renders the outcome
//! as text for the model.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::format::{format_brl, month_name};
use super::registry::{parse_args, AgentTool, ToolContext, ToolDefinition, ToolError};
use crate::dispatch::{coerce_integer, DispatchRequest, DispatchResponse, Dispatcher};
use crate::model::{Employee, MonthlyWorkRecord};

/// [`ToolContext`] key holding the [`Dispatcher`].
pub const DISPATCHER_KEY: &str = "dispatcher";

pub fn workforce_context(dispatcher: Dispatcher) -> ToolContext {
    let mut ctx = ToolContext::new();
    ctx.insert(DISPATCHER_KEY, dispatcher);
    ctx
}

fn dispatcher(ctx: &ToolContext) -> Result<Arc<Dispatcher>, ToolError> {
    ctx.require::<Dispatcher>(DISPATCHER_KEY)
}

fn text(s: impl Into<String>) -> Result<Value, ToolError> {
    Ok(Value::String(s.into()))
}

fn error_text(response: &DispatchResponse) -> String {
    format!(
        "Error: {}",
        response.error.as_deref().unwrap_or("Unknown error")
    )
}

fn pretty(value: &Value) -> Result<String, ToolError> {
    serde_json::to_string_pretty(value).map_err(|e| ToolError::ExecutionFailed(e.to_string()))
}

/// Renders `data` as pretty JSON on success, the error line otherwise.
fn render_data(response: DispatchResponse) -> Result<Value, ToolError> {
    if response.success {
        text(pretty(&response.data.unwrap_or(Value::Null))?)
    } else {
        text(error_text(&response))
    }
}

fn decode<T: for<'de> Deserialize<'de>>(data: Option<Value>) -> Result<T, ToolError> {
    serde_json::from_value(data.unwrap_or(Value::Null))
        .map_err(|e| ToolError::ExecutionFailed(format!("Unexpected response shape: {}", e)))
}

fn id_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": { "id": { "type": "integer", "description": description } },
        "required": ["id"]
    })
}

#[derive(Deserialize)]
struct IdArgs {
    id: i64,
}

// ============================================================================
// Employees
// ============================================================================

pub struct ListEmployeesTool;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListEmployeesArgs {
    filters: Option<String>,
    order_by: Option<String>,
}

#[async_trait]
impl AgentTool for ListEmployeesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "list_employees",
            "Lists all employees in the system",
            json!({
                "type": "object",
                "properties": {
                    "filters": {
                        "type": "string",
                        "description": "Optional JSON string with filter conditions, e.g. {\"isActive\": true}"
                    },
                    "orderBy": {
                        "type": "string",
                        "description": "Optional JSON string with ordering options, e.g. {\"name\": \"asc\"}"
                    }
                }
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: ListEmployeesArgs = parse_args(args)?;
        let mut params = Map::new();
        if let Some(filters) = args.filters {
            match serde_json::from_str::<Value>(&filters) {
                Ok(value) => params.insert("where".to_string(), value),
                Err(e) => return text(format!("Error parsing filters JSON: {}", e)),
            };
        }
        if let Some(order_by) = args.order_by {
            match serde_json::from_str::<Value>(&order_by) {
                Ok(value) => params.insert("orderBy".to_string(), value),
                Err(e) => return text(format!("Error parsing orderBy JSON: {}", e)),
            };
        }

        let request = DispatchRequest::new("list", "employee").with_params(Value::Object(params));
        render_data(dispatcher(ctx)?.dispatch(&request))
    }
}

pub struct GetEmployeeTool;

#[async_trait]
impl AgentTool for GetEmployeeTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "get_employee",
            "Gets an employee by their ID",
            id_schema("The ID of the employee to retrieve"),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: IdArgs = parse_args(args)?;
        let request = DispatchRequest::new("get", "employee").with_params(json!({ "id": args.id }));
        render_data(dispatcher(ctx)?.dispatch(&request))
    }
}

pub struct CreateEmployeeTool;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateEmployeeArgs {
    name: String,
    email: String,
    telephone: String,
    weekend_rate: Option<f64>,
    holiday_rate: Option<f64>,
}

#[async_trait]
impl AgentTool for CreateEmployeeTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "create_employee",
            "Creates a new employee",
            json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "The full name of the employee" },
                    "email": { "type": "string", "description": "The email address of the employee" },
                    "telephone": { "type": "string", "description": "The telephone number of the employee" },
                    "weekendRate": { "type": "number", "description": "Optional pay per weekend worked" },
                    "holidayRate": { "type": "number", "description": "Optional pay per holiday worked" }
                },
                "required": ["name", "email", "telephone"]
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: CreateEmployeeArgs = parse_args(args)?;
        let mut data = json!({
            "name": args.name,
            "email": args.email,
            "telephone": args.telephone,
        });
        if let Some(rate) = args.weekend_rate {
            data["weekendRate"] = json!(rate);
        }
        if let Some(rate) = args.holiday_rate {
            data["holidayRate"] = json!(rate);
        }

        let response = dispatcher(ctx)?.dispatch(&DispatchRequest::new("create", "employee").with_data(data));
        if !response.success {
            return text(error_text(&response));
        }
        let employee: Employee = decode(response.data)?;
        text(format!("Employee created successfully with ID: {}", employee.id))
    }
}

pub struct UpdateEmployeeTool;

#[derive(Deserialize)]
struct UpdateEmployeeArgs {
    id: i64,
    data: String,
}

#[async_trait]
impl AgentTool for UpdateEmployeeTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "update_employee",
            "Updates an existing employee",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "integer", "description": "The ID of the employee to update" },
                    "data": {
                        "type": "string",
                        "description": "JSON string with the employee data to update"
                    }
                },
                "required": ["id", "data"]
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: UpdateEmployeeArgs = parse_args(args)?;
        let data: Value = match serde_json::from_str(&args.data) {
            Ok(data) => data,
            Err(e) => return text(format!("Error parsing employee data JSON: {}", e)),
        };

        let request = DispatchRequest::new("update", "employee")
            .with_params(json!({ "id": args.id }))
            .with_data(data);
        let response = dispatcher(ctx)?.dispatch(&request);
        if response.success {
            text("Employee updated successfully")
        } else {
            text(error_text(&response))
        }
    }
}

pub struct DeleteEmployeeTool;

#[async_trait]
impl AgentTool for DeleteEmployeeTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "delete_employee",
            "Deletes an employee",
            id_schema("The ID of the employee to delete"),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: IdArgs = parse_args(args)?;
        let request = DispatchRequest::new("delete", "employee").with_params(json!({ "id": args.id }));
        let response = dispatcher(ctx)?.dispatch(&request);
        if response.success {
            text("Employee deleted successfully")
        } else {
            text(error_text(&response))
        }
    }
}

pub struct GetSchemaTool;

#[async_trait]
impl AgentTool for GetSchemaTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::no_params(
            "get_mcp_schema",
            "Gets the MCP schema with information about available entities and operations",
        )
    }

    async fn execute(&self, _args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        match dispatcher(ctx)?.schema() {
            Ok(schema) => text(pretty(&schema)?),
            Err(e) => text(format!("Error: {}", e)),
        }
    }
}

// ============================================================================
// Monthly records
// ============================================================================

pub struct AddMonthlyRecordTool;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddMonthlyRecordArgs {
    employee_id: Value,
    weekends_worked: Value,
    holidays_worked: Value,
    year: Option<Value>,
    month: Option<Value>,
    notes: Option<String>,
}

fn number_or_string(description: &str) -> Value {
    json!({ "type": ["integer", "string"], "description": description })
}

fn amount_lines(record: &MonthlyWorkRecord) -> Vec<String> {
    let mut lines = vec![
        format!("- Weekend Amount: {}", format_brl(record.weekend_amount)),
        format!("- Holiday Amount: {}", format_brl(record.holiday_amount)),
        format!("- Total Amount: {}", format_brl(record.total_amount)),
    ];
    if let Some(notes) = record.notes.as_deref().filter(|n| !n.is_empty()) {
        lines.push(format!("- Notes: {}", notes));
    }
    lines
}

fn period_line(record: &MonthlyWorkRecord) -> String {
    format!("- Period: {} {}", month_name(record.month), record.year)
}

fn added_summary(employee: &Employee, record: &MonthlyWorkRecord) -> String {
    let mut lines = vec![
        format!("Monthly record added successfully for {}:", employee.name),
        period_line(record),
        format!(
            "- Weekends Worked: {} (Rate: {})",
            record.weekends_worked,
            format_brl(employee.weekend_rate)
        ),
        format!(
            "- Holidays Worked: {} (Rate: {})",
            record.holidays_worked,
            format_brl(employee.holiday_rate)
        ),
    ];
    lines.extend(amount_lines(record));
    lines.join("\n")
}

fn conflict_summary(error: &str, existing: &MonthlyWorkRecord) -> String {
    let mut lines = vec![
        format!("Error: {}", error),
        String::new(),
        "Existing record details:".to_string(),
        period_line(existing),
        format!("- Weekends Worked: {}", existing.weekends_worked),
        format!("- Holidays Worked: {}", existing.holidays_worked),
    ];
    lines.extend(amount_lines(existing));
    lines.join("\n")
}

#[async_trait]
impl AgentTool for AddMonthlyRecordTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "add_monthly_record",
            "Quickly adds a monthly work record for an employee with weekends and holidays worked",
            json!({
                "type": "object",
                "properties": {
                    "employeeId": number_or_string("The ID of the employee to add the record for"),
                    "weekendsWorked": number_or_string("Number of weekends worked in the month"),
                    "holidaysWorked": number_or_string("Number of holidays worked in the month"),
                    "year": number_or_string("Year of the record (defaults to current year if not provided)"),
                    "month": number_or_string("Month of the record (1-12, defaults to current month if not provided)"),
                    "notes": { "type": "string", "description": "Optional notes about the record" }
                },
                "required": ["employeeId", "weekendsWorked", "holidaysWorked"]
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: AddMonthlyRecordArgs = parse_args(args)?;

        let Ok(employee_id) = coerce_integer("employeeId", &args.employee_id) else {
            return text("Error: Employee ID must be a valid number");
        };
        let Ok(weekends_worked) = coerce_integer("weekendsWorked", &args.weekends_worked) else {
            return text("Error: Weekends worked must be a valid number");
        };
        let Ok(holidays_worked) = coerce_integer("holidaysWorked", &args.holidays_worked) else {
            return text("Error: Holidays worked must be a valid number");
        };
        let year = match args.year.filter(|v| !v.is_null()) {
            Some(value) => match coerce_integer("year", &value) {
                Ok(year) => Some(year),
                Err(_) => return text("Error: Year must be a valid number"),
            },
            None => None,
        };
        let month = match args.month.filter(|v| !v.is_null()) {
            Some(value) => match coerce_integer("month", &value) {
                Ok(month) if (1..=12).contains(&month) => Some(month),
                _ => return text("Error: Month must be a valid number between 1 and 12"),
            },
            None => None,
        };

        let dispatcher = dispatcher(ctx)?;
        let lookup = dispatcher
            .dispatch(&DispatchRequest::new("get", "employee").with_params(json!({ "id": employee_id })));
        if !lookup.success {
            return text(error_text(&lookup));
        }
        let employee: Employee = decode(lookup.data)?;

        let mut data = json!({
            "employeeId": employee_id,
            "weekendsWorked": weekends_worked,
            "holidaysWorked": holidays_worked,
        });
        if let Some(year) = year {
            data["year"] = json!(year);
        }
        if let Some(month) = month {
            data["month"] = json!(month);
        }
        if let Some(notes) = args.notes.filter(|n| !n.is_empty()) {
            data["notes"] = json!(notes);
        }

        let response = dispatcher
            .dispatch(&DispatchRequest::new("addQuickRecord", "monthlyWorkRecord").with_data(data));
        if response.success {
            let record: MonthlyWorkRecord = decode(response.data)?;
            return text(added_summary(&employee, &record));
        }
        match response.data {
            Some(existing) => {
                let existing: MonthlyWorkRecord = decode(Some(existing))?;
                let error = response.error.as_deref().unwrap_or("Unknown error");
                text(conflict_summary(error, &existing))
            }
            None => text(error_text(&response)),
        }
    }
}

pub struct ListEmployeeRecordsTool;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListEmployeeRecordsArgs {
    employee_id: Value,
    year: Option<Value>,
    month: Option<Value>,
}

#[async_trait]
impl AgentTool for ListEmployeeRecordsTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "list_employee_records",
            "Lists the monthly work records of an employee, optionally for one year or month",
            json!({
                "type": "object",
                "properties": {
                    "employeeId": number_or_string("The ID of the employee"),
                    "year": number_or_string("Optional year to narrow the list"),
                    "month": number_or_string("Optional month (1-12) to narrow the list")
                },
                "required": ["employeeId"]
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: ListEmployeeRecordsArgs = parse_args(args)?;
        let mut params = json!({ "employeeId": args.employee_id });
        if let Some(year) = args.year {
            params["year"] = year;
        }
        if let Some(month) = args.month {
            params["month"] = month;
        }
        let request = DispatchRequest::new("getByEmployee", "monthlyWorkRecord").with_params(params);
        render_data(dispatcher(ctx)?.dispatch(&request))
    }
}

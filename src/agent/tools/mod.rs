//! Tools the agent can call, and the registry that holds them.

mod format;
mod registry;
mod workforce;

pub use format::{format_brl, month_name};
pub use registry::{
    parse_args, AgentTool, AgentToolRegistry, ToolContext, ToolDefinition, ToolError,
    SCHEMA_MISMATCH,
};
pub use workforce::{
    workforce_context, AddMonthlyRecordTool, CreateEmployeeTool, DeleteEmployeeTool,
    GetEmployeeTool, GetSchemaTool, ListEmployeeRecordsTool, ListEmployeesTool,
    UpdateEmployeeTool, DISPATCHER_KEY,
};

/// Registry with every workforce tool.
pub fn workforce_tools() -> AgentToolRegistry {
    let mut registry = AgentToolRegistry::new();
    registry.register(ListEmployeesTool);
    registry.register(GetEmployeeTool);
    registry.register(CreateEmployeeTool);
    registry.register(UpdateEmployeeTool);
    registry.register(DeleteEmployeeTool);
    registry.register(GetSchemaTool);
    registry.register(AddMonthlyRecordTool);
    registry.register(ListEmployeeRecordsTool);
    registry
}

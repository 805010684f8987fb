//! Workforce Server Library
//!
//! Employee and monthly payroll records behind a single dispatch entry point,
//! with REST routes, a tool-calling agent and a SQLite store.

pub mod agent;
pub mod config;
pub mod dispatch;
pub mod model;
pub mod server;
pub mod sqlite_persistence;
pub mod store;

// Re-export commonly used types for convenience
pub use dispatch::{DispatchRequest, DispatchResponse, Dispatcher};
pub use server::{run_server, RequestsLoggingLevel};
pub use store::{SqliteWorkforceStore, WorkforceStore};

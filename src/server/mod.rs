mod agent_routes;
pub mod config;
mod http_layers;
mod mcp_routes;
mod rest_routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};

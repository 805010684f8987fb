use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use workforce_server::config::{AppConfig, CliConfig, FileConfig};
use workforce_server::server::ServerConfig;
use workforce_server::{run_server, Dispatcher, RequestsLoggingLevel, SqliteWorkforceStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite database file. Created if missing.
    #[clap(value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3000)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Base URL of the OpenAI-compatible chat completions API.
    #[clap(long)]
    pub llm_base_url: Option<String>,

    /// Model used by the agent.
    #[clap(long)]
    pub llm_model: Option<String>,

    /// Maximum number of LLM calls per agent request.
    #[clap(long)]
    pub agent_max_iterations: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };

    let cli_config = CliConfig {
        db_path: cli_args.db_path,
        port: cli_args.port,
        logging_level: cli_args.logging_level,
        frontend_dir_path: cli_args.frontend_dir_path,
        llm_base_url: cli_args.llm_base_url,
        llm_model: cli_args.llm_model,
        agent_max_iterations: cli_args.agent_max_iterations,
        openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening SQLite database at {:?}...", app_config.db_path);
    let store = Arc::new(SqliteWorkforceStore::new(&app_config.db_path)?);
    let dispatcher = Dispatcher::new(store);

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level,
        port: app_config.port,
        frontend_dir_path: app_config.frontend_dir_path,
        db_path: Some(app_config.db_path),
    };

    run_server(server_config, dispatcher, app_config.agent).await
}

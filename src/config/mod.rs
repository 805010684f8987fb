mod file_config;

pub use file_config::{AgentConfig, FileConfig};

use crate::agent::llm::ApiKeySource;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";
pub const DEFAULT_AGENT_MAX_ITERATIONS: usize = 5;
const DEFAULT_AGENT_TIMEOUT_SEC: u64 = 120;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub agent_max_iterations: Option<usize>,
    /// Key taken from `OPENAI_API_KEY`.
    pub openai_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub agent: AgentSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: ApiKeySource,
    pub temperature: f32,
    pub max_iterations: usize,
    pub timeout: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            api_key: ApiKeySource::None,
            temperature: 0.0,
            max_iterations: DEFAULT_AGENT_MAX_ITERATIONS,
            timeout: Duration::from_secs(DEFAULT_AGENT_TIMEOUT_SEC),
        }
    }
}

impl AgentSettings {
    /// The agent runs only with a key source configured.
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_configured()
    }

    /// First five characters of a static key, for diagnostics.
    pub fn key_prefix(&self) -> Option<String> {
        match &self.api_key {
            ApiKeySource::Static(key) => Some(format!("{}...", key.chars().take(5).collect::<String>())),
            _ => None,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_path must be specified on the command line or in config file")
            })?;

        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let agent_file = file.agent.unwrap_or_default();
        let defaults = AgentSettings::default();
        let api_key = if let Some(cmd) = agent_file.api_key_command.filter(|c| !c.trim().is_empty()) {
            ApiKeySource::Command(cmd)
        } else if let Some(key) = agent_file
            .api_key
            .or_else(|| cli.openai_api_key.clone())
            .filter(|k| !k.trim().is_empty())
        {
            ApiKeySource::Static(key)
        } else {
            ApiKeySource::None
        };

        let max_iterations = agent_file
            .max_iterations
            .or(cli.agent_max_iterations)
            .unwrap_or(defaults.max_iterations);
        if max_iterations == 0 {
            bail!("agent max_iterations must be at least 1");
        }

        let agent = AgentSettings {
            base_url: agent_file
                .base_url
                .or_else(|| cli.llm_base_url.clone())
                .unwrap_or(defaults.base_url),
            model: agent_file
                .model
                .or_else(|| cli.llm_model.clone())
                .unwrap_or(defaults.model),
            api_key,
            temperature: agent_file.temperature.unwrap_or(defaults.temperature),
            max_iterations,
            timeout: agent_file
                .timeout_sec
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        };

        Ok(Self {
            db_path,
            port,
            logging_level,
            frontend_dir_path,
            agent,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

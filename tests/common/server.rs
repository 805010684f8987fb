//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own database file.

use super::constants::*;
use super::mock_llm::MockLlm;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use workforce_server::agent::ApiKeySource;
use workforce_server::config::AgentSettings;
use workforce_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use workforce_server::{Dispatcher, SqliteWorkforceStore};

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and the temp dir is removed.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Dispatcher sharing the server's store, for direct checks in tests
    pub dispatcher: Dispatcher,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server on a random port with the agent disabled.
    pub async fn spawn() -> Self {
        Self::spawn_with_settings(AgentSettings::default()).await
    }

    /// Spawns a server whose agent talks to `llm`.
    pub async fn spawn_with_agent(llm: &MockLlm) -> Self {
        Self::spawn_with_settings(AgentSettings {
            base_url: llm.base_url.clone(),
            model: TEST_LLM_MODEL.to_string(),
            api_key: ApiKeySource::Static(TEST_LLM_KEY.to_string()),
            ..Default::default()
        })
        .await
    }

    async fn spawn_with_settings(agent_settings: AgentSettings) -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_db_dir.path().join("workforce.db");
        let store =
            Arc::new(SqliteWorkforceStore::new(&db_path).expect("Failed to open workforce store"));
        let dispatcher = Dispatcher::new(store);

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            frontend_dir_path: None,
            db_path: Some(db_path),
        };
        let app = make_app(config, dispatcher.clone(), agent_settings).expect("Failed to build app");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            dispatcher,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home route
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

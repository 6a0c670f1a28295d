//! Diligent Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use diligent_core::DiligentConfig;
use tokio::net::TcpListener;
use tracing::{error, info};

pub struct DiligentServer {
    config: WebConfig,
    state: AppState,
}

impl DiligentServer {
    pub async fn new(config: WebConfig, settings: DiligentConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone(), settings).await?;

        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting Diligent Web Server");
        info!("Development mode: {}", self.config.dev_mode);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server shut down");
        Ok(())
    }

    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Builder for DiligentServer
pub struct DiligentServerBuilder {
    config: WebConfig,
    settings: DiligentConfig,
}

impl DiligentServerBuilder {
    pub fn new() -> Self {
        Self {
            config: WebConfig::default(),
            settings: DiligentConfig::default(),
        }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable development mode
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Serve a built frontend from this directory
    pub fn static_dir<S: Into<String>>(mut self, static_dir: S) -> Self {
        self.config.static_dir = Some(static_dir.into());
        self
    }

    /// Backend configuration (directory, sessions, storage)
    pub fn settings(mut self, settings: DiligentConfig) -> Self {
        self.settings = settings;
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<DiligentServer> {
        DiligentServer::new(self.config, self.settings).await
    }
}

impl Default for DiligentServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Start a server configured from the environment
pub async fn start_server() -> WebResult<()> {
    let config = WebConfig::from_env();
    let settings = config.load_settings()?;
    DiligentServer::new(config, settings).await?.start().await
}

//! Chronicle Web Server
//!
//! Binds the listener and serves the router built by `create_app`.

use crate::{create_app, AppState, WebError, WebResult};
use axum::serve;
use tokio::net::TcpListener;
use tracing::{error, info};

pub struct ChronicleServer {
    address: String,
    state: AppState,
}

impl ChronicleServer {
    pub fn new(address: String, state: AppState) -> Self {
        Self { address, state }
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        info!("Starting Chronicle web server on http://{}", self.address);

        let app = create_app(self.state.clone());
        let listener = TcpListener::bind(&self.address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", self.address);

        if let Err(e) = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server stopped");
        Ok(())
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

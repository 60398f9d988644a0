//! TCP accept loop for the relay process.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::handler;
use super::registry::RoomRegistry;

/// Listening address configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8888,
        }
    }
}

/// The relay process: accepts participants and spawns one handler task
/// per connection.
pub struct RelayServer {
    listener: TcpListener,
    registry: Arc<RoomRegistry>,
}

impl RelayServer {
    /// Binds the listening socket.
    pub async fn bind(config: &ServerConfig, registry: Arc<RoomRegistry>) -> Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
        info!(host = %config.host, port = config.port, "relay server listening");
        Ok(Self { listener, registry })
    }

    /// Returns the bound address (useful when binding port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections forever.
    ///
    /// Each accepted participant runs in its own task; a handler failing
    /// never takes the accept loop down.
    pub async fn serve(self) -> Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            info!(%peer, "accepted connection");
            let registry = self.registry.clone();
            tokio::spawn(async move {
                if let Err(err) = handler::run(stream, registry).await {
                    error!(%peer, %err, "connection handler failed");
                }
            });
        }
    }
}

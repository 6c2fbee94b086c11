use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::store::LocationStore;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
///
/// Built once at startup and handed to every handler through axum's `State`
/// extractor. The store handle is the only long-lived resource.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Location storage (shared across requests)
    pub store: Arc<dyn LocationStore>,

    started_at: Instant,
}

impl ServerState {
    /// Create state around an already opened store.
    pub fn new(config: ServerConfig, store: Arc<dyn LocationStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            started_at: Instant::now(),
        }
    }

    /// Open the configured backend and build state around it.
    pub async fn connect(config: ServerConfig) -> ServerResult<Self> {
        let store = config.backend_config()?.connect().await?;
        Ok(Self::new(config, store))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

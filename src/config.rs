use crate::error::{ServerError, ServerResult};
use crate::store::BackendConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Conventional variable holding the MongoDB connection string.
pub const MONGO_URL_ENV: &str = "MONGO_PUBLIC_URL";

/// Conventional variable holding the listen port.
pub const PORT_ENV: &str = "PORT";

/// Which storage backend to run against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Mongo,
    Memory,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Storage backend
    #[serde(default)]
    pub backend: BackendKind,

    /// MongoDB connection string; required for the mongo backend
    #[serde(default)]
    pub mongo_url: Option<String>,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in MB
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            backend: BackendKind::default(),
            mongo_url: None,
            database: default_database(),
            collection: default_collection(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional `server` file and the environment.
    ///
    /// Precedence, lowest first: defaults, `server.{toml,yaml,json}`,
    /// `GEOLOC__*` variables, then `MONGO_PUBLIC_URL` and `PORT`.
    /// `.env` should already have been applied by the caller.
    pub fn load() -> anyhow::Result<Self> {
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(config::Environment::with_prefix("GEOLOC").separator("__"))
            .set_override_option("mongo_url", non_blank_env(MONGO_URL_ENV))?
            .set_override_option("port", non_blank_env(PORT_ENV))?;

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> ServerResult<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }

    /// Storage backend settings. The mongo backend needs a non-blank URL.
    pub fn backend_config(&self) -> ServerResult<BackendConfig> {
        match self.backend {
            BackendKind::Memory => Ok(BackendConfig::in_memory()),
            BackendKind::Mongo => {
                let uri = self
                    .mongo_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|uri| !uri.is_empty())
                    .ok_or_else(|| {
                        ServerError::Config(format!("{MONGO_URL_ENV} environment variable is not set"))
                    })?;
                Ok(BackendConfig::mongo(
                    uri,
                    &self.database,
                    &self.collection,
                    self.timeout(),
                ))
            }
        }
    }
}

/// An empty or whitespace-only variable counts as unset.
fn non_blank_env(name: &str) -> Option<String> {
    non_blank(std::env::var(name).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database() -> String {
    "test".to_string()
}

fn default_collection() -> String {
    "locations".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

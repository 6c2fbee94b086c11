//! Storage adapter for location records.
//!
//! Handlers talk to a [`LocationStore`]; which implementation backs it is
//! decided once at startup through [`BackendConfig`]:
//!
//! - [`MongoStore`]: the production backend. Connects by URI, verifies the
//!   deployment answers a ping, and makes sure a `2dsphere` index exists on
//!   the `location` field.
//! - [`InMemoryStore`]: a `RwLock`-guarded map with the same semantics, used
//!   by tests and for local runs without a database.
//!
//! Every operation is a single round trip. Nothing is retried and no
//! operation spans more than one document.

mod memory;
mod mongo;

pub use memory::InMemoryStore;
pub use mongo::MongoStore;

use crate::model::{Location, LocationId, LocationInput};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Operations the HTTP handlers need from storage.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Persist a new record. The backend assigns `id` and `created_at`.
    async fn insert(&self, input: LocationInput) -> StoreResult<Location>;

    /// Every record in the collection, in no particular order.
    async fn find_all(&self) -> StoreResult<Vec<Location>>;

    /// Replace `name`, `description` and `location` of the record with `id`.
    /// Returns the number of matched records (0 or 1).
    async fn replace_fields(&self, id: &LocationId, input: LocationInput) -> StoreResult<u64>;

    /// Remove the record with `id`. Returns the number of deleted records.
    async fn delete_by_id(&self, id: &LocationId) -> StoreResult<u64>;

    /// Cheap reachability check.
    async fn ping(&self) -> StoreResult<()>;
}

/// Selects and builds a storage backend.
#[derive(Clone, Debug)]
pub enum BackendConfig {
    /// MongoDB deployment reachable at `uri`.
    Mongo {
        uri: String,
        database: String,
        collection: String,
        /// Upper bound on server-side execution of collection scans.
        query_timeout: Duration,
    },
    /// Process-local map; contents are lost on exit.
    InMemory,
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    pub fn mongo<U, D, C>(uri: U, database: D, collection: C, query_timeout: Duration) -> Self
    where
        U: Into<String>,
        D: Into<String>,
        C: Into<String>,
    {
        BackendConfig::Mongo {
            uri: uri.into(),
            database: database.into(),
            collection: collection.into(),
            query_timeout,
        }
    }

    /// Open the configured backend.
    ///
    /// For MongoDB this connects, pings and ensures the geospatial index; an
    /// unreachable deployment is an error, a failed index build is not.
    pub async fn connect(&self) -> StoreResult<Arc<dyn LocationStore>> {
        match self {
            BackendConfig::InMemory => Ok(Arc::new(InMemoryStore::new())),
            BackendConfig::Mongo {
                uri,
                database,
                collection,
                query_timeout,
            } => {
                let store = MongoStore::connect(uri, database, collection, *query_timeout).await?;
                Ok(Arc::new(store))
            }
        }
    }
}

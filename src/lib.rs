//! Geoloc Server - HTTP CRUD over geotagged location records
//!
//! A small axum service that stores named places, each carrying a GeoJSON
//! point, in a MongoDB collection with a `2dsphere` index on `location`.
//!
//! # API Endpoints
//!
//! - `POST /locations` - create a record, `201` with the stored record
//! - `GET /locations` - every record as a JSON array
//! - `PUT /locations/{id}` - replace name, description and location
//! - `DELETE /locations/{id}` - remove a record
//! - `GET /health`, `GET /ready` - liveness and readiness probes
//!
//! Errors are returned as `{"error": {"code": ..., "message": ...}}`.
//!
//! # Configuration
//!
//! `MONGO_PUBLIC_URL` (required) and `PORT` (default 8080), optionally from a
//! `.env` file. Everything else lives in [`ServerConfig`].

pub mod config;
pub mod error;
pub mod middleware;
pub mod model;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use model::{Location, LocationId, LocationInput, Point};
pub use server::{build_router, init_tracing, start_server};
pub use state::ServerState;
pub use store::{BackendConfig, InMemoryStore, LocationStore, MongoStore, StoreError};

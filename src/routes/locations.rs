//! CRUD handlers for `/locations`.
//!
//! Each handler performs exactly one store call. Update and delete share one
//! acknowledgement shape: `200 {"status": "success", "message": ...}`.

use crate::error::{ServerError, ServerResult};
use crate::model::{LocationId, LocationInput};
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Success body for update and delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub status: String,
    pub message: String,
}

impl Acknowledgement {
    fn success(id: &LocationId, action: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: format!("Location with ID {id} was successfully {action}"),
        }
    }
}

fn parse_id(raw: &str) -> ServerResult<LocationId> {
    Ok(raw.parse::<LocationId>()?)
}

/// Decode a create/update body regardless of the `Content-Type` header.
/// Only a body that is not JSON of the expected shape is rejected.
fn decode_input(body: Result<Bytes, BytesRejection>) -> ServerResult<LocationInput> {
    let bytes = body?;
    serde_json::from_slice(&bytes)
        .map_err(|err| ServerError::BadRequest(format!("Invalid JSON body: {err}")))
}

/// `POST /locations`: store a new record and return it with `201 Created`.
pub async fn create_location(
    State(state): State<Arc<ServerState>>,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<impl IntoResponse> {
    let input = decode_input(body)?;

    let record = state.store.insert(input).await?;
    tracing::info!(id = %record.id, name = %record.name, "Location created");

    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /locations`: every stored record as a JSON array.
pub async fn list_locations(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let records = state.store.find_all().await?;
    tracing::debug!(count = records.len(), "Listed locations");
    Ok(Json(records))
}

/// `PUT /locations/{id}`: replace name, description and location.
pub async fn update_location(
    State(state): State<Arc<ServerState>>,
    Path(raw_id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<impl IntoResponse> {
    let id = parse_id(&raw_id)?;
    let input = decode_input(body)?;

    let matched = state.store.replace_fields(&id, input).await?;
    if matched == 0 {
        return Err(ServerError::location_not_found());
    }

    tracing::info!(id = %id, "Location updated");
    Ok(Json(Acknowledgement::success(&id, "updated")))
}

/// `DELETE /locations/{id}`
pub async fn delete_location(
    State(state): State<Arc<ServerState>>,
    Path(raw_id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let id = parse_id(&raw_id)?;

    let deleted = state.store.delete_by_id(&id).await?;
    if deleted == 0 {
        return Err(ServerError::location_not_found());
    }

    tracing::info!(id = %id, "Location deleted");
    Ok(Json(Acknowledgement::success(&id, "deleted")))
}

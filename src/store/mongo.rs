use super::{LocationStore, StoreError, StoreResult};
use crate::model::{Location, LocationId, LocationInput, Point};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{self, doc, Document};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const APP_NAME: &str = "geoloc-server";

/// Stored layout of a location. `created_at` is a native BSON datetime so the
/// field sorts and filters server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LocationDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    location: Point,
    created_at: bson::DateTime,
}

impl From<&Location> for LocationDocument {
    fn from(loc: &Location) -> Self {
        Self {
            id: loc.id.object_id(),
            name: loc.name.clone(),
            description: loc.description.clone(),
            location: loc.location.clone(),
            created_at: bson::DateTime::from_millis(loc.created_at.timestamp_millis()),
        }
    }
}

impl TryFrom<LocationDocument> for Location {
    type Error = StoreError;

    fn try_from(doc: LocationDocument) -> Result<Self, Self::Error> {
        let millis = doc.created_at.timestamp_millis();
        let created_at = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            StoreError::Serialization(format!(
                "created_at of {} out of range: {millis} ms",
                doc.id.to_hex()
            ))
        })?;
        Ok(Self {
            id: LocationId::from(doc.id),
            name: doc.name,
            description: doc.description,
            location: doc.location,
            created_at,
        })
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::ConnectionPoolCleared { .. } => StoreError::Connection(err.to_string()),
            _ => StoreError::Query(err.to_string()),
        }
    }
}

impl From<bson::ser::Error> for StoreError {
    fn from(err: bson::ser::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// MongoDB-backed store holding one long-lived client.
///
/// `Client` is internally pooled and cheap to clone, so a single instance is
/// shared by every request.
pub struct MongoStore {
    client: Client,
    collection: Collection<LocationDocument>,
    query_timeout: Duration,
}

impl MongoStore {
    /// Connect, verify reachability and ensure the geospatial index.
    pub async fn connect(
        uri: &str,
        database: &str,
        collection: &str,
        query_timeout: Duration,
    ) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        options.app_name = Some(APP_NAME.to_string());

        let client = Client::with_options(options)?;
        let store = Self {
            collection: client.database(database).collection(collection),
            client,
            query_timeout,
        };

        store.ping().await?;
        tracing::info!(database, collection, "Connected to MongoDB");

        store.ensure_geo_index().await;
        Ok(store)
    }

    /// Create the `2dsphere` index on `location`. Failure is logged and
    /// otherwise ignored; an identical existing index is not an error.
    async fn ensure_geo_index(&self) {
        let index = IndexModel::builder()
            .keys(doc! { "location": "2dsphere" })
            .build();

        match self.collection.create_index(index).await {
            Ok(result) => {
                tracing::info!(index = %result.index_name, "2dsphere index on 'location' verified")
            }
            Err(err) => {
                tracing::warn!(error = %err, "2dsphere index creation failed (it may already exist)")
            }
        }
    }
}

fn id_filter(id: &LocationId) -> Document {
    doc! { "_id": id.object_id() }
}

fn replace_update(input: &LocationInput) -> StoreResult<Document> {
    let mut set = doc! {
        "name": input.name.as_str(),
        "location": bson::to_bson(&input.location)?,
    };

    match &input.description {
        Some(description) => {
            set.insert("description", description.as_str());
            Ok(doc! { "$set": set })
        }
        None => Ok(doc! { "$set": set, "$unset": { "description": "" } }),
    }
}

#[async_trait]
impl LocationStore for MongoStore {
    async fn insert(&self, input: LocationInput) -> StoreResult<Location> {
        let record = Location::create(input);
        self.collection
            .insert_one(LocationDocument::from(&record))
            .await?;
        Ok(record)
    }

    async fn find_all(&self) -> StoreResult<Vec<Location>> {
        let cursor = self
            .collection
            .find(doc! {})
            .max_time(self.query_timeout)
            .await?;
        let documents: Vec<LocationDocument> = cursor.try_collect().await?;
        documents.into_iter().map(Location::try_from).collect()
    }

    async fn replace_fields(&self, id: &LocationId, input: LocationInput) -> StoreResult<u64> {
        let update = replace_update(&input)?;
        let result = self.collection.update_one(id_filter(id), update).await?;
        Ok(result.matched_count)
    }

    async fn delete_by_id(&self, id: &LocationId) -> StoreResult<u64> {
        let result = self.collection.delete_one(id_filter(id)).await?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}

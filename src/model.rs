//! Location records and their GeoJSON payloads.
//!
//! These are the wire types of the HTTP API. Storage backends map them onto
//! their own document layout (see [`crate::store`]).

use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// GeoJSON geometry tag used for every stored point.
pub const POINT_TYPE: &str = "Point";

/// Opaque record identifier, a 12-byte ObjectId rendered as 24 hex chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocationId(ObjectId);

impl LocationId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for LocationId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

/// Returned when a path segment is not a 24-character hex identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid location id {0:?}")]
pub struct InvalidLocationId(pub String);

impl FromStr for LocationId {
    type Err = InvalidLocationId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(Self)
            .map_err(|_| InvalidLocationId(s.to_string()))
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl Serialize for LocationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for LocationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// GeoJSON point. Coordinates are longitude first; ranges are not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

impl Point {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: POINT_TYPE.to_string(),
            coordinates: vec![longitude, latitude],
        }
    }
}

/// Client payload for create and update.
///
/// Any `id` or `created_at` the client sends is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub location: Point,
}

/// A stored location record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub location: Point,
    pub created_at: DateTime<Utc>,
}

impl Location {
    /// Build a new record with a fresh id and the current time.
    ///
    /// The timestamp is truncated to milliseconds, the resolution of a BSON
    /// datetime, so the value handed back on create matches later reads.
    pub fn create(input: LocationInput) -> Self {
        Self {
            id: LocationId::generate(),
            name: input.name,
            description: input.description,
            location: input.location,
            created_at: Utc::now().trunc_subsecs(3),
        }
    }

    /// Overwrite the mutable fields; `id` and `created_at` are kept.
    pub fn replace_fields(&mut self, input: LocationInput) {
        self.name = input.name;
        self.description = input.description;
        self.location = input.location;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn location_id_parses_hex() {
        let id: LocationId = "65a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap();
        assert_eq!(id.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn location_id_rejects_bad_format() {
        assert!("not-an-id".parse::<LocationId>().is_err());
        assert!("65a1f0c2e4b0a1b2c3d4e5".parse::<LocationId>().is_err());
        assert!("zza1f0c2e4b0a1b2c3d4e5f6".parse::<LocationId>().is_err());
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = LocationId::generate();
        let b = LocationId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn input_ignores_client_id_and_timestamp() {
        let input: LocationInput = serde_json::from_value(json!({
            "id": "65a1f0c2e4b0a1b2c3d4e5f6",
            "created_at": "2020-01-01T00:00:00Z",
            "name": "Cafe",
            "location": {"type": "Point", "coordinates": [106.8, -6.2]}
        }))
        .unwrap();

        assert_eq!(input.name, "Cafe");
        assert_eq!(input.description, None);
        assert_eq!(input.location, Point::new(106.8, -6.2));
    }

    #[test]
    fn input_requires_name_and_location() {
        let missing_name = serde_json::from_value::<LocationInput>(json!({
            "location": {"type": "Point", "coordinates": [1.0, 2.0]}
        }));
        assert!(missing_name.is_err());

        let missing_location = serde_json::from_value::<LocationInput>(json!({"name": "x"}));
        assert!(missing_location.is_err());
    }

    #[test]
    fn location_serializes_wire_shape() {
        let loc = Location::create(LocationInput {
            name: "Cafe".into(),
            description: None,
            location: Point::new(106.8, -6.2),
        });
        let value = serde_json::to_value(&loc).unwrap();

        assert_eq!(value["id"], json!(loc.id.to_string()));
        assert_eq!(value["location"]["type"], "Point");
        assert_eq!(value["location"]["coordinates"], json!([106.8, -6.2]));
        assert!(value.get("description").is_none());
        assert!(value["created_at"].is_string());
    }

    #[test]
    fn created_at_has_millisecond_precision() {
        let loc = Location::create(LocationInput {
            name: "x".into(),
            description: None,
            location: Point::new(0.0, 0.0),
        });
        assert_eq!(loc.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn replace_fields_keeps_identity() {
        let mut loc = Location::create(LocationInput {
            name: "Cafe".into(),
            description: Some("old".into()),
            location: Point::new(1.0, 1.0),
        });
        let (id, created_at) = (loc.id, loc.created_at);

        loc.replace_fields(LocationInput {
            name: "Cafe Renamed".into(),
            description: None,
            location: Point::new(2.0, 2.0),
        });

        assert_eq!(loc.id, id);
        assert_eq!(loc.created_at, created_at);
        assert_eq!(loc.name, "Cafe Renamed");
        assert_eq!(loc.description, None);
        assert_eq!(loc.location, Point::new(2.0, 2.0));
    }
}

use super::{LocationStore, StoreError, StoreResult};
use crate::model::{Location, LocationId, LocationInput};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// An in-memory backend using a `RwLock` around a `BTreeMap`.
///
/// Locks are never held across an await point.
pub struct InMemoryStore {
    records: RwLock<BTreeMap<LocationId, Location>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.records.read().map(|guard| guard.len()).unwrap_or(0)
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::backend("poisoned lock")
}

#[async_trait]
impl LocationStore for InMemoryStore {
    async fn insert(&self, input: LocationInput) -> StoreResult<Location> {
        let record = Location::create(input);
        self.records
            .write()
            .map_err(poisoned)?
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_all(&self) -> StoreResult<Vec<Location>> {
        let guard = self.records.read().map_err(poisoned)?;
        Ok(guard.values().cloned().collect())
    }

    async fn replace_fields(&self, id: &LocationId, input: LocationInput) -> StoreResult<u64> {
        let mut guard = self.records.write().map_err(poisoned)?;
        match guard.get_mut(id) {
            Some(record) => {
                record.replace_fields(input);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_by_id(&self, id: &LocationId) -> StoreResult<u64> {
        let removed = self.records.write().map_err(poisoned)?.remove(id);
        Ok(u64::from(removed.is_some()))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;

    fn cafe() -> LocationInput {
        LocationInput {
            name: "Cafe".into(),
            description: Some("corner".into()),
            location: Point::new(106.8, -6.2),
        }
    }

    #[tokio::test]
    async fn insert_assigns_identity() {
        let store = InMemoryStore::new();
        let a = store.insert(cafe()).await.unwrap();
        let b = store.insert(cafe()).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn find_all_on_empty_store() {
        let store = InMemoryStore::new();
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_fields_reports_matches() {
        let store = InMemoryStore::new();
        let created = store.insert(cafe()).await.unwrap();

        let update = LocationInput {
            name: "Cafe Renamed".into(),
            description: None,
            location: Point::new(1.0, 2.0),
        };
        assert_eq!(store.replace_fields(&created.id, update.clone()).await.unwrap(), 1);
        assert_eq!(store.replace_fields(&created.id, update).await.unwrap(), 1);
        assert_eq!(
            store
                .replace_fields(&LocationId::generate(), cafe())
                .await
                .unwrap(),
            0
        );

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, created.id);
        assert_eq!(all[0].created_at, created.created_at);
        assert_eq!(all[0].name, "Cafe Renamed");
        assert_eq!(all[0].description, None);
    }

    #[tokio::test]
    async fn delete_by_id_counts() {
        let store = InMemoryStore::new();
        let created = store.insert(cafe()).await.unwrap();

        assert_eq!(store.delete_by_id(&created.id).await.unwrap(), 1);
        assert_eq!(store.delete_by_id(&created.id).await.unwrap(), 0);
        assert!(store.is_empty());
    }
}

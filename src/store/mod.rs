//! The authoritative list of saved places.
//!
//! `PlacesStore` owns the newest-first collection and keeps the persistence
//! provider eventually consistent with it. Every mutation enqueues one write of
//! the whole collection; writes are applied in mutation order by a single
//! background worker and are never awaited by the mutation itself.
//!
//! Load and write failures are logged and otherwise swallowed: a corrupt or
//! unreadable snapshot opens as an empty store, a failed write leaves the
//! persisted copy stale until the next successful one.

mod snapshot;
mod write_back;

use crate::entities::{Coordinates, Place};
use crate::error::Error;
use crate::map::Marker;
use crate::storage::{DynStore, KeyValueStore};

pub use snapshot::{decode, encode};
pub use write_back::{WriteBackQueue, WriteBackStats};

pub const DEFAULT_KEY: &str = "@places_v1";

pub struct PlacesStore {
    places: Vec<Place>,
    write_back: WriteBackQueue,
    load_error: Option<Error>,
}

impl PlacesStore {
    /// Reads the persisted collection under `key`.
    #[tracing::instrument(skip(storage))]
    pub async fn load(
        storage: &(dyn KeyValueStore + Send + Sync),
        key: &str,
    ) -> Result<Vec<Place>, Error> {
        let raw = storage.get(key).await?;
        snapshot::decode(raw.as_deref())
    }

    /// Loads the persisted collection and starts the write-back worker.
    ///
    /// Must be called from within a tokio runtime.
    #[tracing::instrument(name = "PlacesStore::open", skip(storage, key))]
    pub async fn open(storage: DynStore, key: impl Into<String>) -> Self {
        let key = key.into();

        let (places, load_error) = match Self::load(storage.as_ref(), &key).await {
            Ok(places) => (places, None),
            Err(err) => {
                // TODO: surface load failures to the user instead of opening an empty list
                tracing::warn!(code = err.code, "failed to load saved places: {}", err);
                (Vec::new(), Some(err))
            }
        };

        tracing::info!("loaded {} saved places", places.len());

        Self {
            places,
            write_back: WriteBackQueue::spawn(storage, key),
            load_error,
        }
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn get(&self, id: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// The condition recorded when the initial load failed, if it did.
    pub fn load_error(&self) -> Option<&Error> {
        self.load_error.as_ref()
    }

    pub fn write_back_stats(&self) -> &WriteBackStats {
        self.write_back.stats()
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.places.iter().map(Marker::from).collect()
    }

    /// Validates and prepends a new place, then schedules a write-back.
    ///
    /// Fails with `MissingLocation` when `coordinate` is `None` and with
    /// `InvalidInput` when the coordinate is out of range or the trimmed name
    /// is empty; the collection is left untouched in every case.
    #[tracing::instrument(skip(self))]
    pub fn add(
        &mut self,
        name: &str,
        description: &str,
        coordinate: Option<Coordinates>,
    ) -> Result<Place, Error> {
        let place = Place::new(name, description, coordinate)?;

        self.places.insert(0, place.clone());
        self.write_back.enqueue(&self.places);

        tracing::info!(id = %place.id, "saved place");

        Ok(place)
    }

    /// Removes the place with `id` if present. Returns whether anything was removed.
    #[tracing::instrument(skip(self))]
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.places.len();
        self.places.retain(|p| p.id != id);
        self.write_back.enqueue(&self.places);

        before != self.places.len()
    }

    /// Waits until every write-back scheduled so far has been attempted.
    pub async fn flush(&self) {
        self.write_back.flush().await
    }

    /// Drains pending write-backs and stops the worker.
    pub async fn close(self) {
        self.write_back.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{
        Error, CORRUPT_STATE, INVALID_INPUT, MISSING_LOCATION, PERSISTENCE_FAILURE,
    };
    use crate::storage::MemoryStore;

    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn memory() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    async fn persisted(storage: &MemoryStore) -> Vec<Place> {
        let raw = storage.get(DEFAULT_KEY).await.unwrap();
        decode(raw.as_deref()).unwrap()
    }

    /// Records every write and sleeps a little on the first ones so that
    /// reordering would show up.
    #[derive(Default)]
    struct SlowRecorder {
        writes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl KeyValueStore for SlowRecorder {
        async fn get(&self, _key: &str) -> Result<Option<String>, Error> {
            Ok(None)
        }

        async fn set(&self, _key: &str, value: &str) -> Result<(), Error> {
            let delay = 20u64.saturating_sub(5 * self.writes.lock().unwrap().len() as u64);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.writes.lock().unwrap().push(value.to_string());
            Ok(())
        }
    }

    struct Broken;

    #[async_trait]
    impl KeyValueStore for Broken {
        async fn get(&self, _key: &str) -> Result<Option<String>, Error> {
            Err(crate::error::persistence_error("io"))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), Error> {
            Err(crate::error::persistence_error("io"))
        }
    }

    #[tokio::test]
    async fn home_then_cafe_then_remove_home() {
        let storage = memory();
        let mut store = PlacesStore::open(storage.clone(), DEFAULT_KEY).await;
        assert!(store.is_empty());

        let home = store
            .add("Home", "", Some(Coordinates::new(13.75, 100.50)))
            .unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.places()[0].name, "Home");
        assert_eq!(store.places()[0].coordinate, Coordinates::new(13.75, 100.50));

        let cafe = store
            .add("Cafe", "Good coffee", Some(Coordinates::new(13.76, 100.51)))
            .unwrap();
        let names: Vec<&str> = store.places().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Cafe", "Home"]);

        assert!(store.remove(&home.id));
        assert_eq!(store.places(), &[cafe.clone()]);

        store.flush().await;
        assert_eq!(persisted(&storage).await, vec![cafe]);
    }

    #[tokio::test]
    async fn blank_name_is_rejected_without_mutation() {
        let storage = memory();
        let mut store = PlacesStore::open(storage.clone(), DEFAULT_KEY).await;

        for name in ["", "   ", "\t\n"] {
            let err = store
                .add(name, "", Some(Coordinates::new(0.0, 0.0)))
                .unwrap_err();
            assert_eq!(err.code, INVALID_INPUT);
        }
        assert!(store.is_empty());

        store.flush().await;
        assert_eq!(storage.get(DEFAULT_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_location_is_rejected_without_mutation() {
        let mut store = PlacesStore::open(memory(), DEFAULT_KEY).await;

        let err = store.add("Home", "", None).unwrap_err();
        assert_eq!(err.code, MISSING_LOCATION);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn remove_absent_id_is_noop() {
        let mut store = PlacesStore::open(memory(), DEFAULT_KEY).await;
        let home = store
            .add("Home", "", Some(Coordinates::new(1.0, 1.0)))
            .unwrap();

        assert!(!store.remove("no-such-id"));
        assert_eq!(store.places(), &[home]);
    }

    #[tokio::test]
    async fn newest_first_with_unique_ids() {
        let mut store = PlacesStore::open(memory(), DEFAULT_KEY).await;

        for i in 0..200 {
            store
                .add(&format!("p{}", i), "", Some(Coordinates::new(0.0, i as f64 / 10.0)))
                .unwrap();
        }

        let ids: HashSet<&str> = store.places().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), 200);

        assert_eq!(store.places()[0].name, "p199");
        assert_eq!(store.places()[199].name, "p0");
        assert!(store
            .places()
            .windows(2)
            .all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn reopen_yields_same_collection() {
        let storage = memory();
        let mut store = PlacesStore::open(storage.clone(), DEFAULT_KEY).await;
        store
            .add("Home", "", Some(Coordinates::new(13.75, 100.50)))
            .unwrap();
        store
            .add("Cafe", "Good coffee", Some(Coordinates::new(13.76, 100.51)))
            .unwrap();
        let expected = store.places().to_vec();
        store.close().await;

        let reopened = PlacesStore::open(storage, DEFAULT_KEY).await;
        assert_eq!(reopened.places(), expected.as_slice());
        assert!(reopened.load_error().is_none());
    }

    #[tokio::test]
    async fn non_finite_coordinate_never_reaches_the_snapshot() {
        let storage = memory();
        let mut store = PlacesStore::open(storage.clone(), DEFAULT_KEY).await;
        let home = store
            .add("Home", "", Some(Coordinates::new(13.75, 100.50)))
            .unwrap();

        let err = store
            .add("Nowhere", "", Some(Coordinates::new(f64::NAN, 100.50)))
            .unwrap_err();
        assert_eq!(err.code, INVALID_INPUT);
        assert_eq!(store.places(), &[home.clone()]);
        store.close().await;

        let reopened = PlacesStore::open(storage, DEFAULT_KEY).await;
        assert_eq!(reopened.places(), &[home]);
        assert!(reopened.load_error().is_none());
    }

    #[tokio::test]
    async fn empty_persisted_value_loads_empty() {
        let storage = Arc::new(MemoryStore::with_value(DEFAULT_KEY, ""));
        let store = PlacesStore::open(storage, DEFAULT_KEY).await;

        assert!(store.is_empty());
        assert!(store.load_error().is_none());
    }

    #[tokio::test]
    async fn malformed_persisted_value_loads_empty_and_records_condition() {
        let storage = Arc::new(MemoryStore::with_value(DEFAULT_KEY, "[{\"id\":"));

        let err = PlacesStore::load(storage.as_ref(), DEFAULT_KEY)
            .await
            .unwrap_err();
        assert_eq!(err.code, CORRUPT_STATE);

        let store = PlacesStore::open(storage, DEFAULT_KEY).await;
        assert!(store.is_empty());
        assert_eq!(store.load_error().map(|e| e.code), Some(CORRUPT_STATE));
    }

    #[tokio::test]
    async fn write_backs_apply_in_mutation_order() {
        let storage = Arc::new(SlowRecorder::default());
        let mut store = PlacesStore::open(storage.clone(), DEFAULT_KEY).await;

        let a = store.add("A", "", Some(Coordinates::new(0.0, 0.0))).unwrap();
        store.add("B", "", Some(Coordinates::new(1.0, 1.0))).unwrap();
        store.remove(&a.id);
        store.add("C", "", Some(Coordinates::new(2.0, 2.0))).unwrap();
        store.flush().await;

        let sizes: Vec<usize> = storage
            .writes
            .lock()
            .unwrap()
            .iter()
            .map(|raw| decode(Some(raw)).unwrap().len())
            .collect();
        assert_eq!(sizes, [1, 2, 1, 2]);

        let last = storage.writes.lock().unwrap().last().cloned().unwrap();
        assert_eq!(decode(Some(&last)).unwrap(), store.places());
        assert_eq!(store.write_back_stats().completed(), 4);
    }

    #[tokio::test]
    async fn add_then_remove_settles_to_in_memory_count() {
        let storage = memory();
        let mut store = PlacesStore::open(storage.clone(), DEFAULT_KEY).await;

        store.add("Keep", "", Some(Coordinates::new(0.0, 0.0))).unwrap();
        let gone = store.add("Gone", "", Some(Coordinates::new(0.0, 0.0))).unwrap();
        store.remove(&gone.id);
        store.flush().await;

        assert_eq!(persisted(&storage).await.len(), store.len());
    }

    #[tokio::test]
    async fn broken_storage_never_reaches_the_caller() {
        let mut store = PlacesStore::open(Arc::new(Broken), DEFAULT_KEY).await;
        assert_eq!(
            store.load_error().map(|e| e.code),
            Some(PERSISTENCE_FAILURE)
        );

        let home = store
            .add("Home", "", Some(Coordinates::new(1.0, 1.0)))
            .unwrap();
        store.flush().await;

        assert_eq!(store.places(), &[home]);
        assert_eq!(store.write_back_stats().failed(), 1);
        assert_eq!(store.write_back_stats().completed(), 0);
    }

    #[test]
    fn markers_follow_collection_order() {
        tokio_test::block_on(async {
            let mut store = PlacesStore::open(memory(), DEFAULT_KEY).await;
            store
                .add("Home", "", Some(Coordinates::new(1.0, 1.0)))
                .unwrap();
            store
                .add("Cafe", "Good coffee", Some(Coordinates::new(2.0, 2.0)))
                .unwrap();

            let titles: Vec<String> = store.markers().into_iter().map(|m| m.title).collect();
            assert_eq!(titles, ["Cafe", "Home"]);
        });
    }
}

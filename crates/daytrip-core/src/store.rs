//! Process-scoped itinerary registry.
//!
//! Insert-only and versioned: every generation or recalculation writes a new
//! entry under a fresh identifier, and nothing is ever updated in place or
//! deleted. Point reads return clones so no lock outlives a call. Growth is
//! unbounded for the process lifetime; the registry is explicitly not
//! durable.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::plan::{Itinerary, SearchParams};

/// A stored itinerary version plus the search parameters that produced it,
/// kept so recalculation can replay them with deltas.
#[derive(Debug, Clone)]
pub struct StoredItinerary {
    pub itinerary: Itinerary,
    pub params: SearchParams,
}

/// Concurrent insert-only registry of itinerary versions.
///
/// Cheap to clone; clones share the underlying map. Passed explicitly to
/// whatever holds request state -- there is no global singleton.
#[derive(Debug, Clone, Default)]
pub struct ItineraryStore {
    entries: Arc<DashMap<Uuid, StoredItinerary>>,
}

impl ItineraryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new itinerary version under its own id.
    pub fn insert(&self, itinerary: Itinerary, params: SearchParams) -> Uuid {
        let id = itinerary.id;
        self.entries.insert(id, StoredItinerary { itinerary, params });
        id
    }

    /// Fetch a stored itinerary by id.
    pub fn get(&self, id: Uuid) -> Option<Itinerary> {
        self.entries.get(&id).map(|entry| entry.itinerary.clone())
    }

    /// Fetch the search parameters an itinerary was generated from.
    pub fn params(&self, id: Uuid) -> Option<SearchParams> {
        self.entries.get(&id).map(|entry| entry.params.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_itinerary() -> Itinerary {
        Itinerary {
            id: Uuid::new_v4(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            dates: vec!["2025-06-01".to_string()],
            budget: "$1-$50".to_string(),
            preferences: String::new(),
            excluded_events: Vec::new(),
            summary: "Your Austin adventure".to_string(),
            curated: false,
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn sample_params() -> SearchParams {
        SearchParams {
            city: "Austin".to_string(),
            state: "TX".to_string(),
            dates: vec!["2025-06-01".to_string()],
            budget: "$1-$50".to_string(),
            preferences: String::new(),
            excluded_events: Vec::new(),
        }
    }

    #[test]
    fn insert_then_get_roundtrips() {
        let store = ItineraryStore::new();
        let itinerary = sample_itinerary();
        let id = store.insert(itinerary.clone(), sample_params());

        let fetched = store.get(id).expect("should be stored");
        assert_eq!(fetched, itinerary);
        assert_eq!(store.params(id).expect("params stored"), sample_params());
    }

    #[test]
    fn unknown_id_is_none() {
        let store = ItineraryStore::new();
        assert!(store.get(Uuid::new_v4()).is_none());
        assert!(store.params(Uuid::new_v4()).is_none());
    }

    #[test]
    fn clones_share_entries() {
        let store = ItineraryStore::new();
        let handle = store.clone();
        let id = store.insert(sample_itinerary(), sample_params());
        assert!(handle.get(id).is_some());
        assert_eq!(handle.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_inserts_do_not_lose_entries() {
        let store = ItineraryStore::new();
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.insert(sample_itinerary(), sample_params())
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.expect("task should finish"));
        }
        assert_eq!(store.len(), 16);
        for id in ids {
            assert!(store.get(id).is_some());
        }
    }
}

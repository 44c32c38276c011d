use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::{DetailedMovie, MovieId};

/// Per-session cache of full movie records keyed by movie id
///
/// Entries never expire and survive filter changes; only `clear` empties it.
#[derive(Debug, Clone, Default)]
pub struct DetailCache {
    entries: Arc<RwLock<HashMap<MovieId, DetailedMovie>>>,
}

impl DetailCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieves a cached record by movie id
    pub async fn get_from_cache(&self, id: &MovieId) -> Option<DetailedMovie> {
        self.entries.read().await.get(id).cloned()
    }

    /// Stores a record, replacing any previous one for the same id
    pub async fn set_in_cache(&self, id: MovieId, movie: DetailedMovie) {
        self.entries.write().await.insert(id, movie);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

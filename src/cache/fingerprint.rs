use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::models::{FilterSet, GenreId, PipelineResult};

/// Canonical, order-independent key for a filter set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

/// Serialized form of a filter set with every multi-valued field sorted
#[derive(Serialize)]
struct CanonicalFilters {
    genres: Vec<GenreId>,
    decades: Vec<String>,
    countries: Vec<String>,
    moods: Vec<&'static str>,
    actor: Option<String>,
    director: Option<String>,
    max_runtime: u32,
}

impl Fingerprint {
    /// Derives the fingerprint of `filters`
    ///
    /// Selection order does not matter and names are compared case-insensitively, matching
    /// how the post-filter treats them.
    pub fn of(filters: &FilterSet) -> AppResult<Self> {
        let mut genres = filters.genres.clone();
        genres.sort_unstable();
        genres.dedup();

        let mut decades: Vec<String> = filters.decades.iter().map(|d| d.to_string()).collect();
        decades.sort();
        decades.dedup();

        let mut countries: Vec<String> = filters
            .countries
            .iter()
            .map(|c| c.trim().to_uppercase())
            .collect();
        countries.sort();
        countries.dedup();

        let mut moods: Vec<&'static str> = filters.moods.iter().map(|m| m.id()).collect();
        moods.sort_unstable();
        moods.dedup();

        let canonical = CanonicalFilters {
            genres,
            decades,
            countries,
            moods,
            actor: filters.actor_name.as_deref().map(normalize_name),
            director: filters.director_name.as_deref().map(normalize_name),
            max_runtime: filters.max_runtime_minutes,
        };

        let json = serde_json::to_string(&canonical)
            .map_err(|e| AppError::Internal(format!("Fingerprint serialization error: {}", e)))?;

        Ok(Self(json))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "filters:{}", self.0)
    }
}

#[derive(Debug, Default)]
struct Entries {
    /// Bumped on every `clear`, so computations started before it are not stored
    generation: u64,
    results: HashMap<Fingerprint, Arc<PipelineResult>>,
}

/// Memoizes full pipeline output per filter-set fingerprint
///
/// Cleared wholesale whenever any filter changes.
#[derive(Debug, Clone, Default)]
pub struct FingerprintCache {
    entries: Arc<RwLock<Entries>>,
}

impl FingerprintCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &Fingerprint) -> Option<Arc<PipelineResult>> {
        self.entries.read().await.results.get(key).cloned()
    }

    /// Stores a pipeline result and returns the shared handle to it
    pub async fn set(&self, key: Fingerprint, result: PipelineResult) -> Arc<PipelineResult> {
        let result = Arc::new(result);
        self.entries
            .write()
            .await
            .results
            .insert(key, result.clone());
        result
    }

    /// Returns the cached result for `filters`, running `compute` on a miss
    ///
    /// The lock is not held while computing. A result whose computation straddled a `clear`
    /// is returned to the caller but not stored.
    pub async fn get_or_compute<F, Fut>(
        &self,
        filters: &FilterSet,
        compute: F,
    ) -> AppResult<Arc<PipelineResult>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<PipelineResult>>,
    {
        let key = Fingerprint::of(filters)?;

        let generation = {
            let entries = self.entries.read().await;
            if let Some(hit) = entries.results.get(&key) {
                tracing::debug!(key = %key, "Pipeline cache hit");
                return Ok(hit.clone());
            }
            entries.generation
        };

        tracing::debug!(key = %key, "Pipeline cache miss");
        let result = Arc::new(compute().await?);

        let mut entries = self.entries.write().await;
        if entries.generation == generation {
            entries.results.insert(key, result.clone());
        } else {
            tracing::debug!(key = %key, "Filters changed during run, result not cached");
        }

        Ok(result)
    }

    /// Drops every cached result
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.generation += 1;
        entries.results.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.results.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.results.is_empty()
    }
}

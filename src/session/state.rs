use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::Instrument;

use crate::{
    error::{AppError, AppResult},
    models::{
        DecadeRange, DetailedMovie, FilterSet, GenreId, Mood, Page, PipelineResult, SortOption,
    },
    services::{planner, post_filter, RecommendationPipeline},
    session::run_token::{RunToken, RunTokens},
};

/// Shared state behind the recommendation screens
///
/// Holds the filters being edited, the latest applied result and its display settings.
/// Cloning shares the same state.
#[derive(Clone)]
pub struct RecommendationSession {
    pipeline: Arc<RecommendationPipeline>,
    tokens: Arc<RunTokens>,
    items_per_page: usize,
    pub inner: Arc<RwLock<SessionInner>>,
}

/// Inner state that can be modified
#[derive(Debug, Default)]
pub struct SessionInner {
    pub filters: FilterSet,
    pub recommendations: Option<Arc<PipelineResult>>,
    pub error: Option<String>,
    pub sort: SortOption,
    pub page: usize,
}

impl RecommendationSession {
    pub fn new(pipeline: RecommendationPipeline, items_per_page: usize) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            tokens: Arc::new(RunTokens::new()),
            items_per_page: items_per_page.max(1),
            inner: Arc::new(RwLock::new(SessionInner {
                page: 1,
                ..SessionInner::default()
            })),
        }
    }

    pub fn pipeline(&self) -> &RecommendationPipeline {
        &self.pipeline
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub async fn filters(&self) -> FilterSet {
        self.inner.read().await.filters.clone()
    }

    pub async fn set_filters(&self, filters: FilterSet) {
        self.update_filters(|_| filters).await;
    }

    pub async fn set_genres(&self, genres: Vec<GenreId>) {
        self.update_filters(|f| f.with_genres(genres)).await;
    }

    pub async fn set_decades(&self, decades: Vec<DecadeRange>) {
        self.update_filters(|f| f.with_decades(decades)).await;
    }

    pub async fn set_countries(&self, countries: Vec<String>) {
        self.update_filters(|f| f.with_countries(countries)).await;
    }

    pub async fn set_moods(&self, moods: Vec<Mood>) {
        self.update_filters(|f| f.with_moods(moods)).await;
    }

    /// `None` or a blank name clears the actor filter
    pub async fn set_actor(&self, name: Option<String>) {
        self.update_filters(|f| f.with_actor(name.unwrap_or_default())).await;
    }

    /// `None` or a blank name clears the director filter
    pub async fn set_director(&self, name: Option<String>) {
        self.update_filters(|f| f.with_director(name.unwrap_or_default())).await;
    }

    pub async fn set_max_runtime(&self, minutes: u32) {
        self.update_filters(|f| f.with_max_runtime(minutes)).await;
    }

    /// Every filter change drops all memoized pipeline results
    async fn update_filters<F>(&self, change: F)
    where
        F: FnOnce(FilterSet) -> FilterSet,
    {
        {
            let mut inner = self.inner.write().await;
            let current = std::mem::take(&mut inner.filters);
            inner.filters = change(current);
            inner.page = 1;
        }
        self.pipeline.context().fingerprint_cache.clear().await;
    }

    /// Runs the pipeline for the current filters and publishes the outcome
    ///
    /// A filter set with nothing selected only sets the error message. Otherwise the run gets
    /// a fresh token; if another search starts before this one finishes, this run's outcome
    /// is returned to the caller but never written to the session. The loading flag is
    /// cleared when the run ends, even if the caller drops this future before then.
    pub async fn search(&self) -> AppResult<Arc<PipelineResult>> {
        let filters = {
            let mut inner = self.inner.write().await;
            if let Err(e) = planner::plan(&inner.filters) {
                inner.error = Some(e.user_message().to_string());
                return Err(e);
            }
            inner.filters.clone()
        };

        let (token, _loading) = self.tokens.begin();
        self.inner.write().await.error = None;

        let span = tracing::info_span!(
            "pipeline_run",
            run_id = %token.run_id,
            token = token.sequence
        );
        let outcome = self.pipeline.run(&filters).instrument(span).await;

        self.finish_run(&token, &outcome).await;
        outcome
    }

    async fn finish_run(&self, token: &RunToken, outcome: &AppResult<Arc<PipelineResult>>) {
        if !self.tokens.is_latest(token) {
            tracing::info!(
                run_id = %token.run_id,
                token = token.sequence,
                "Discarding outcome of superseded run"
            );
            return;
        }

        let mut inner = self.inner.write().await;
        match outcome {
            Ok(result) => {
                tracing::info!(
                    run_id = %token.run_id,
                    results = result.len(),
                    "Recommendations updated"
                );
                inner.recommendations = Some(result.clone());
                inner.error = None;
                inner.page = 1;
            }
            Err(e) => {
                match e {
                    AppError::NoResults | AppError::InvalidFilter(_) => {
                        tracing::info!(run_id = %token.run_id, error = %e, "Search found nothing")
                    }
                    _ => tracing::error!(run_id = %token.run_id, error = %e, "Search failed"),
                }
                inner.recommendations = None;
                inner.error = Some(e.user_message().to_string());
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.tokens.is_loading()
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.read().await.error.clone()
    }

    pub async fn recommendations(&self) -> Option<Arc<PipelineResult>> {
        self.inner.read().await.recommendations.clone()
    }

    /// Re-sorting keeps the stored result untouched and goes back to the first page
    pub async fn set_sort(&self, sort: SortOption) {
        let mut inner = self.inner.write().await;
        inner.sort = sort;
        inner.page = 1;
    }

    pub async fn set_page(&self, page: usize) {
        self.inner.write().await.page = page.max(1);
    }

    /// The latest result in the selected display order
    pub async fn sorted_recommendations(&self) -> Vec<DetailedMovie> {
        let inner = self.inner.read().await;
        match &inner.recommendations {
            Some(result) => post_filter::sorted(result, inner.sort),
            None => Vec::new(),
        }
    }

    /// The current page of the sorted result
    pub async fn paginated_recommendations(&self) -> Page<DetailedMovie> {
        let sorted = self.sorted_recommendations().await;
        let page = self.inner.read().await.page;
        Page::slice(&sorted, page, self.items_per_page)
    }

    /// Returns every filter and derived value to its initial default
    ///
    /// Runs still in flight can no longer publish. The detail cache is kept.
    pub async fn reset_state(&self) {
        self.tokens.supersede_all();
        {
            let mut inner = self.inner.write().await;
            *inner = SessionInner {
                page: 1,
                ..SessionInner::default()
            };
        }
        self.pipeline.context().fingerprint_cache.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NO_MATCHES_MESSAGE, SELECT_SOMETHING_MESSAGE, TRY_AGAIN_MESSAGE};
    use crate::models::{CandidateMovie, Credits, DiscoverPage, MovieId};
    use crate::services::enrichment::EnrichmentPolicy;
    use crate::services::gateway::GatewaySettings;
    use crate::services::providers::MockProvider;
    use crate::services::PipelineContext;

    fn candidate(id: MovieId) -> CandidateMovie {
        CandidateMovie {
            id,
            title: format!("Movie {}", id),
            poster_path: None,
            release_date: None,
            vote_average: 5.0 + id as f64 / 10.0,
            vote_count: 400,
        }
    }

    fn details(id: MovieId) -> DetailedMovie {
        DetailedMovie {
            candidate: candidate(id),
            genres: vec![],
            runtime: Some(95),
            overview: None,
            origin_country: vec![],
            credits: Credits::default(),
        }
    }

    fn session_with(provider: MockProvider, items_per_page: usize) -> RecommendationSession {
        let ctx = PipelineContext::new(
            Arc::new(provider),
            GatewaySettings::default(),
            EnrichmentPolicy::Strict,
        );
        RecommendationSession::new(RecommendationPipeline::new(ctx), items_per_page)
    }

    fn provider_with(ids: Vec<MovieId>) -> MockProvider {
        let mut provider = MockProvider::new();
        provider.expect_discover_movies().returning(move |_| {
            Ok(DiscoverPage {
                results: ids.iter().copied().map(candidate).collect(),
                total_pages: 1,
            })
        });
        provider
            .expect_get_movie_details()
            .returning(|id| Ok(details(id)));
        provider
    }

    #[tokio::test]
    async fn test_search_without_selection_sets_prompt() {
        let mut provider = MockProvider::new();
        provider.expect_discover_movies().times(0);
        let session = session_with(provider, 12);

        let result = session.search().await;

        assert!(matches!(result, Err(AppError::InvalidFilter(_))));
        assert!(!session.is_loading());
        assert_eq!(
            session.error().await.as_deref(),
            Some(SELECT_SOMETHING_MESSAGE)
        );
    }

    #[tokio::test]
    async fn test_search_publishes_result_and_clears_loading() {
        let session = session_with(provider_with(vec![1, 2, 3]), 12);
        session.set_genres(vec![28]).await;

        session.search().await.unwrap();

        assert!(!session.is_loading());
        assert!(session.error().await.is_none());
        let ids: Vec<MovieId> = session
            .sorted_recommendations()
            .await
            .iter()
            .map(|m| m.id())
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_no_results_message() {
        let session = session_with(provider_with(vec![]), 12);
        session.set_countries(vec!["aq".to_string()]).await;

        let result = session.search().await;

        assert!(matches!(result, Err(AppError::NoResults)));
        assert!(!session.is_loading());
        assert_eq!(session.error().await.as_deref(), Some(NO_MATCHES_MESSAGE));
    }

    #[tokio::test]
    async fn test_provider_failure_message() {
        let mut provider = MockProvider::new();
        provider
            .expect_discover_movies()
            .returning(|_| Err(AppError::provider(503, "unavailable")));
        let session = session_with(provider, 12);
        session.set_genres(vec![28]).await;

        assert!(session.search().await.is_err());

        assert!(!session.is_loading());
        assert_eq!(session.error().await.as_deref(), Some(TRY_AGAIN_MESSAGE));
    }

    #[tokio::test]
    async fn test_superseded_run_is_discarded() {
        let session = session_with(MockProvider::new(), 12);
        let (stale, stale_loading) = session.tokens.begin();
        let (latest, latest_loading) = session.tokens.begin();

        let stale_result: AppResult<Arc<PipelineResult>> = Ok(Arc::new(vec![details(1)]));
        session.finish_run(&stale, &stale_result).await;
        drop(stale_loading);

        assert!(session.recommendations().await.is_none());
        assert!(session.is_loading());

        let latest_result: AppResult<Arc<PipelineResult>> = Ok(Arc::new(vec![details(2)]));
        session.finish_run(&latest, &latest_result).await;
        drop(latest_loading);

        assert!(!session.is_loading());
        assert_eq!(session.recommendations().await.unwrap()[0].id(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_search_clears_loading() {
        let mut provider = MockProvider::new();
        provider
            .expect_discover_movies()
            .returning(|_| Err(AppError::provider(429, "Too many requests")));
        let ctx = PipelineContext::new(
            Arc::new(provider),
            GatewaySettings {
                max_retries: u32::MAX,
                ..GatewaySettings::default()
            },
            EnrichmentPolicy::Strict,
        );
        let session = RecommendationSession::new(RecommendationPipeline::new(ctx), 12);
        session.set_genres(vec![28]).await;

        let outcome =
            tokio::time::timeout(std::time::Duration::from_millis(500), session.search()).await;

        assert!(outcome.is_err());
        assert!(!session.is_loading());
        assert!(session.recommendations().await.is_none());
    }

    #[tokio::test]
    async fn test_filter_change_clears_fingerprint_cache() {
        let session = session_with(provider_with(vec![1]), 12);
        session.set_genres(vec![28]).await;
        session.search().await.unwrap();
        let cache = &session.pipeline().context().fingerprint_cache;
        assert_eq!(cache.len().await, 1);

        session.set_max_runtime(120).await;

        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_sorted_view_and_pagination() {
        let ids: Vec<MovieId> = (1..=30).collect();
        let session = session_with(provider_with(ids), 12);
        session.set_genres(vec![18]).await;
        session.search().await.unwrap();

        session.set_sort(SortOption::RatingAsc).await;
        session.set_page(2).await;
        let page = session.paginated_recommendations().await;

        // The merger keeps the 20 best rated candidates, ids 11..=30
        assert_eq!(page.total_items, 20);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.page, 2);
        assert_eq!(page.items.len(), 8);
        assert_eq!(page.items[0].id(), 23);

        let stored = session.recommendations().await.unwrap();
        assert_eq!(stored[0].id(), 30);
    }

    #[tokio::test]
    async fn test_reset_state_restores_defaults() {
        let session = session_with(provider_with(vec![1]), 12);
        session.set_genres(vec![28]).await;
        session.set_director(Some("Agnès Varda".to_string())).await;
        session.set_filters(FilterSet::default().with_genres([28])).await;
        session.search().await.unwrap();
        session.set_sort(SortOption::TitleAsc).await;

        session.reset_state().await;

        assert_eq!(session.filters().await, FilterSet::default());
        assert!(session.recommendations().await.is_none());
        assert!(session.error().await.is_none());
        assert!(!session.is_loading());
        assert_eq!(session.inner.read().await.sort, SortOption::RatingDesc);
        assert!(session.pipeline().context().fingerprint_cache.is_empty().await);
    }
}

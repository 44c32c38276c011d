use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{DiscoverPage, FilterSet, Genre, Person, PipelineResult, ProviderQuery},
    services::{context::PipelineContext, enrichment, merger, planner, post_filter},
};

/// Person searches shorter than this never reach the provider
pub const MIN_PERSON_QUERY_CHARS: usize = 2;

/// Generates movie recommendations for a filter set
///
/// A run plans the discovery queries, fans them out in parallel, merges and de-duplicates
/// the pages, enriches the top candidates with full details, then post-filters and ranks.
/// Whole runs are memoized by filter fingerprint, and every provider call goes through the
/// context's rate-limited gateway.
#[derive(Debug, Clone)]
pub struct RecommendationPipeline {
    ctx: PipelineContext,
}

impl RecommendationPipeline {
    pub fn new(ctx: PipelineContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    /// Runs the pipeline, or returns the memoized result for an unchanged filter set
    ///
    /// A filter set with no active dimension is rejected before any provider call.
    pub async fn run(&self, filters: &FilterSet) -> AppResult<Arc<PipelineResult>> {
        let queries = planner::plan(filters)?;

        self.ctx
            .fingerprint_cache
            .get_or_compute(filters, || self.execute(queries, filters))
            .await
    }

    async fn execute(
        &self,
        queries: Vec<ProviderQuery>,
        filters: &FilterSet,
    ) -> AppResult<PipelineResult> {
        let pages = self.discover(queries).await?;
        let candidates = merger::merge(pages)?;
        let detailed = enrichment::enrich(&self.ctx, candidates).await?;
        post_filter::filter_and_rank(detailed, filters)
    }

    /// Issues every planned query at once and waits for all of them
    ///
    /// One failed query fails the batch.
    async fn discover(&self, queries: Vec<ProviderQuery>) -> AppResult<Vec<DiscoverPage>> {
        tracing::info!(queries = queries.len(), "Fanning out discovery queries");

        let mut tasks = Vec::with_capacity(queries.len());
        for query in queries {
            let ctx = self.ctx.clone();
            let task = tokio::spawn(async move {
                ctx.gateway
                    .execute("discover_movies", || ctx.provider.discover_movies(&query))
                    .await
            });
            tasks.push(task);
        }

        let mut pages = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(Ok(page)) => pages.push(page),
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Discovery query failed");
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Task join error");
                    return Err(AppError::Internal(e.to_string()));
                }
            }
        }

        Ok(pages)
    }

    /// Looks up people by name for the cast & crew step
    pub async fn search_people(&self, query: &str) -> AppResult<Vec<Person>> {
        let query = query.trim();
        if query.chars().count() < MIN_PERSON_QUERY_CHARS {
            return Ok(Vec::new());
        }

        self.ctx
            .gateway
            .execute("search_person", || self.ctx.provider.search_person(query))
            .await
    }

    /// Lists every genre the provider knows
    pub async fn genres(&self) -> AppResult<Vec<Genre>> {
        self.ctx
            .gateway
            .execute("genre_list", || self.ctx.provider.get_genre_list())
            .await
    }
}

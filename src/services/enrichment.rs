use serde::Deserialize;

use crate::{
    cached,
    error::{AppError, AppResult},
    models::{CandidateMovie, DetailedMovie, MovieId},
    services::context::PipelineContext,
};

/// How the enrichment stage reacts to a failed detail fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentPolicy {
    /// Any failed fetch fails the whole run
    #[default]
    Strict,
    /// Failed items are dropped; the run fails only if every fetch failed
    SkipFailed,
}

/// Fetches full records for every candidate in parallel
///
/// The detail cache is consulted first, so a cached movie costs no provider call. Output
/// keeps candidate order.
pub async fn enrich(
    ctx: &PipelineContext,
    candidates: Vec<CandidateMovie>,
) -> AppResult<Vec<DetailedMovie>> {
    tracing::info!(candidates = candidates.len(), "Fetching movie details");

    let mut tasks = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let ctx = ctx.clone();
        let movie_id = candidate.id;
        let task = tokio::spawn(async move { fetch_details(&ctx, movie_id).await });
        tasks.push((movie_id, task));
    }

    let mut detailed = Vec::with_capacity(tasks.len());
    let mut first_failure: Option<AppError> = None;
    let mut failed = 0usize;

    for (movie_id, task) in tasks {
        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => Err(AppError::Internal(e.to_string())),
        };

        match outcome {
            Ok(movie) => detailed.push(movie),
            Err(e) => {
                let error = AppError::Enrichment {
                    movie_id,
                    source: Box::new(e),
                };

                match ctx.enrichment_policy {
                    EnrichmentPolicy::Strict => {
                        tracing::error!(movie_id = movie_id, error = %error, "Detail fetch failed");
                        return Err(error);
                    }
                    EnrichmentPolicy::SkipFailed => {
                        tracing::warn!(
                            movie_id = movie_id,
                            error = %error,
                            "Skipping movie without details"
                        );
                        failed += 1;
                        first_failure.get_or_insert(error);
                    }
                }
            }
        }
    }

    if detailed.is_empty() {
        if let Some(error) = first_failure {
            return Err(error);
        }
    }

    if failed > 0 {
        tracing::warn!(
            success_count = detailed.len(),
            error_count = failed,
            "Partial detail fetch failure"
        );
    }

    Ok(detailed)
}

/// Fetches one record through the detail cache and the gateway
async fn fetch_details(ctx: &PipelineContext, movie_id: MovieId) -> AppResult<DetailedMovie> {
    cached!(ctx.detail_cache, movie_id, async {
        ctx.gateway
            .execute("movie_details", || ctx.provider.get_movie_details(movie_id))
            .await
    })
}

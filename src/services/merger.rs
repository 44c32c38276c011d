use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::{CandidateMovie, DiscoverPage},
};

/// Candidates handed to the enrichment stage
pub const ENRICHMENT_CAP: usize = 20;

/// Unions discovery pages into one ranked candidate list
///
/// Duplicates are resolved by movie id in favour of the first record seen. The unique set
/// is sorted by rating, highest first, and cut to the top `ENRICHMENT_CAP` because every
/// surviving candidate costs one detail fetch.
pub fn merge(pages: Vec<DiscoverPage>) -> AppResult<Vec<CandidateMovie>> {
    let mut seen = HashSet::new();
    let mut unique: Vec<CandidateMovie> = Vec::new();
    let mut total = 0usize;

    for movie in pages.into_iter().flat_map(|page| page.results) {
        total += 1;
        if seen.insert(movie.id) {
            unique.push(movie);
        }
    }

    if unique.is_empty() {
        tracing::info!("Discovery returned no candidates");
        return Err(AppError::NoResults);
    }

    let unique_count = unique.len();

    // Stable sort keeps first-seen order among equal ratings
    unique.sort_by(|a, b| b.vote_average.total_cmp(&a.vote_average));
    unique.truncate(ENRICHMENT_CAP);

    tracing::info!(
        fetched = total,
        unique = unique_count,
        kept = unique.len(),
        "Merged discovery pages"
    );

    Ok(unique)
}

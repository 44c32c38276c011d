use crate::{
    error::{AppError, AppResult},
    models::{DecadeRange, FilterSet, GenreId, ProviderQuery},
};

/// Expands a filter set into the discovery queries needed to answer it
///
/// The provider ANDs multiple genres, but a selection of several genres means "any of
/// these", so each selected genre gets its own query and the merger unions the pages.
/// Genres are crossed with decades; an empty dimension contributes a single unconstrained
/// slot rather than zero queries. Countries are joined into one value on every query.
/// Only the first results page is requested per combination.
pub fn plan(filters: &FilterSet) -> AppResult<Vec<ProviderQuery>> {
    if !filters.is_active() {
        return Err(AppError::InvalidFilter("At least one filter must be selected".to_string()));
    }

    let genres: Vec<Option<GenreId>> = if filters.genres.is_empty() {
        vec![None]
    } else {
        filters.genres.iter().copied().map(Some).collect()
    };

    let decades: Vec<Option<DecadeRange>> = if filters.decades.is_empty() {
        vec![None]
    } else {
        filters.decades.iter().copied().map(Some).collect()
    };

    let countries = if filters.countries.is_empty() {
        None
    } else {
        Some(filters.countries.join(","))
    };

    let mut queries = Vec::with_capacity(genres.len() * decades.len());
    for genre in &genres {
        for decade in &decades {
            if let Some(decade) = decade {
                // Reject decades that cannot be sent as a date bound before any call is made
                decade.release_window()?;
            }
            queries.push(ProviderQuery::first_page(*genre, *decade, countries.clone()));
        }
    }

    if queries.is_empty() {
        return Err(AppError::InvalidFilter("Filter set produced no provider queries".to_string()));
    }

    tracing::debug!(
        genres = filters.genres.len(),
        decades = filters.decades.len(),
        queries = queries.len(),
        "Planned discovery queries"
    );

    Ok(queries)
}

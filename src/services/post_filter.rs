use std::collections::HashSet;

use crate::{
    error::{AppError, AppResult},
    models::{DetailedMovie, FilterSet, Mood, PipelineResult, SortOption},
};

/// Maximum size of a pipeline result
pub const RESULT_CAP: usize = 100;

/// Applies the criteria discovery cannot express, then ranks and truncates
///
/// Stages run in order: runtime ceiling, mood, actor, director. Only active stages run, and
/// the first one that leaves nothing ends the run with `NoResults`.
pub fn filter_and_rank(
    movies: Vec<DetailedMovie>,
    filters: &FilterSet,
) -> AppResult<PipelineResult> {
    let mut movies = movies;

    if filters.has_runtime_limit() {
        let ceiling = filters.max_runtime_minutes;
        movies = apply_stage(movies, "runtime", |movie| within_runtime(movie, ceiling))?;
    }

    if !filters.moods.is_empty() {
        movies = apply_stage(movies, "mood", |movie| matches_any_mood(movie, &filters.moods))?;
    }

    if let Some(actor) = &filters.actor_name {
        movies = apply_stage(movies, "actor", |movie| movie.has_cast_member(actor))?;
    }

    if let Some(director) = &filters.director_name {
        movies = apply_stage(movies, "director", |movie| movie.has_director(director))?;
    }

    if movies.is_empty() {
        return Err(AppError::NoResults);
    }

    movies.sort_by(|a, b| SortOption::RatingDesc.compare(a, b));
    movies.truncate(RESULT_CAP);

    tracing::info!(kept = movies.len(), "Post-filter complete");

    Ok(movies)
}

fn apply_stage<P>(
    movies: Vec<DetailedMovie>,
    stage: &'static str,
    keep: P,
) -> AppResult<Vec<DetailedMovie>>
where
    P: Fn(&DetailedMovie) -> bool,
{
    let before = movies.len();
    let kept: Vec<DetailedMovie> = movies.into_iter().filter(|m| keep(m)).collect();

    tracing::debug!(
        stage = stage,
        before = before,
        after = kept.len(),
        "Post-filter stage applied"
    );

    if kept.is_empty() {
        tracing::info!(stage = stage, "Post-filter stage removed every movie");
        return Err(AppError::NoResults);
    }

    Ok(kept)
}

/// Unknown runtimes never pass a ceiling
fn within_runtime(movie: &DetailedMovie, ceiling: u32) -> bool {
    matches!(movie.runtime, Some(runtime) if runtime > 0 && runtime <= ceiling)
}

fn matches_any_mood(movie: &DetailedMovie, moods: &[Mood]) -> bool {
    let genres: HashSet<String> = movie.genre_names_folded().into_iter().collect();
    moods
        .iter()
        .flat_map(|mood| mood.genre_keywords())
        .any(|keyword| genres.contains(*keyword))
}

/// Non-destructive re-ordering of a stored result for display
pub fn sorted(movies: &[DetailedMovie], option: SortOption) -> Vec<DetailedMovie> {
    let mut sorted = movies.to_vec();
    sorted.sort_by(|a, b| option.compare(a, b));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CandidateMovie, CastMember, Credits, CrewMember, Genre};

    fn movie(id: u64, vote_average: f64, runtime: Option<u32>) -> DetailedMovie {
        DetailedMovie {
            candidate: CandidateMovie {
                id,
                title: format!("Movie {}", id),
                poster_path: None,
                release_date: None,
                vote_average,
                vote_count: 150,
            },
            genres: vec![],
            runtime,
            overview: None,
            origin_country: vec![],
            credits: Credits::default(),
        }
    }

    fn with_genres(mut movie: DetailedMovie, names: &[&str]) -> DetailedMovie {
        movie.genres = names
            .iter()
            .enumerate()
            .map(|(i, name)| Genre {
                id: i as u32,
                name: name.to_string(),
            })
            .collect();
        movie
    }

    fn with_crew(mut movie: DetailedMovie, name: &str, job: &str) -> DetailedMovie {
        movie.credits.crew.push(CrewMember {
            id: None,
            name: name.to_string(),
            job: job.to_string(),
            department: None,
            profile_path: None,
        });
        movie
    }

    fn with_cast(mut movie: DetailedMovie, name: &str) -> DetailedMovie {
        movie.credits.cast.push(CastMember {
            id: None,
            name: name.to_string(),
            character: None,
            profile_path: None,
        });
        movie
    }

    fn ids(movies: &[DetailedMovie]) -> Vec<u64> {
        movies.iter().map(|m| m.id()).collect()
    }

    #[test]
    fn test_runtime_boundary() {
        let filters = FilterSet::default().with_max_runtime(90);
        let movies = vec![
            movie(1, 7.0, Some(90)),
            movie(2, 8.0, Some(91)),
            movie(3, 6.0, Some(95)),
            movie(4, 9.0, None),
        ];

        let result = filter_and_rank(movies, &filters).unwrap();
        assert_eq!(ids(&result), vec![1]);
    }

    #[test]
    fn test_no_runtime_limit_keeps_unknown_runtime() {
        let filters = FilterSet::default().with_genres([28]);
        let movies = vec![movie(1, 7.0, None), movie(2, 8.0, Some(300))];

        let result = filter_and_rank(movies, &filters).unwrap();
        assert_eq!(ids(&result), vec![2, 1]);
    }

    #[test]
    fn test_runtime_stage_emptying_list_is_no_results() {
        let filters = FilterSet::default().with_max_runtime(60);
        let movies = vec![movie(1, 7.0, Some(120)), movie(2, 7.0, None)];

        let result = filter_and_rank(movies, &filters);
        assert!(matches!(result, Err(AppError::NoResults)));
    }

    #[test]
    fn test_mood_matches_any_selected_mood() {
        let filters = FilterSet::default().with_moods([Mood::Light, Mood::Dark]);
        let movies = vec![
            with_genres(movie(1, 7.0, Some(100)), &["Animation", "Family"]),
            with_genres(movie(2, 8.0, Some(100)), &["Crime", "Drama"]),
            with_genres(movie(3, 9.0, Some(100)), &["Romance"]),
        ];

        let result = filter_and_rank(movies, &filters).unwrap();
        assert_eq!(ids(&result), vec![2, 1]);
    }

    #[test]
    fn test_mood_matches_multi_word_genre() {
        let filters = FilterSet::default().with_moods([Mood::Thoughtful]);
        let movies = vec![with_genres(movie(1, 7.0, Some(100)), &["Science Fiction"])];

        assert!(filter_and_rank(movies, &filters).is_ok());
    }

    #[test]
    fn test_director_exact_case_insensitive_match() {
        let filters = FilterSet::default().with_director("Jane Doe");
        let movies = vec![
            with_crew(movie(1, 7.0, Some(100)), "jane doe", "Director"),
            with_crew(movie(2, 8.0, Some(100)), "Jane Doe", "Producer"),
            with_crew(movie(3, 9.0, Some(100)), "Jane Doe-Smith", "Director"),
        ];

        let result = filter_and_rank(movies, &filters).unwrap();
        assert_eq!(ids(&result), vec![1]);
    }

    #[test]
    fn test_actor_exact_match() {
        let filters = FilterSet::default().with_actor("Tilda Swinton");
        let movies = vec![
            with_cast(movie(1, 7.0, Some(100)), "TILDA SWINTON"),
            with_cast(movie(2, 8.0, Some(100)), "Tilda"),
        ];

        let result = filter_and_rank(movies, &filters).unwrap();
        assert_eq!(ids(&result), vec![1]);
    }

    #[test]
    fn test_actor_then_director_both_required() {
        let filters = FilterSet::default()
            .with_actor("Actor A")
            .with_director("Director D");
        let both = with_crew(
            with_cast(movie(1, 7.0, Some(100)), "Actor A"),
            "Director D",
            "Director",
        );
        let actor_only = with_cast(movie(2, 9.0, Some(100)), "Actor A");

        let result = filter_and_rank(vec![both, actor_only], &filters).unwrap();
        assert_eq!(ids(&result), vec![1]);
    }

    #[test]
    fn test_sorted_and_capped() {
        let filters = FilterSet::default().with_genres([28]);
        let movies: Vec<DetailedMovie> = (0..150)
            .map(|i| movie(i, (i % 100) as f64 / 10.0, Some(100)))
            .collect();

        let result = filter_and_rank(movies, &filters).unwrap();

        assert_eq!(result.len(), RESULT_CAP);
        assert!(result
            .windows(2)
            .all(|w| w[0].vote_average() >= w[1].vote_average()));
    }

    #[test]
    fn test_sorted_is_non_destructive() {
        let stored = vec![movie(1, 8.0, None), movie(2, 6.0, None), movie(3, 7.0, None)];

        let ascending = sorted(&stored, SortOption::RatingAsc);

        assert_eq!(ids(&ascending), vec![2, 3, 1]);
        assert_eq!(ids(&stored), vec![1, 2, 3]);
    }

    #[test]
    fn test_sorted_by_date_unknown_oldest() {
        let mut old = movie(1, 7.0, None);
        old.candidate.release_date = Some("1960-05-01".to_string());
        let mut new = movie(2, 7.0, None);
        new.candidate.release_date = Some("2021-10-22".to_string());
        let undated = movie(3, 7.0, None);

        let stored = vec![old, new, undated];

        assert_eq!(ids(&sorted(&stored, SortOption::DateDesc)), vec![2, 1, 3]);
        assert_eq!(ids(&sorted(&stored, SortOption::DateAsc)), vec![3, 1, 2]);
    }

    #[test]
    fn test_sorted_by_title() {
        let mut a = movie(1, 7.0, None);
        a.candidate.title = "brazil".to_string();
        let mut b = movie(2, 7.0, None);
        b.candidate.title = "Alien".to_string();
        let mut c = movie(3, 7.0, None);
        c.candidate.title = "Cure".to_string();

        let stored = vec![a, b, c];

        assert_eq!(ids(&sorted(&stored, SortOption::TitleAsc)), vec![2, 1, 3]);
        assert_eq!(ids(&sorted(&stored, SortOption::TitleDesc)), vec![3, 1, 2]);
    }
}

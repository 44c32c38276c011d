use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

use super::DetailedMovie;
use crate::error::AppError;

/// Display order for the recommendation list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    #[default]
    RatingDesc,
    RatingAsc,
    DateDesc,
    DateAsc,
    TitleAsc,
    TitleDesc,
}

impl SortOption {
    pub const ALL: [SortOption; 6] = [
        SortOption::RatingDesc,
        SortOption::RatingAsc,
        SortOption::DateDesc,
        SortOption::DateAsc,
        SortOption::TitleAsc,
        SortOption::TitleDesc,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            SortOption::RatingDesc => "rating-desc",
            SortOption::RatingAsc => "rating-asc",
            SortOption::DateDesc => "date-desc",
            SortOption::DateAsc => "date-asc",
            SortOption::TitleAsc => "title-asc",
            SortOption::TitleDesc => "title-desc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOption::RatingDesc => "Rating (High to Low)",
            SortOption::RatingAsc => "Rating (Low to High)",
            SortOption::DateDesc => "Release Date (Newest)",
            SortOption::DateAsc => "Release Date (Oldest)",
            SortOption::TitleAsc => "Title (A-Z)",
            SortOption::TitleDesc => "Title (Z-A)",
        }
    }

    /// Ordering of two movies under this option
    ///
    /// Unknown release dates compare as older than any known date.
    pub fn compare(&self, a: &DetailedMovie, b: &DetailedMovie) -> Ordering {
        match self {
            SortOption::RatingDesc => b.vote_average().total_cmp(&a.vote_average()),
            SortOption::RatingAsc => a.vote_average().total_cmp(&b.vote_average()),
            SortOption::DateDesc => b.candidate.release_day().cmp(&a.candidate.release_day()),
            SortOption::DateAsc => a.candidate.release_day().cmp(&b.candidate.release_day()),
            SortOption::TitleAsc => compare_titles(a.title(), b.title()),
            SortOption::TitleDesc => compare_titles(b.title(), a.title()),
        }
    }
}

fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

impl Display for SortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for SortOption {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOption::ALL
            .into_iter()
            .find(|option| option.id() == s.trim())
            .ok_or_else(|| AppError::InvalidFilter(format!("Unknown sort option '{}'", s)))
    }
}

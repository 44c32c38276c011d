use serde::{Deserialize, Serialize};

use super::{CandidateMovie, DecadeRange, GenreId};

/// Minimum average rating every discovery query asks for
pub const MIN_VOTE_AVERAGE: f64 = 5.0;

/// Minimum vote count every discovery query asks for
pub const MIN_VOTE_COUNT: u32 = 100;

/// One discovery call against the metadata provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderQuery {
    /// Single genre constraint; `None` means any genre
    pub genre: Option<GenreId>,
    /// Release-date bound; `None` means unbounded
    pub decade: Option<DecadeRange>,
    /// Comma-joined origin countries, passed through unexpanded
    pub countries: Option<String>,
    pub vote_average_min: f64,
    pub vote_count_min: u32,
    pub page: u32,
}

impl ProviderQuery {
    /// First-page query carrying the quality floor
    pub fn first_page(
        genre: Option<GenreId>,
        decade: Option<DecadeRange>,
        countries: Option<String>,
    ) -> Self {
        Self {
            genre,
            decade,
            countries,
            vote_average_min: MIN_VOTE_AVERAGE,
            vote_count_min: MIN_VOTE_COUNT,
            page: 1,
        }
    }
}

/// One page of discovery results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoverPage {
    #[serde(default)]
    pub results: Vec<CandidateMovie>,
    #[serde(default)]
    pub total_pages: u32,
}

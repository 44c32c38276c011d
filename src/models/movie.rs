use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::GenreId;

/// Provider movie identifier
pub type MovieId = u64;

/// Genre as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// Lightweight search-result record, as returned by discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMovie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
}

impl CandidateMovie {
    /// Parsed release date; blank or malformed dates yield `None`
    pub fn release_day(&self) -> Option<NaiveDate> {
        self.release_date
            .as_deref()
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    pub job: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

/// Candidate enriched with genres, runtime and credits
///
/// Immutable once fetched; shared through the per-session detail cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedMovie {
    #[serde(flatten)]
    pub candidate: CandidateMovie,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub origin_country: Vec<String>,
    #[serde(default)]
    pub credits: Credits,
}

impl DetailedMovie {
    pub fn id(&self) -> MovieId {
        self.candidate.id
    }

    pub fn title(&self) -> &str {
        &self.candidate.title
    }

    pub fn vote_average(&self) -> f64 {
        self.candidate.vote_average
    }

    /// Genre names, lowercased for keyword matching
    pub fn genre_names_folded(&self) -> Vec<String> {
        self.genres.iter().map(|g| g.name.to_lowercase()).collect()
    }

    /// Case-insensitive exact match against the cast list
    pub fn has_cast_member(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.credits
            .cast
            .iter()
            .any(|member| member.name.to_lowercase() == wanted)
    }

    /// Case-insensitive exact match against crew entries whose job is "Director"
    pub fn has_director(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.credits
            .crew
            .iter()
            .any(|member| member.job == "Director" && member.name.to_lowercase() == wanted)
    }
}

/// Person search hit, used by the cast & crew picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    pub name: String,
}

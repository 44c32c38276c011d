use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Provider genre identifier (e.g. 28 = Action, 35 = Comedy)
pub type GenreId = u32;

/// ISO 3166-1 country code as sent to the provider
pub type CountryCode = String;

/// Runtime ceiling meaning "no limit"
pub const NO_RUNTIME_LIMIT: u32 = 240;

/// Inclusive range of release years covering one decade
///
/// Serialized as its start year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct DecadeRange {
    start_year: i32,
    end_year: i32,
}

impl DecadeRange {
    /// Decade starting at `start_year`; the end year is always `start_year + 9`
    pub fn starting(start_year: i32) -> AppResult<Self> {
        let end_year = start_year.checked_add(9).ok_or_else(|| {
            AppError::InvalidFilter(format!("Decade starting {} is out of range", start_year))
        })?;

        Ok(Self {
            start_year,
            end_year,
        })
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.end_year
    }

    /// First and last calendar day of the decade
    pub fn release_window(&self) -> AppResult<(NaiveDate, NaiveDate)> {
        let first = NaiveDate::from_ymd_opt(self.start_year, 1, 1);
        let last = NaiveDate::from_ymd_opt(self.end_year, 12, 31);

        match (first, last) {
            (Some(first), Some(last)) => Ok((first, last)),
            _ => Err(AppError::InvalidFilter(format!(
                "Decade {} cannot be expressed as a date range",
                self
            ))),
        }
    }

    /// Label shown in the decade picker (e.g. "1990s")
    pub fn label(&self) -> String {
        format!("{}s", self.start_year)
    }
}

impl TryFrom<i32> for DecadeRange {
    type Error = AppError;

    fn try_from(start_year: i32) -> Result<Self, Self::Error> {
        DecadeRange::starting(start_year)
    }
}

impl From<DecadeRange> for i32 {
    fn from(decade: DecadeRange) -> Self {
        decade.start_year
    }
}

impl Display for DecadeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start_year, self.end_year)
    }
}

/// Decades offered by the decade picker
pub fn decade_catalog() -> Vec<DecadeRange> {
    (1950..=2020)
        .step_by(10)
        .filter_map(|year| DecadeRange::starting(year).ok())
        .collect()
}

/// Viewing mood, mapped onto genre keywords after enrichment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Light,
    Serious,
    Inspiring,
    Dark,
    Romantic,
    Thrilling,
    Funny,
    Thoughtful,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Light,
        Mood::Serious,
        Mood::Inspiring,
        Mood::Dark,
        Mood::Romantic,
        Mood::Thrilling,
        Mood::Funny,
        Mood::Thoughtful,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Mood::Light => "light",
            Mood::Serious => "serious",
            Mood::Inspiring => "inspiring",
            Mood::Dark => "dark",
            Mood::Romantic => "romantic",
            Mood::Thrilling => "thrilling",
            Mood::Funny => "funny",
            Mood::Thoughtful => "thoughtful",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mood::Light => "Light & Fun",
            Mood::Serious => "Serious & Dramatic",
            Mood::Inspiring => "Inspiring & Uplifting",
            Mood::Dark => "Dark & Intense",
            Mood::Romantic => "Romantic",
            Mood::Thrilling => "Thrilling & Exciting",
            Mood::Funny => "Funny & Humorous",
            Mood::Thoughtful => "Thoughtful & Deep",
        }
    }

    /// Lowercase genre names that satisfy this mood
    pub fn genre_keywords(&self) -> &'static [&'static str] {
        match self {
            Mood::Light => &["comedy", "family", "animation"],
            Mood::Serious => &["drama", "history", "war"],
            Mood::Inspiring => &["drama", "music", "documentary", "history"],
            Mood::Dark => &["horror", "thriller", "crime"],
            Mood::Romantic => &["romance"],
            Mood::Thrilling => &["action", "thriller", "adventure", "mystery"],
            Mood::Funny => &["comedy"],
            Mood::Thoughtful => &["drama", "documentary", "science fiction", "mystery"],
        }
    }
}

impl FromStr for Mood {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Mood::ALL
            .into_iter()
            .find(|mood| mood.id() == wanted)
            .ok_or_else(|| AppError::InvalidFilter(format!("Unknown mood '{}'", s)))
    }
}

/// The complete set of criteria for one recommendation request
///
/// Multi-valued dimensions keep selection order; duplicates are dropped on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    pub genres: Vec<GenreId>,
    pub decades: Vec<DecadeRange>,
    pub countries: Vec<CountryCode>,
    pub moods: Vec<Mood>,
    pub actor_name: Option<String>,
    pub director_name: Option<String>,
    pub max_runtime_minutes: u32,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self {
            genres: Vec::new(),
            decades: Vec::new(),
            countries: Vec::new(),
            moods: Vec::new(),
            actor_name: None,
            director_name: None,
            max_runtime_minutes: NO_RUNTIME_LIMIT,
        }
    }
}

impl FilterSet {
    pub fn with_genres(mut self, genres: impl IntoIterator<Item = GenreId>) -> Self {
        self.genres = dedup(genres);
        self
    }

    pub fn with_decades(mut self, decades: impl IntoIterator<Item = DecadeRange>) -> Self {
        self.decades = dedup(decades);
        self
    }

    pub fn with_countries<S: Into<CountryCode>>(
        mut self,
        countries: impl IntoIterator<Item = S>,
    ) -> Self {
        self.countries = dedup(
            countries
                .into_iter()
                .map(|c| c.into().trim().to_uppercase())
                .filter(|c| !c.is_empty()),
        );
        self
    }

    pub fn with_moods(mut self, moods: impl IntoIterator<Item = Mood>) -> Self {
        self.moods = dedup(moods);
        self
    }

    pub fn with_actor(mut self, name: impl Into<String>) -> Self {
        self.actor_name = non_blank(name.into());
        self
    }

    pub fn with_director(mut self, name: impl Into<String>) -> Self {
        self.director_name = non_blank(name.into());
        self
    }

    pub fn with_max_runtime(mut self, minutes: u32) -> Self {
        self.max_runtime_minutes = minutes.min(NO_RUNTIME_LIMIT);
        self
    }

    /// True when the runtime ceiling is below the "no limit" sentinel
    pub fn has_runtime_limit(&self) -> bool {
        self.max_runtime_minutes < NO_RUNTIME_LIMIT
    }

    /// True when at least one dimension differs from its default
    pub fn is_active(&self) -> bool {
        !self.genres.is_empty()
            || !self.decades.is_empty()
            || !self.countries.is_empty()
            || !self.moods.is_empty()
            || self.actor_name.is_some()
            || self.director_name.is_some()
            || self.has_runtime_limit()
    }
}

fn dedup<T: PartialEq>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut unique = Vec::new();
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decade_bounds() {
        let decade = DecadeRange::starting(2010).unwrap();
        assert_eq!(decade.end_year(), 2019);
        assert_eq!(decade.label(), "2010s");
        assert_eq!(format!("{}", decade), "2010-2019");

        let (first, last) = decade.release_window().unwrap();
        assert_eq!(first.to_string(), "2010-01-01");
        assert_eq!(last.to_string(), "2019-12-31");
    }

    #[test]
    fn test_decade_start_year_overflow_rejected() {
        assert!(DecadeRange::starting(i32::MAX - 9).is_ok());
        assert!(matches!(
            DecadeRange::starting(i32::MAX - 8),
            Err(AppError::InvalidFilter(_))
        ));
        assert!(matches!(
            DecadeRange::starting(i32::MAX),
            Err(AppError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_decade_serde_uses_start_year() {
        let decade = DecadeRange::starting(1990).unwrap();
        assert_eq!(serde_json::to_string(&decade).unwrap(), "1990");

        let parsed: DecadeRange = serde_json::from_str("1990").unwrap();
        assert_eq!(parsed.end_year(), 1999);
    }

    #[test]
    fn test_decade_deserialize_rejects_bad_input() {
        assert!(serde_json::from_str::<DecadeRange>("2147483647").is_err());
        assert!(
            serde_json::from_str::<DecadeRange>(r#"{"start_year":1990,"end_year":2050}"#).is_err()
        );
    }

    #[test]
    fn test_decade_catalog() {
        let decades = decade_catalog();
        assert_eq!(decades.len(), 8);
        assert_eq!(decades[0], DecadeRange::starting(1950).unwrap());
        assert_eq!(decades[7], DecadeRange::starting(2020).unwrap());
    }

    #[test]
    fn test_mood_parse() {
        assert_eq!("dark".parse::<Mood>().unwrap(), Mood::Dark);
        assert_eq!(" Light ".parse::<Mood>().unwrap(), Mood::Light);
        assert!("grumpy".parse::<Mood>().is_err());
    }

    #[test]
    fn test_mood_serde() {
        let json = serde_json::to_string(&Mood::Thoughtful).unwrap();
        assert_eq!(json, "\"thoughtful\"");
    }

    #[test]
    fn test_default_filter_set_is_inactive() {
        let filters = FilterSet::default();
        assert!(!filters.is_active());
        assert_eq!(filters.max_runtime_minutes, NO_RUNTIME_LIMIT);
    }

    #[test]
    fn test_each_dimension_activates() {
        assert!(FilterSet::default().with_genres([28]).is_active());
        assert!(FilterSet::default()
            .with_decades([DecadeRange::starting(1990).unwrap()])
            .is_active());
        assert!(FilterSet::default().with_countries(["us"]).is_active());
        assert!(FilterSet::default().with_moods([Mood::Dark]).is_active());
        assert!(FilterSet::default().with_actor("Tom Hanks").is_active());
        assert!(FilterSet::default().with_director("Greta Gerwig").is_active());
        assert!(FilterSet::default().with_max_runtime(90).is_active());
    }

    #[test]
    fn test_blank_names_are_ignored() {
        let filters = FilterSet::default().with_actor("   ").with_director("");
        assert_eq!(filters.actor_name, None);
        assert_eq!(filters.director_name, None);
        assert!(!filters.is_active());
    }

    #[test]
    fn test_duplicates_dropped_in_selection_order() {
        let filters = FilterSet::default()
            .with_genres([35, 28, 35])
            .with_countries(["us", "FR", "US"]);
        assert_eq!(filters.genres, vec![35, 28]);
        assert_eq!(filters.countries, vec!["US".to_string(), "FR".to_string()]);
    }

    #[test]
    fn test_runtime_clamped_to_sentinel() {
        let filters = FilterSet::default().with_max_runtime(500);
        assert_eq!(filters.max_runtime_minutes, NO_RUNTIME_LIMIT);
        assert!(!filters.has_runtime_limit());
    }
}

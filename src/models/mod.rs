mod filters;
mod movie;
mod page;
mod query;
mod sort;

pub use filters::{
    decade_catalog, CountryCode, DecadeRange, FilterSet, GenreId, Mood, NO_RUNTIME_LIMIT,
};
pub use movie::{
    CandidateMovie, CastMember, Credits, CrewMember, DetailedMovie, Genre, MovieId, Person,
};
pub use page::Page;
pub use query::{DiscoverPage, ProviderQuery, MIN_VOTE_AVERAGE, MIN_VOTE_COUNT};
pub use sort::SortOption;

/// Final ranked output of one pipeline run, capped at 100 entries
pub type PipelineResult = Vec<DetailedMovie>;

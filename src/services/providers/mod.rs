/// Movie metadata provider abstraction
///
/// The recommendation pipeline only talks to the provider through this trait. Implementations
/// are thin per-endpoint wrappers: they perform one HTTP call each and map non-2xx responses
/// to `AppError::Provider`. Throttling and retries live in the request gateway, not here.
use crate::{
    error::AppResult,
    models::{DetailedMovie, DiscoverPage, Genre, MovieId, Person, ProviderQuery},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for movie metadata providers
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Run one discovery query and return a single page of candidates
    async fn discover_movies(&self, query: &ProviderQuery) -> AppResult<DiscoverPage>;

    /// Fetch the full record for one movie, including genres and credits
    async fn get_movie_details(&self, id: MovieId) -> AppResult<DetailedMovie>;

    /// Search people by name for the cast & crew picker
    async fn search_person(&self, query: &str) -> AppResult<Vec<Person>>;

    /// List every movie genre the provider knows
    async fn get_genre_list(&self) -> AppResult<Vec<Genre>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mockall::mock! {
    pub Provider {}

    #[async_trait::async_trait]
    impl MetadataProvider for Provider {
        async fn discover_movies(&self, query: &ProviderQuery) -> AppResult<DiscoverPage>;
        async fn get_movie_details(&self, id: MovieId) -> AppResult<DetailedMovie>;
        async fn search_person(&self, query: &str) -> AppResult<Vec<Person>>;
        async fn get_genre_list(&self) -> AppResult<Vec<Genre>>;
        fn name(&self) -> &'static str;
    }
}

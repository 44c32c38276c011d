/// TMDB (The Movie Database) API provider
///
/// API Flow:
/// 1. Discovery: /discover/movie → one page of candidates per query
/// 2. Details: /movie/{id}?append_to_response=credits → genres, runtime, cast and crew
/// 3. Pickers: /search/person and /genre/movie/list
use crate::{
    error::{AppError, AppResult},
    models::{DetailedMovie, DiscoverPage, Genre, MovieId, Person, ProviderQuery},
    services::providers::MetadataProvider,
};
use reqwest::Client as HttpClient;
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Poster sizes served by the image CDN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    W500,
    Original,
}

impl ImageSize {
    fn as_str(&self) -> &'static str {
        match self {
            ImageSize::W500 => "w500",
            ImageSize::Original => "original",
        }
    }
}

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_url: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String, image_url: String) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            image_url: image_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full URL of a poster or backdrop path
    pub fn image_url(&self, path: &str, size: ImageSize) -> String {
        format!("{}/{}{}", self.image_url, size.as_str(), path)
    }

    /// Query parameters for a discovery call
    fn discover_params(&self, query: &ProviderQuery) -> AppResult<Vec<(&'static str, String)>> {
        let mut params = vec![
            ("api_key", self.api_key.clone()),
            ("sort_by", "vote_average.desc".to_string()),
            ("vote_average.gte", query.vote_average_min.to_string()),
            ("vote_count.gte", query.vote_count_min.to_string()),
            ("page", query.page.to_string()),
        ];

        if let Some(genre) = query.genre {
            params.push(("with_genres", genre.to_string()));
        }

        if let Some(decade) = query.decade {
            let (first, last) = decade.release_window()?;
            params.push(("primary_release_date.gte", first.format("%Y-%m-%d").to_string()));
            params.push(("primary_release_date.lte", last.format("%Y-%m-%d").to_string()));
        }

        if let Some(countries) = &query.countries {
            params.push(("with_origin_country", countries.clone()));
        }

        Ok(params)
    }

    /// Issues a GET and decodes the JSON body, mapping non-2xx to a provider error
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self.http_client.get(&url).query(params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                provider = "tmdb",
                "Provider request failed"
            );
            return Err(AppError::provider(status.as_u16(), body));
        }

        Ok(response.json().await?)
    }
}

#[derive(Deserialize)]
struct PersonSearchResponse {
    #[serde(default)]
    results: Vec<Person>,
}

#[derive(Deserialize)]
struct GenreListResponse {
    #[serde(default)]
    genres: Vec<Genre>,
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn discover_movies(&self, query: &ProviderQuery) -> AppResult<DiscoverPage> {
        let params = self.discover_params(query)?;
        let page: DiscoverPage = self.get_json("/discover/movie", &params).await?;

        tracing::debug!(
            genre = ?query.genre,
            decade = ?query.decade,
            results = page.results.len(),
            total_pages = page.total_pages,
            provider = "tmdb",
            "Discovery page fetched"
        );

        Ok(page)
    }

    async fn get_movie_details(&self, id: MovieId) -> AppResult<DetailedMovie> {
        let params = [
            ("api_key", self.api_key.clone()),
            ("append_to_response", "credits".to_string()),
        ];
        let movie: DetailedMovie = self.get_json(&format!("/movie/{}", id), &params).await?;

        tracing::debug!(
            movie_id = id,
            cast = movie.credits.cast.len(),
            crew = movie.credits.crew.len(),
            provider = "tmdb",
            "Movie details fetched"
        );

        Ok(movie)
    }

    async fn search_person(&self, query: &str) -> AppResult<Vec<Person>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidFilter("Person search query cannot be empty".to_string()));
        }

        let params = [
            ("api_key", self.api_key.clone()),
            ("query", query.to_string()),
        ];
        let response: PersonSearchResponse = self.get_json("/search/person", &params).await?;

        tracing::info!(
            query = %query,
            results = response.results.len(),
            provider = "tmdb",
            "Person search completed"
        );

        Ok(response.results)
    }

    async fn get_genre_list(&self) -> AppResult<Vec<Genre>> {
        let params = [("api_key", self.api_key.clone())];
        let response: GenreListResponse = self.get_json("/genre/movie/list", &params).await?;
        Ok(response.genres)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

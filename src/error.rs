use crate::models::MovieId;

/// Message shown when a search is attempted with every filter at its default
pub const SELECT_SOMETHING_MESSAGE: &str = "Please make at least one selection";

/// Message shown when a well-formed search produced nothing
pub const NO_MATCHES_MESSAGE: &str =
    "No movies found matching your criteria. Try adjusting your selections.";

/// Message shown for provider, transport and enrichment failures
pub const TRY_AGAIN_MESSAGE: &str = "Failed to fetch recommendations. Please try again.";

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Provider returned status {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("No movies matched the selected criteria")]
    NoResults,

    #[error("Failed to fetch details for movie {movie_id}: {source}")]
    Enrichment {
        movie_id: MovieId,
        #[source]
        source: Box<AppError>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds a provider error from a status code and response body
    pub fn provider(status: u16, message: impl Into<String>) -> Self {
        AppError::Provider {
            status,
            message: message.into(),
        }
    }

    /// True when the provider rejected the call for exceeding its rate limit
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::Provider { status: 429, .. })
    }

    /// Maps the error to the message the UI displays
    ///
    /// Enrichment failures are reported the same way as provider failures.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::InvalidFilter(_) => SELECT_SOMETHING_MESSAGE,
            AppError::NoResults => NO_MATCHES_MESSAGE,
            AppError::Provider { .. }
            | AppError::HttpClient(_)
            | AppError::Enrichment { .. }
            | AppError::Internal(_) => TRY_AGAIN_MESSAGE,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

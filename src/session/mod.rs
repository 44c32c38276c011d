pub mod run_token;
pub mod state;

pub use run_token::{LoadingGuard, RunId, RunToken, RunTokens};
pub use state::{RecommendationSession, SessionInner};

pub mod context;
pub mod enrichment;
pub mod gateway;
pub mod merger;
pub mod planner;
pub mod post_filter;
pub mod providers;
pub mod recommendations;

pub use context::PipelineContext;
pub use enrichment::EnrichmentPolicy;
pub use gateway::{GatewaySettings, RateLimitedGateway};
pub use providers::{MetadataProvider, TmdbProvider};
pub use recommendations::RecommendationPipeline;

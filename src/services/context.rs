use std::sync::Arc;

use crate::{
    cache::{DetailCache, FingerprintCache},
    services::{
        enrichment::EnrichmentPolicy,
        gateway::{GatewaySettings, RateLimitedGateway},
        providers::MetadataProvider,
    },
};

/// Shared state every pipeline stage works against
///
/// Owns the rate window (inside the gateway) and both caches, so separate contexts are fully
/// isolated from each other. Cloning is cheap and shares the same state.
#[derive(Clone)]
pub struct PipelineContext {
    pub provider: Arc<dyn MetadataProvider>,
    pub gateway: Arc<RateLimitedGateway>,
    pub detail_cache: DetailCache,
    pub fingerprint_cache: FingerprintCache,
    pub enrichment_policy: EnrichmentPolicy,
}

impl PipelineContext {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        settings: GatewaySettings,
        enrichment_policy: EnrichmentPolicy,
    ) -> Self {
        Self {
            provider,
            gateway: Arc::new(RateLimitedGateway::new(settings)),
            detail_cache: DetailCache::new(),
            fingerprint_cache: FingerprintCache::new(),
            enrichment_policy,
        }
    }
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("provider", &self.provider.name())
            .field("enrichment_policy", &self.enrichment_policy)
            .finish_non_exhaustive()
    }
}

//! Provider registry
//!
//! Maps webhook route slugs to adapters. Built once at startup from the
//! loaded source tables and shared read-only through the application state.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::attribution::SourceMaps;
use crate::providers::{CallRailAdapter, ProviderAdapter, ProviderKind, TwilioAdapter};

/// Error type for registry operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum RegistryError {
    #[error("Provider '{name}' not found")]
    ProviderNotFound { name: String },
}

/// Registry of provider adapters keyed by slug
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<&'static str, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every supported provider, using `sources` for attribution.
    pub fn with_sources(sources: &SourceMaps) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CallRailAdapter::new(sources.callrail.clone())));
        registry.register(Arc::new(TwilioAdapter::new(sources.twilio.clone())));
        registry
    }

    /// Register (or replace) an adapter under its provider slug.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        let slug = adapter.kind().slug();
        debug!(provider = slug, "Registering provider adapter");
        self.adapters.insert(slug, adapter);
    }

    /// Look up an adapter by route slug.
    pub fn get(&self, name: &str) -> Result<Arc<dyn ProviderAdapter>, RegistryError> {
        name.parse::<ProviderKind>()
            .ok()
            .and_then(|kind| self.adapters.get(kind.slug()).cloned())
            .ok_or_else(|| RegistryError::ProviderNotFound {
                name: name.to_string(),
            })
    }

    /// Registered slugs in sorted order.
    pub fn slugs(&self) -> Vec<&'static str> {
        let mut slugs: Vec<_> = self.adapters.keys().copied().collect();
        slugs.sort_unstable();
        slugs
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.slugs())
            .finish()
    }
}

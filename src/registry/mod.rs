use std::sync::Arc;

use indexmap::IndexMap;

use crate::core::error::RoutingError;
use crate::core::traits::TranslationProvider;
use crate::core::types::ProviderId;

/// Provider lookup table, populated once while the runtime is built and read
/// afterwards.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: IndexMap<ProviderId, Arc<dyn TranslationProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the provider under its own id; a later registration with the
    /// same id replaces the earlier one but keeps its position.
    pub fn register(&mut self, provider: Arc<dyn TranslationProvider>) {
        let id = provider.id();
        if self.providers.insert(id.clone(), provider).is_some() {
            tracing::debug!(provider = %id, "replaced registered provider");
        }
    }

    pub fn resolve(&self, provider: &ProviderId) -> Result<Arc<dyn TranslationProvider>, RoutingError> {
        self.providers
            .get(provider)
            .map(Arc::clone)
            .ok_or_else(|| RoutingError::ProviderNotRegistered {
                provider: provider.clone(),
            })
    }

    pub fn contains(&self, provider: &ProviderId) -> bool {
        self.providers.contains_key(provider)
    }

    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.providers.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

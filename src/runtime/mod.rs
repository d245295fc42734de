use std::sync::Arc;

use crate::catalog;
use crate::core::error::{RoutingError, RuntimeError};
use crate::core::traits::TranslationProvider;
use crate::core::types::{
    ModelCatalog, ModelConfig, ProviderId, ProviderRequest, TranslateRequest, TranslationStream,
};
use crate::registry::ProviderRegistry;

/// Routes translation requests to registered providers.
///
/// Built once at startup; afterwards every call only reads the registry and
/// the model catalog, so a runtime can be shared across tasks.
pub struct TranslationRuntime {
    registry: ProviderRegistry,
    catalog: ModelCatalog,
}

pub struct TranslationRuntimeBuilder {
    providers: Vec<Arc<dyn TranslationProvider>>,
    catalog: ModelCatalog,
}

impl TranslationRuntime {
    pub fn builder() -> TranslationRuntimeBuilder {
        TranslationRuntimeBuilder {
            providers: Vec::new(),
            catalog: catalog::builtin_static_catalog(),
        }
    }

    /// Validates routing and hands the request to its provider. Every
    /// routing failure is reported before any network activity; provider
    /// failures come back unchanged as [`RuntimeError::Provider`].
    pub async fn stream_code_translation(
        &self,
        request: TranslateRequest,
    ) -> Result<TranslationStream, RuntimeError> {
        let provider = self.registry.resolve(&request.provider)?;
        let model = catalog::get_model_config(&self.catalog, &request.model)?;

        if model.provider != request.provider {
            return Err(RoutingError::ProviderModelMismatch {
                model: model.id.clone(),
                requested: request.provider,
                configured: model.provider.clone(),
            }
            .into());
        }

        let length = request.input_code.chars().count();
        if length > model.max_code_length {
            return Err(RuntimeError::InputTooLong {
                model: model.id.clone(),
                length,
                max_length: model.max_code_length,
            });
        }

        tracing::debug!(
            provider = %request.provider,
            model = %model.id,
            from = %request.input_language,
            to = %request.output_language,
            "routing translation request"
        );

        let provider_request = ProviderRequest {
            input_language: request.input_language,
            output_language: request.output_language,
            input_code: request.input_code,
            model: model.id.clone(),
            api_key: request.api_key,
        };

        provider
            .stream_translate(&provider_request)
            .await
            .map_err(|error| {
                tracing::warn!(
                    provider = %error.provider(),
                    %error,
                    "translation provider failed"
                );
                RuntimeError::from(error)
            })
    }

    pub fn model_catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn get_model_config(&self, model_id: &str) -> Result<&ModelConfig, RoutingError> {
        catalog::get_model_config(&self.catalog, model_id)
    }

    /// Models a caller can translate with through `provider`; empty when the
    /// provider is not registered.
    pub fn models_for_provider(&self, provider: &ProviderId) -> Vec<&ModelConfig> {
        if !self.registry.contains(provider) {
            return Vec::new();
        }

        catalog::models_for_provider(&self.catalog, provider).collect()
    }

    pub fn provider_ids(&self) -> Vec<ProviderId> {
        self.registry.provider_ids()
    }

    pub fn export_catalog_json(&self) -> Result<String, RuntimeError> {
        catalog::export_catalog_json(&self.catalog)
    }
}

impl TranslationRuntimeBuilder {
    pub fn with_provider(mut self, provider: Arc<dyn TranslationProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_model_catalog(mut self, catalog: ModelCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn build(self) -> TranslationRuntime {
        let mut registry = ProviderRegistry::new();
        for provider in self.providers {
            registry.register(provider);
        }

        TranslationRuntime {
            registry,
            catalog: self.catalog,
        }
    }
}

#[cfg(test)]
mod tests;

use crate::core::error::{RoutingError, RuntimeError};
use crate::core::types::{ModelCatalog, ModelConfig, ProviderId};

pub const LLAMA_3_8B_INSTRUCT: &str = "lmstudio-community/Meta-Llama-3-8B-Instruct-GGUF";
pub const GEMMA_2_9B_IT: &str = "lmstudio-community/gemma-2-9b-it-GGUF";

const DEFAULT_MAX_CODE_LENGTH: usize = 8_000;

pub fn get_model_config<'a>(
    catalog: &'a ModelCatalog,
    model_id: &str,
) -> Result<&'a ModelConfig, RoutingError> {
    catalog
        .models
        .iter()
        .find(|candidate| candidate.id == model_id)
        .ok_or_else(|| RoutingError::ModelNotFound {
            model: model_id.to_string(),
        })
}

pub fn models_for_provider<'a>(
    catalog: &'a ModelCatalog,
    provider: &ProviderId,
) -> impl Iterator<Item = &'a ModelConfig> {
    catalog
        .models
        .iter()
        .filter(move |candidate| candidate.provider == *provider)
}

pub fn export_catalog_json(catalog: &ModelCatalog) -> Result<String, RuntimeError> {
    let mut normalized = catalog.clone();
    sort_models(&mut normalized.models);

    serde_json::to_string_pretty(&normalized).map_err(|error| RuntimeError::SerializationError {
        message: error.to_string(),
    })
}

pub fn builtin_static_catalog() -> ModelCatalog {
    ModelCatalog {
        models: vec![
            ModelConfig {
                id: LLAMA_3_8B_INSTRUCT.to_string(),
                label: "Llama 3 8B".to_string(),
                provider: ProviderId::Lmstudio,
                max_code_length: DEFAULT_MAX_CODE_LENGTH,
            },
            ModelConfig {
                id: GEMMA_2_9B_IT.to_string(),
                label: "Gemma 2 9B".to_string(),
                provider: ProviderId::Lmstudio,
                max_code_length: DEFAULT_MAX_CODE_LENGTH,
            },
        ],
    }
}

fn sort_models(models: &mut [ModelConfig]) {
    models.sort_by(|left, right| {
        provider_order(&left.provider)
            .cmp(&provider_order(&right.provider))
            .then_with(|| left.provider.as_str().cmp(right.provider.as_str()))
            .then_with(|| left.id.cmp(&right.id))
    });
}

fn provider_order(provider: &ProviderId) -> u8 {
    match provider {
        ProviderId::Lmstudio => 0,
        ProviderId::Other(_) => 1,
    }
}

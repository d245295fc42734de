use crate::core::types::ProviderId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid base url for {provider}: {reason}")]
    InvalidBaseUrl { provider: ProviderId, reason: String },
    #[error("invalid timeout: {timeout_ms} ms")]
    InvalidTimeout { timeout_ms: u64 },
    #[error("failed to build http client: {reason}")]
    HttpClient { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("unknown provider: {provider}")]
    ProviderNotRegistered { provider: ProviderId },
    #[error("unknown model: {model}")]
    ModelNotFound { model: String },
    #[error("model {model} does not belong to provider {requested} (configured for {configured})")]
    ProviderModelMismatch {
        model: String,
        requested: ProviderId,
        configured: ProviderId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error(
        "provider transport error{context}: {message}",
        context = format_context(.provider, .model.as_deref(), None)
    )]
    Transport {
        provider: ProviderId,
        model: Option<String>,
        message: String,
    },
    #[error(
        "provider status error{context}: {message}",
        context = format_context(.provider, .model.as_deref(), Some(*.status_code))
    )]
    Status {
        provider: ProviderId,
        model: Option<String>,
        status_code: u16,
        message: String,
    },
    #[error(
        "provider protocol error{context}: {message}",
        context = format_context(.provider, .model.as_deref(), None)
    )]
    Protocol {
        provider: ProviderId,
        model: Option<String>,
        message: String,
    },
    #[error(
        "provider serialization error{context}: {message}",
        context = format_context(.provider, .model.as_deref(), None)
    )]
    Serialization {
        provider: ProviderId,
        model: Option<String>,
        message: String,
    },
}

impl ProviderError {
    pub fn provider(&self) -> &ProviderId {
        match self {
            Self::Transport { provider, .. }
            | Self::Status { provider, .. }
            | Self::Protocol { provider, .. }
            | Self::Serialization { provider, .. } => provider,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    ConfigError(#[from] ConfigError),
    #[error(transparent)]
    RoutingError(#[from] RoutingError),
    #[error("input too long for model {model}: {length} characters exceeds limit of {max_length}")]
    InputTooLong {
        model: String,
        length: usize,
        max_length: usize,
    },
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

fn format_context(provider: &ProviderId, model: Option<&str>, status_code: Option<u16>) -> String {
    let mut context = vec![format!("provider={provider}")];

    if let Some(model) = model {
        context.push(format!("model={model}"));
    }
    if let Some(status_code) = status_code {
        context.push(format!("status_code={status_code}"));
    }

    format!(" [{}]", context.join(", "))
}

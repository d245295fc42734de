use async_trait::async_trait;

use crate::core::error::{ConfigError, ProviderError};
use crate::core::traits::TranslationProvider;
use crate::core::types::{ProviderId, ProviderRequest, TranslationStream};
use crate::providers::openai_compat_translate::OpenAiCompatTranslator;
use crate::providers::translator_contract::ProviderTranslator;
use crate::transport::http::{DEFAULT_CONNECT_TIMEOUT_MS, HttpTransport};

pub const LMSTUDIO_DEFAULT_BASE_URL: &str = "http://localhost:1234/v1";
pub const LMSTUDIO_BASE_URL_ENV: &str = "LMSTUDIO_BASE_URL";
pub const LMSTUDIO_API_KEY_ENV: &str = "LMSTUDIO_API_KEY";

/// Provider for a local LM Studio server speaking the OpenAI-compatible
/// protocol.
pub struct LmStudioProvider {
    transport: HttpTransport,
    translator: OpenAiCompatTranslator,
    base_url: String,
    api_key: Option<String>,
}

impl LmStudioProvider {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_url(LMSTUDIO_DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(DEFAULT_CONNECT_TIMEOUT_MS)?;
        Self::with_transport(base_url, transport)
    }

    /// Reads `LMSTUDIO_BASE_URL` and `LMSTUDIO_API_KEY`, falling back to the
    /// local default endpoint.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var(LMSTUDIO_BASE_URL_ENV)
            .unwrap_or_else(|_| LMSTUDIO_DEFAULT_BASE_URL.to_string());
        let api_key = std::env::var(LMSTUDIO_API_KEY_ENV).ok();

        Ok(Self::with_base_url(base_url)?.with_api_key(api_key))
    }

    pub fn with_transport(
        base_url: impl Into<String>,
        transport: HttpTransport,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            transport,
            translator: OpenAiCompatTranslator::new(ProviderId::Lmstudio),
            base_url: normalize_base_url(base_url)?,
            api_key: None,
        })
    }

    /// Default key used when a request carries none. LM Studio accepts any
    /// value, so this only matters behind an authenticating proxy.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = sanitize_api_key(api_key);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn resolve_api_key(&self, req: &ProviderRequest) -> Option<String> {
        sanitize_api_key(req.api_key.clone()).or_else(|| self.api_key.clone())
    }
}

#[async_trait]
impl TranslationProvider for LmStudioProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Lmstudio
    }

    async fn stream_translate(
        &self,
        req: &ProviderRequest,
    ) -> Result<TranslationStream, ProviderError> {
        let encoded = self.translator.encode_request(req)?;
        let api_key = self.resolve_api_key(req);

        let body = self
            .transport
            .post_json_stream(
                ProviderId::Lmstudio,
                Some(req.model.as_str()),
                &self.chat_completions_url(),
                &encoded,
                api_key.as_deref(),
            )
            .await?;

        Ok(self.translator.decode_body(&req.model, body))
    }
}

fn normalize_base_url(base_url: impl Into<String>) -> Result<String, ConfigError> {
    let value = base_url.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(LMSTUDIO_DEFAULT_BASE_URL.to_string());
    }

    let parsed = reqwest::Url::parse(trimmed).map_err(|error| ConfigError::InvalidBaseUrl {
        provider: ProviderId::Lmstudio,
        reason: format!("{trimmed}: {error}"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            provider: ProviderId::Lmstudio,
            reason: format!("{trimmed}: unsupported scheme {}", parsed.scheme()),
        });
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

fn sanitize_api_key(api_key: Option<String>) -> Option<String> {
    api_key.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

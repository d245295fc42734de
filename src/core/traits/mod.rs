use async_trait::async_trait;

use crate::core::error::ProviderError;
use crate::core::types::{ProviderId, ProviderRequest, TranslationStream};

/// Backend contract for turning a routed translation request into a
/// streamed completion.
///
/// Implementations shape the prompt and relay the upstream stream handle;
/// tokenization, chunk framing and backpressure belong to the model server.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Stable provider identifier for routing and diagnostics.
    fn id(&self) -> ProviderId;

    /// Issues one streaming completion for the request. Errors from the
    /// upstream call are returned as-is, without retry.
    async fn stream_translate(
        &self,
        req: &ProviderRequest,
    ) -> Result<TranslationStream, ProviderError>;
}

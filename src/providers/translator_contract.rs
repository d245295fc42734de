use crate::core::error::ProviderError;
use crate::core::types::ProviderRequest;

/// One decoded unit of a streamed completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StreamDelta {
    Text(String),
    Skip,
    Done,
}

/// Internal provider-layer translation contract.
///
/// `TranslationProvider` is the runtime-facing extension point (transport,
/// auth, routing identity). This contract is crate-private and lets provider
/// modules turn a routed request into a wire payload and wire events back
/// into text deltas.
pub(crate) trait ProviderTranslator {
    /// Provider protocol payload used for outbound request encoding.
    type RequestPayload;

    /// Provider protocol event carried by the response stream.
    type StreamEvent: ?Sized;

    fn encode_request(&self, req: &ProviderRequest) -> Result<Self::RequestPayload, ProviderError>;

    fn decode_stream_event(
        &self,
        model: &str,
        event: &Self::StreamEvent,
    ) -> Result<StreamDelta, ProviderError>;
}

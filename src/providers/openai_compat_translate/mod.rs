use bytes::Bytes;
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::ProviderError;
use crate::core::types::{ProviderId, ProviderRequest, TranslationStream};
use crate::prompt::create_prompt;
use crate::providers::translator_contract::{ProviderTranslator, StreamDelta};
use crate::transport::http::ByteStream;

const SSE_DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ChatRole {
    System,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Codec for OpenAI-compatible `chat/completions` streaming.
#[derive(Debug, Clone)]
pub(crate) struct OpenAiCompatTranslator {
    provider: ProviderId,
}

impl OpenAiCompatTranslator {
    pub(crate) fn new(provider: ProviderId) -> Self {
        Self { provider }
    }

    /// Turns a raw SSE response body into a stream of generated text. The
    /// stream ends at `[DONE]`, at end of body, or after the first error.
    pub(crate) fn decode_body(&self, model: &str, body: ByteStream) -> TranslationStream {
        let state = DecodeState {
            translator: self.clone(),
            model: model.to_string(),
            events: body.eventsource().boxed(),
            finished: false,
        };

        stream::unfold(state, |mut state| async move {
            if state.finished {
                return None;
            }

            loop {
                let event = match state.events.next().await? {
                    Ok(event) => event,
                    Err(error) => {
                        state.finished = true;
                        let error = state.translator.event_stream_error(&state.model, error);
                        return Some((Err(error), state));
                    }
                };

                match state.translator.decode_stream_event(&state.model, &event.data) {
                    Ok(StreamDelta::Text(text)) => return Some((Ok(Bytes::from(text)), state)),
                    Ok(StreamDelta::Skip) => continue,
                    Ok(StreamDelta::Done) => return None,
                    Err(error) => {
                        state.finished = true;
                        return Some((Err(error), state));
                    }
                }
            }
        })
        .boxed()
    }

    fn event_stream_error(
        &self,
        model: &str,
        error: EventStreamError<ProviderError>,
    ) -> ProviderError {
        match error {
            EventStreamError::Transport(error) => error,
            other => ProviderError::Serialization {
                provider: self.provider.clone(),
                model: Some(model.to_string()),
                message: format!("invalid event stream: {other}"),
            },
        }
    }

    fn protocol_error(&self, model: &str, message: impl Into<String>) -> ProviderError {
        ProviderError::Protocol {
            provider: self.provider.clone(),
            model: Some(model.to_string()),
            message: message.into(),
        }
    }
}

impl ProviderTranslator for OpenAiCompatTranslator {
    type RequestPayload = ChatCompletionRequest;
    type StreamEvent = str;

    fn encode_request(&self, req: &ProviderRequest) -> Result<Self::RequestPayload, ProviderError> {
        if req.model.trim().is_empty() {
            return Err(self.protocol_error(&req.model, "model id must not be empty"));
        }

        let prompt = create_prompt(&req.input_language, &req.output_language, &req.input_code);

        Ok(ChatCompletionRequest {
            model: req.model.clone(),
            messages: vec![ChatMessage {
                role: ChatRole::System,
                content: prompt,
            }],
            stream: true,
        })
    }

    fn decode_stream_event(
        &self,
        model: &str,
        event: &Self::StreamEvent,
    ) -> Result<StreamDelta, ProviderError> {
        let data = event.trim();
        if data.is_empty() {
            return Ok(StreamDelta::Skip);
        }
        if data == SSE_DONE_MARKER {
            return Ok(StreamDelta::Done);
        }

        let value: Value =
            serde_json::from_str(data).map_err(|error| ProviderError::Serialization {
                provider: self.provider.clone(),
                model: Some(model.to_string()),
                message: format!("invalid stream event: {error}"),
            })?;

        if let Some(error) = value.get("error") {
            return Err(self.protocol_error(model, format_error_payload(error)));
        }

        let chunk: ChatCompletionChunk =
            serde_json::from_value(value).map_err(|error| ProviderError::Serialization {
                provider: self.provider.clone(),
                model: Some(model.to_string()),
                message: format!("unexpected stream chunk shape: {error}"),
            })?;

        let text = chunk
            .choices
            .into_iter()
            .filter_map(|choice| choice.delta.content)
            .collect::<String>();

        if text.is_empty() {
            Ok(StreamDelta::Skip)
        } else {
            Ok(StreamDelta::Text(text))
        }
    }
}

struct DecodeState {
    translator: OpenAiCompatTranslator,
    model: String,
    events: BoxStream<'static, Result<Event, EventStreamError<ProviderError>>>,
    finished: bool,
}

fn format_error_payload(error: &Value) -> String {
    match error {
        Value::String(message) => message.clone(),
        Value::Object(fields) => fields
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        other => other.to_string(),
    }
}

use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::Response;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use serde::Serialize;

use crate::core::error::{ConfigError, ProviderError};
use crate::core::types::ProviderId;

pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Raw response body, chunked as it arrives from the socket.
pub type ByteStream = BoxStream<'static, Result<Bytes, ProviderError>>;

/// Thin `reqwest` wrapper for one-shot streaming POSTs.
///
/// Only connection establishment is bounded; a response body may take as long
/// as the model needs. Requests are never retried.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(connect_timeout_ms: u64) -> Result<Self, ConfigError> {
        Self::validate_timeout(connect_timeout_ms)?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(connect_timeout_ms))
            .build()
            .map_err(|error| ConfigError::HttpClient {
                reason: error.to_string(),
            })?;

        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Sends `body` as JSON and hands back the successful response body as a
    /// byte stream. Non-2xx statuses are read in full and reported as
    /// [`ProviderError::Status`].
    pub async fn post_json_stream<TReq>(
        &self,
        provider: ProviderId,
        model: Option<&str>,
        url: &str,
        body: &TReq,
        bearer_token: Option<&str>,
    ) -> Result<ByteStream, ProviderError>
    where
        TReq: Serialize + ?Sized,
    {
        let model_owned = model.map(str::to_string);
        let payload = serde_json::to_vec(body).map_err(|error| ProviderError::Serialization {
            provider: provider.clone(),
            model: model_owned.clone(),
            message: error.to_string(),
        })?;

        let mut request_builder = self
            .client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .body(payload);

        if let Some(token) = bearer_token {
            let auth_value =
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|error| {
                    ProviderError::Protocol {
                        provider: provider.clone(),
                        model: model_owned.clone(),
                        message: format!("invalid bearer token header value: {error}"),
                    }
                })?;
            request_builder = request_builder.header(AUTHORIZATION, auth_value);
        }

        tracing::debug!(provider = %provider, model = ?model, url, "sending streaming request");

        let response = request_builder
            .send()
            .await
            .map_err(|error| ProviderError::Transport {
                provider: provider.clone(),
                model: model_owned.clone(),
                message: error.to_string(),
            })?;

        if !response.status().is_success() {
            let status_error =
                build_status_error(&provider, model_owned.as_deref(), response).await;
            tracing::warn!(error = %status_error, "upstream returned error status");
            return Err(status_error);
        }

        let stream = response.bytes_stream().map(move |chunk| {
            chunk.map_err(|error| ProviderError::Transport {
                provider: provider.clone(),
                model: model_owned.clone(),
                message: error.to_string(),
            })
        });

        Ok(stream.boxed())
    }

    fn validate_timeout(timeout_ms: u64) -> Result<(), ConfigError> {
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout { timeout_ms });
        }
        Ok(())
    }
}

async fn build_status_error(
    provider: &ProviderId,
    model: Option<&str>,
    response: Response,
) -> ProviderError {
    let status_code = response.status().as_u16();
    let message = match response.text().await {
        Ok(body) if !body.trim().is_empty() => body,
        Ok(_) => format!("http status {status_code}"),
        Err(error) => {
            format!("http status {status_code}; failed to read response body: {error}")
        }
    };

    ProviderError::Status {
        provider: provider.clone(),
        model: model.map(str::to_string),
        status_code,
        message,
    }
}

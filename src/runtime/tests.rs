use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream;

use super::TranslationRuntime;
use crate::catalog::{GEMMA_2_9B_IT, LLAMA_3_8B_INSTRUCT};
use crate::core::error::{ProviderError, RoutingError, RuntimeError};
use crate::core::traits::TranslationProvider;
use crate::core::types::{
    Language, ModelCatalog, ModelConfig, ProviderId, ProviderRequest, TranslateRequest,
    TranslationStream,
};

#[derive(Clone)]
struct RecordingProvider {
    provider: ProviderId,
    result: Result<&'static str, ProviderError>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl RecordingProvider {
    fn ok(provider: ProviderId, output: &'static str) -> Self {
        Self {
            provider,
            result: Ok(output),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn failing(provider: ProviderId, error: ProviderError) -> Self {
        Self {
            provider,
            result: Err(error),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn requests(&self) -> Vec<ProviderRequest> {
        self.requests
            .lock()
            .expect("requests lock should not be poisoned")
            .clone()
    }
}

#[async_trait]
impl TranslationProvider for RecordingProvider {
    fn id(&self) -> ProviderId {
        self.provider.clone()
    }

    async fn stream_translate(
        &self,
        req: &ProviderRequest,
    ) -> Result<TranslationStream, ProviderError> {
        self.requests
            .lock()
            .expect("requests lock should not be poisoned")
            .push(req.clone());

        let output = self.result.clone()?;
        let chunks = output
            .split_inclusive(' ')
            .map(|piece| Ok(Bytes::from(piece.to_string())))
            .collect::<Vec<_>>();
        Ok(stream::iter(chunks).boxed())
    }
}

fn translate_request(model: &str, provider: &str, input_code: &str) -> TranslateRequest {
    TranslateRequest {
        input_language: Language::from("JavaScript"),
        output_language: Language::from("Python"),
        input_code: input_code.to_string(),
        model: model.to_string(),
        provider: ProviderId::from(provider),
        api_key: None,
    }
}

async fn collect_text(stream: TranslationStream) -> String {
    let bytes = stream
        .map(|chunk| chunk.expect("chunk should be ok"))
        .collect::<Vec<_>>()
        .await
        .concat();
    String::from_utf8(bytes).expect("output should be utf8")
}

#[tokio::test]
async fn test_valid_model_and_provider_forwards_to_provider() {
    let provider = RecordingProvider::ok(ProviderId::Lmstudio, "for i in range(10): print(i)");
    let runtime = TranslationRuntime::builder()
        .with_provider(Arc::new(provider.clone()))
        .build();

    let mut request = translate_request(
        LLAMA_3_8B_INSTRUCT,
        "lmstudio",
        "for (let i=0;i<10;i++){console.log(i)}",
    );
    request.api_key = Some("user-key".to_string());

    let stream = runtime
        .stream_code_translation(request)
        .await
        .expect("valid request should route");
    assert_eq!(collect_text(stream).await, "for i in range(10): print(i)");

    let forwarded = provider.requests();
    assert_eq!(forwarded.len(), 1);
    assert_eq!(
        forwarded[0],
        ProviderRequest {
            input_language: Language::Code("JavaScript".to_string()),
            output_language: Language::Code("Python".to_string()),
            input_code: "for (let i=0;i<10;i++){console.log(i)}".to_string(),
            model: LLAMA_3_8B_INSTRUCT.to_string(),
            api_key: Some("user-key".to_string()),
        }
    );
}

#[tokio::test]
async fn test_unknown_provider_fails_before_provider_call() {
    let provider = RecordingProvider::ok(ProviderId::Lmstudio, "unused");
    let runtime = TranslationRuntime::builder()
        .with_provider(Arc::new(provider.clone()))
        .build();

    for unknown in ["openai", "anthropic", "lm-studio", ""] {
        let error = runtime
            .stream_code_translation(translate_request(LLAMA_3_8B_INSTRUCT, unknown, "x"))
            .await
            .err()
            .expect("unknown provider should fail");

        assert_eq!(
            error,
            RuntimeError::RoutingError(RoutingError::ProviderNotRegistered {
                provider: ProviderId::from(unknown),
            })
        );
    }

    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_provider_id_is_matched_exactly() {
    let provider = RecordingProvider::ok(ProviderId::Lmstudio, "unused");
    let runtime = TranslationRuntime::builder()
        .with_provider(Arc::new(provider.clone()))
        .build();

    for spelling in ["LMStudio", " lmstudio ", "LmStudio"] {
        let error = runtime
            .stream_code_translation(translate_request(LLAMA_3_8B_INSTRUCT, spelling, "x"))
            .await
            .err()
            .expect("differently spelled provider should not route");

        assert_eq!(
            error,
            RuntimeError::RoutingError(RoutingError::ProviderNotRegistered {
                provider: ProviderId::Other(spelling.to_string()),
            })
        );
    }

    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_unknown_model_fails_before_provider_call() {
    let provider = RecordingProvider::ok(ProviderId::Lmstudio, "unused");
    let runtime = TranslationRuntime::builder()
        .with_provider(Arc::new(provider.clone()))
        .build();

    let error = runtime
        .stream_code_translation(translate_request("gpt-4o", "lmstudio", "x"))
        .await
        .err()
        .expect("unknown model should fail");

    assert_eq!(
        error,
        RuntimeError::RoutingError(RoutingError::ModelNotFound {
            model: "gpt-4o".to_string(),
        })
    );
    assert!(provider.requests().is_empty());
}

#[tokio::test]
async fn test_provider_model_mismatch_fails_before_provider_call() {
    let lmstudio = RecordingProvider::ok(ProviderId::Lmstudio, "unused");
    let ollama_id = ProviderId::Other("ollama".to_string());
    let ollama = RecordingProvider::ok(ollama_id.clone(), "unused");
    let runtime = TranslationRuntime::builder()
        .with_provider(Arc::new(lmstudio.clone()))
        .with_provider(Arc::new(ollama.clone()))
        .build();

    let error = runtime
        .stream_code_translation(translate_request(GEMMA_2_9B_IT, "ollama", "x"))
        .await
        .err()
        .expect("mismatched provider should fail");

    assert_eq!(
        error,
        RuntimeError::RoutingError(RoutingError::ProviderModelMismatch {
            model: GEMMA_2_9B_IT.to_string(),
            requested: ollama_id,
            configured: ProviderId::Lmstudio,
        })
    );
    assert!(lmstudio.requests().is_empty());
    assert!(ollama.requests().is_empty());
}

#[tokio::test]
async fn test_input_longer_than_model_limit_is_rejected() {
    let provider = RecordingProvider::ok(ProviderId::Lmstudio, "ok");
    let runtime = TranslationRuntime::builder()
        .with_provider(Arc::new(provider.clone()))
        .with_model_catalog(ModelCatalog {
            models: vec![ModelConfig {
                id: "tiny".to_string(),
                label: "Tiny".to_string(),
                provider: ProviderId::Lmstudio,
                max_code_length: 4,
            }],
        })
        .build();

    let at_limit = runtime
        .stream_code_translation(translate_request("tiny", "lmstudio", "ééé!"))
        .await;
    assert!(at_limit.is_ok());

    let error = runtime
        .stream_code_translation(translate_request("tiny", "lmstudio", "12345"))
        .await
        .err()
        .expect("oversized input should fail");
    assert_eq!(
        error,
        RuntimeError::InputTooLong {
            model: "tiny".to_string(),
            length: 5,
            max_length: 4,
        }
    );
    assert_eq!(provider.requests().len(), 1);
}

#[tokio::test]
async fn test_provider_errors_propagate_unchanged() {
    let upstream = ProviderError::Transport {
        provider: ProviderId::Lmstudio,
        model: Some(LLAMA_3_8B_INSTRUCT.to_string()),
        message: "connection refused".to_string(),
    };
    let provider = RecordingProvider::failing(ProviderId::Lmstudio, upstream.clone());
    let runtime = TranslationRuntime::builder()
        .with_provider(Arc::new(provider.clone()))
        .build();

    let error = runtime
        .stream_code_translation(translate_request(LLAMA_3_8B_INSTRUCT, "lmstudio", "x"))
        .await
        .err()
        .expect("provider failure should propagate");

    assert_eq!(error, RuntimeError::Provider(upstream));
    assert_eq!(provider.requests().len(), 1);
}

#[test]
fn test_catalog_accessors() {
    let runtime = TranslationRuntime::builder()
        .with_provider(Arc::new(RecordingProvider::ok(ProviderId::Lmstudio, "")))
        .with_model_catalog(ModelCatalog {
            models: vec![
                ModelConfig {
                    id: "local".to_string(),
                    label: "Local".to_string(),
                    provider: ProviderId::Lmstudio,
                    max_code_length: 10,
                },
                ModelConfig {
                    id: "remote".to_string(),
                    label: "Remote".to_string(),
                    provider: ProviderId::Other("unregistered".to_string()),
                    max_code_length: 10,
                },
            ],
        })
        .build();

    assert_eq!(runtime.model_catalog().models.len(), 2);
    assert_eq!(runtime.provider_ids(), vec![ProviderId::Lmstudio]);
    assert_eq!(
        runtime
            .models_for_provider(&ProviderId::Lmstudio)
            .iter()
            .map(|model| model.id.as_str())
            .collect::<Vec<_>>(),
        vec!["local"]
    );
    assert!(
        runtime
            .models_for_provider(&ProviderId::Other("unregistered".to_string()))
            .is_empty()
    );
    assert_eq!(
        runtime
            .get_model_config("remote")
            .expect("remote model should resolve")
            .label,
        "Remote"
    );

    let json = runtime.export_catalog_json().expect("catalog should export");
    assert!(json.contains("\"local\""));
}

#[test]
fn test_default_builder_uses_builtin_catalog() {
    let runtime = TranslationRuntime::builder().build();

    assert!(runtime.get_model_config(LLAMA_3_8B_INSTRUCT).is_ok());
    assert!(runtime.get_model_config(GEMMA_2_9B_IT).is_ok());
    assert!(runtime.models_for_provider(&ProviderId::Lmstudio).is_empty());
    assert!(runtime.provider_ids().is_empty());
}

use std::io::{self, Read, Write};
use std::sync::Arc;

use futures::StreamExt;
use tracing_subscriber::EnvFilter;
use translate_runtime::TranslationRuntime;
use translate_runtime::catalog::{self, LLAMA_3_8B_INSTRUCT};
use translate_runtime::core::types::{Language, ProviderId, TranslateRequest};
use translate_runtime::providers::lmstudio::LmStudioProvider;

const MODEL_ENV: &str = "TRANSLATE_CLI_MODEL";
const PROVIDER_ENV: &str = "TRANSLATE_CLI_PROVIDER";

struct CliConfig {
    input_language: Language,
    output_language: Language,
    model: String,
    provider: ProviderId,
    api_key: Option<String>,
    list_models: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = parse_config(std::env::args().skip(1).collect())?;
    let runtime = build_runtime()?;

    if config.list_models {
        for model in runtime.models_for_provider(&config.provider) {
            println!(
                "{}\t{} ({})\tmax {} chars",
                model.id, model.label, model.provider, model.max_code_length
            );
        }
        return Ok(());
    }

    let mut input_code = String::new();
    io::stdin().read_to_string(&mut input_code)?;
    if input_code.trim().is_empty() {
        return Err("no input on stdin".into());
    }

    let request = TranslateRequest {
        input_language: config.input_language,
        output_language: config.output_language,
        input_code,
        model: config.model,
        provider: config.provider,
        api_key: config.api_key,
    };

    let mut stream = runtime.stream_code_translation(request).await?;
    let mut stdout = io::stdout();
    while let Some(chunk) = stream.next().await {
        stdout.write_all(&chunk?)?;
        stdout.flush()?;
    }
    writeln!(stdout)?;

    Ok(())
}

fn build_runtime() -> Result<TranslationRuntime, Box<dyn std::error::Error>> {
    let lmstudio = LmStudioProvider::from_env()
        .map_err(|e| format!("failed to build LM Studio provider: {e}"))?;

    Ok(TranslationRuntime::builder()
        .with_provider(Arc::new(lmstudio))
        .with_model_catalog(catalog::builtin_static_catalog())
        .build())
}

fn parse_config(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut input_language = None;
    let mut output_language = None;
    let mut api_key = None;
    let mut list_models = false;

    let mut model = std::env::var(MODEL_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| LLAMA_3_8B_INSTRUCT.to_string());

    let mut provider = std::env::var(PROVIDER_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(|value| ProviderId::from(value.as_str()))
        .unwrap_or(ProviderId::Lmstudio);

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--from" => {
                let value = args.get(i + 1).ok_or("missing value for --from")?;
                input_language = Some(Language::from(value.as_str()));
                i += 2;
            }
            "--to" => {
                let value = args.get(i + 1).ok_or("missing value for --to")?;
                output_language = Some(Language::from(value.as_str()));
                i += 2;
            }
            "--model" => {
                let value = args
                    .get(i + 1)
                    .ok_or("missing value for --model")?
                    .trim()
                    .to_string();
                if value.is_empty() {
                    return Err("--model must be non-empty".into());
                }
                model = value;
                i += 2;
            }
            "--provider" => {
                let value = args.get(i + 1).ok_or("missing value for --provider")?;
                provider = ProviderId::from(value.as_str());
                i += 2;
            }
            "--api-key" => {
                let value = args.get(i + 1).ok_or("missing value for --api-key")?;
                api_key = Some(value.clone());
                i += 2;
            }
            "--list-models" => {
                list_models = true;
                i += 1;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                return Err(format!("unknown argument: {other}").into());
            }
        }
    }

    if list_models {
        return Ok(CliConfig {
            input_language: Language::NaturalLanguage,
            output_language: Language::NaturalLanguage,
            model,
            provider,
            api_key,
            list_models,
        });
    }

    Ok(CliConfig {
        input_language: input_language.ok_or("--from is required")?,
        output_language: output_language.ok_or("--to is required")?,
        model,
        provider,
        api_key,
        list_models,
    })
}

fn print_help() {
    println!(
        "Usage:\n  translate_cli --from LANG --to LANG [--model MODEL] [--provider ID] [--api-key KEY] < input\n  translate_cli --list-models [--provider ID]\n\nUse \"Natural Language\" as LANG to describe code in prose or to explain code.\n\nEnv:\n  LMSTUDIO_BASE_URL (default http://localhost:1234/v1)\n  LMSTUDIO_API_KEY\n  TRANSLATE_CLI_MODEL\n  TRANSLATE_CLI_PROVIDER\n  RUST_LOG"
    );
}

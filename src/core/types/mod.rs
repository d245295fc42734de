use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::error::ProviderError;

/// Display name that selects [`Language::NaturalLanguage`].
pub const NATURAL_LANGUAGE: &str = "Natural Language";

/// Lazily produced bytes of generated text, relayed as the model emits them.
pub type TranslationStream = BoxStream<'static, Result<Bytes, ProviderError>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Lmstudio,
    Other(String),
}

impl ProviderId {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Lmstudio => "lmstudio",
            Self::Other(id) => id.as_str(),
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(value))
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        match value {
            "lmstudio" => Self::Lmstudio,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Serialize for ProviderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProviderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

/// Source or target of a translation.
///
/// Natural language is its own case so prompt selection never depends on
/// comparing free-form strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Language {
    NaturalLanguage,
    Code(String),
}

impl Language {
    pub fn display_name(&self) -> &str {
        match self {
            Self::NaturalLanguage => NATURAL_LANGUAGE,
            Self::Code(name) => name.as_str(),
        }
    }

    pub fn is_natural_language(&self) -> bool {
        matches!(self, Self::NaturalLanguage)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl From<&str> for Language {
    fn from(value: &str) -> Self {
        if value == NATURAL_LANGUAGE {
            Self::NaturalLanguage
        } else {
            Self::Code(value.to_string())
        }
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display_name())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub id: String,
    pub label: String,
    pub provider: ProviderId,
    pub max_code_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ModelCatalog {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<ModelConfig>,
}

/// Request body accepted from callers, field names matching the web API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub input_language: Language,
    pub output_language: Language,
    pub input_code: String,
    pub model: String,
    pub provider: ProviderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Normalized request handed to a provider once routing has succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderRequest {
    pub input_language: Language,
    pub output_language: Language,
    pub input_code: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

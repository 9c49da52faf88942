//! Resolver configuration for the model endpoint.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

const DEFAULT_API_URL: &str = "http://localhost:11434/v1";
const DEFAULT_API_KEY: &str = "ollama";
const DEFAULT_MODEL: &str = "llama3.1";

/// Endpoint definition for an OpenAI-compatible chat completions API
/// (OpenAI, Ollama, vLLM, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmResolver {
    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub api_url: String,
    /// Bearer token. Empty disables the `Authorization` header.
    pub api_key: String,
    /// Model identifier.
    pub model_name: String,
}

impl Default for LlmResolver {
    fn default() -> Self {
        Self::ollama(DEFAULT_MODEL)
    }
}

impl LlmResolver {
    /// Create a new resolver.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            model_name: model_name.into(),
        }
    }

    /// Create a resolver for a local Ollama instance.
    pub fn ollama(model_name: impl Into<String>) -> Self {
        Self::new(DEFAULT_API_URL, DEFAULT_API_KEY, model_name)
    }

    /// Build a resolver from the environment.
    ///
    /// `NEUROGRAPH_LLM_*` variables win over the `OPENAI_*` ones; anything
    /// missing falls back to a local Ollama endpoint.
    pub fn from_env() -> Self {
        let lookup = |primary: &str, fallback: &str| {
            env::var(primary)
                .or_else(|_| env::var(fallback))
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self::from_parts(
            lookup("NEUROGRAPH_LLM_API_URL", "OPENAI_API_URL"),
            lookup("NEUROGRAPH_LLM_API_KEY", "OPENAI_API_KEY"),
            lookup("NEUROGRAPH_LLM_MODEL", "OPENAI_MODEL_NAME"),
        )
    }

    /// Fill in defaults for any missing part.
    pub fn from_parts(
        api_url: Option<String>,
        api_key: Option<String>,
        model_name: Option<String>,
    ) -> Self {
        Self {
            api_url: api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key: api_key.unwrap_or_else(|| DEFAULT_API_KEY.to_string()),
            model_name: model_name.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// Load a resolver from a TOML file with a `[resolver]` table.
    pub fn load_from_toml<P: AsRef<Path>>(path: P) -> ServiceResult<Self> {
        #[derive(Deserialize)]
        struct ResolverFile {
            resolver: LlmResolver,
        }

        let raw = fs::read_to_string(path.as_ref()).map_err(|e| {
            ServiceError::Config(format!(
                "unable to read resolver file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        let file: ResolverFile = toml::from_str(&raw)
            .map_err(|e| ServiceError::Config(format!("invalid resolver toml: {e}")))?;
        Ok(file.resolver)
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_parts_fall_back_to_ollama() {
        let resolver = LlmResolver::from_parts(None, None, Some("gpt-4o-mini".into()));
        assert_eq!(resolver.api_url, "http://localhost:11434/v1");
        assert_eq!(resolver.api_key, "ollama");
        assert_eq!(resolver.model_name, "gpt-4o-mini");
    }

    #[test]
    fn completions_url_trims_trailing_slash() {
        let resolver = LlmResolver::new("https://api.openai.com/v1/", "k", "m");
        assert_eq!(
            resolver.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn loads_resolver_table_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[resolver]\napi_url = \"http://gpu-box:8000/v1\"\napi_key = \"\"\nmodel_name = \"qwen2.5-coder\""
        )
        .unwrap();

        let resolver = LlmResolver::load_from_toml(file.path()).unwrap();
        assert_eq!(resolver.api_url, "http://gpu-box:8000/v1");
        assert!(resolver.api_key.is_empty());
        assert_eq!(resolver.model_name, "qwen2.5-coder");
    }

    #[test]
    fn unreadable_toml_is_config_error() {
        let err = LlmResolver::load_from_toml("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ServiceError::Config(_)));
    }
}

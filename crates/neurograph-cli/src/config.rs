//! CLI configuration management.
//!
//! Values come from the JSON config file, then `.env`, then environment
//! variables; later sources win.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use neurograph_llm::LlmResolver;
use neurograph_session::SessionConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application-wide configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the OpenAI-compatible endpoint.
    pub api_url: Option<String>,

    /// Bearer token for the endpoint.
    pub api_key: Option<String>,

    /// Model identifier.
    pub model_name: Option<String>,

    /// TOML file with a `[resolver]` table; overrides the three fields above.
    pub resolver_file: Option<PathBuf>,

    /// Upper bound on one model call, in seconds.
    pub request_timeout_secs: u64,

    /// Address `ngw serve` binds to.
    pub host: String,

    /// Port `ngw serve` listens on.
    pub port: u16,

    /// Largest accepted uploaded file, in KB.
    pub max_upload_kb: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            model_name: None,
            resolver_file: None,
            request_timeout_secs: 60,
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_upload_kb: 512,
        }
    }
}

impl Config {
    /// Load configuration from the config file and environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present (silently ignore if missing)
        let _ = dotenvy::dotenv();

        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config from {}", path.display()))?;
                serde_json::from_str(&contents).with_context(|| "Failed to parse config file")?
            }
            _ => Self::default(),
        };

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Some(url) = env_value(&["NEUROGRAPH_LLM_API_URL", "OPENAI_API_URL"]) {
            self.api_url = Some(url);
        }
        if let Some(key) = env_value(&["NEUROGRAPH_LLM_API_KEY", "OPENAI_API_KEY"]) {
            self.api_key = Some(key);
        }
        if let Some(model) = env_value(&["NEUROGRAPH_LLM_MODEL", "OPENAI_MODEL_NAME"]) {
            self.model_name = Some(model);
        }
        if let Some(file) = env_value(&["NEUROGRAPH_RESOLVER_FILE"]) {
            self.resolver_file = Some(PathBuf::from(file));
        }
        if let Some(secs) = env_value(&["NEUROGRAPH_TIMEOUT_SECS"]) {
            self.request_timeout_secs =
                parse_env("NEUROGRAPH_TIMEOUT_SECS", &secs, self.request_timeout_secs);
        }
        if let Some(host) = env_value(&["NEUROGRAPH_HOST"]) {
            self.host = host;
        }
        if let Some(port) = env_value(&["NEUROGRAPH_PORT"]) {
            self.port = parse_env("NEUROGRAPH_PORT", &port, self.port);
        }
        if let Some(kb) = env_value(&["NEUROGRAPH_MAX_UPLOAD_KB"]) {
            self.max_upload_kb = parse_env("NEUROGRAPH_MAX_UPLOAD_KB", &kb, self.max_upload_kb);
        }
    }

    /// Save current configuration to the config file.
    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::config_file_path() {
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
            let contents = serde_json::to_string_pretty(self)?;
            std::fs::write(&config_path, contents)
                .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
        }
        Ok(())
    }

    /// Get the path to the config file.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "neurograph", "ngw")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Endpoint to talk to.
    pub fn resolver(&self) -> Result<LlmResolver> {
        match &self.resolver_file {
            Some(path) => LlmResolver::load_from_toml(path)
                .with_context(|| format!("Failed to load resolver from {}", path.display())),
            None => Ok(LlmResolver::from_parts(
                self.api_url.clone(),
                self.api_key.clone(),
                self.model_name.clone(),
            )),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Session tunables derived from this configuration.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            request_timeout: self.request_timeout(),
            max_upload_bytes: self.max_upload_kb.saturating_mul(1024),
            ..SessionConfig::default()
        }
    }
}

/// First non-empty variable among `names`.
fn env_value(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Parse `raw`, keeping `current` when it is not a valid value.
fn parse_env<T: FromStr>(name: &str, raw: &str, current: T) -> T {
    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(var = name, value = raw, "ignoring_unparseable_config_value");
            current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{"port": 8080}"#).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.request_timeout_secs, 60);
    }

    #[test]
    fn resolver_falls_back_to_ollama() {
        let config = Config {
            model_name: Some("qwen2.5-coder".into()),
            ..Config::default()
        };
        let resolver = config.resolver().unwrap();
        assert_eq!(resolver.model_name, "qwen2.5-coder");
        assert!(resolver.api_url.contains("11434"));
    }

    #[test]
    fn session_config_converts_units() {
        let config = Config {
            request_timeout_secs: 5,
            max_upload_kb: 2,
            ..Config::default()
        };
        let session = config.session_config();
        assert_eq!(session.request_timeout, Duration::from_secs(5));
        assert_eq!(session.max_upload_bytes, 2048);
    }

    #[test]
    fn huge_upload_limit_saturates() {
        let config = Config {
            max_upload_kb: u64::MAX,
            ..Config::default()
        };
        assert_eq!(config.session_config().max_upload_bytes, u64::MAX);
    }

    #[test]
    fn unparseable_env_value_keeps_current() {
        assert_eq!(parse_env("NEUROGRAPH_PORT", "80OO", 3000u16), 3000);
        assert_eq!(parse_env("NEUROGRAPH_PORT", "70000", 3000u16), 3000);
        assert_eq!(parse_env("NEUROGRAPH_PORT", "8080", 3000u16), 8080);
    }
}

//! Config command implementation.

use std::path::PathBuf;

use anyhow::Result;

use crate::config::Config;

const KEYS: &str = "api-url, api-key, model, resolver-file, timeout, host, port, max-upload-kb";

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}...")
}

fn or_unset(value: Option<String>) -> String {
    value.unwrap_or_else(|| "(not set)".to_string())
}

/// Show current configuration.
pub fn show(config: &Config) -> Result<()> {
    println!("NeuroGraph CLI Configuration");
    println!("{:-<40}", "");

    println!("API URL:          {}", or_unset(config.api_url.clone()));
    println!(
        "API Key:          {}",
        or_unset(config.api_key.as_deref().map(mask))
    );
    println!("Model:            {}", or_unset(config.model_name.clone()));
    println!(
        "Resolver File:    {}",
        or_unset(config.resolver_file.as_ref().map(|p| p.display().to_string()))
    );
    println!("Request Timeout:  {} s", config.request_timeout_secs);
    println!("Listen:           {}:{}", config.host, config.port);
    println!("Max Upload Size:  {} KB", config.max_upload_kb);

    if let Some(config_path) = Config::config_file_path() {
        println!("\nConfig file: {}", config_path.display());
    }

    Ok(())
}

/// Set a configuration value.
pub fn set(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "api-url" | "url" => config.api_url = Some(value.to_string()),
        "api-key" | "key" => {
            config.api_key = Some(value.to_string());
            println!("⚠️  Key stored in config file. Prefer NEUROGRAPH_LLM_API_KEY.");
        }
        "model" | "model-name" => config.model_name = Some(value.to_string()),
        "resolver-file" => config.resolver_file = Some(PathBuf::from(value)),
        "timeout" | "request-timeout" => config.request_timeout_secs = value.parse()?,
        "host" => config.host = value.to_string(),
        "port" => config.port = value.parse()?,
        "max-upload-kb" | "max-upload" => config.max_upload_kb = value.parse()?,
        _ => {
            anyhow::bail!("Unknown config key: {}. Valid keys: {}", key, KEYS);
        }
    }

    config.save()?;
    println!("Set {}", key);
    Ok(())
}

/// Get a configuration value.
pub fn get(config: &Config, key: &str) -> Result<()> {
    let value = match key {
        "api-url" | "url" => or_unset(config.api_url.clone()),
        "api-key" | "key" => or_unset(config.api_key.as_deref().map(mask)),
        "model" | "model-name" => or_unset(config.model_name.clone()),
        "resolver-file" => or_unset(config.resolver_file.as_ref().map(|p| p.display().to_string())),
        "timeout" | "request-timeout" => config.request_timeout_secs.to_string(),
        "host" => config.host.clone(),
        "port" => config.port.to_string(),
        "max-upload-kb" | "max-upload" => config.max_upload_kb.to_string(),
        _ => {
            anyhow::bail!("Unknown config key: {}. Valid keys: {}", key, KEYS);
        }
    };

    println!("{}", value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn reset() -> Result<()> {
    Config::default().save()?;
    println!("Configuration reset to defaults");
    Ok(())
}

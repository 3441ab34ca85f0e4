//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! section has defaults, so an empty file is a valid configuration.
//! API keys never live in the config itself: it only names the environment
//! variable (and optional file) they are read from.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

use crate::prompt::Region;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub advisor: AdvisorConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdvisorConfig {
    #[serde(default = "default_advisor_name")]
    pub name: String,
    #[serde(flatten)]
    pub region: Region,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            name: default_advisor_name(),
            region: Region::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CredentialsConfig {
    /// Environment variable holding a comma-separated key list.
    #[serde(default = "default_keys_env")]
    pub keys_env: String,
    /// Optional file with one key per line.
    #[serde(default)]
    pub keys_file: Option<String>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            keys_env: default_keys_env(),
            keys_file: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_advisor_name() -> String {
    "Real Estate Advisor".to_string()
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_model() -> String {
    crate::llm::gemini::DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    crate::llm::gemini::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_keys_env() -> String {
    "GEMINI_API_KEYS".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg = AppConfig::parse("").unwrap();
        assert_eq!(cfg.llm.provider, "gemini");
        assert_eq!(cfg.llm.model, "gemini-1.5-flash");
        assert_eq!(cfg.credentials.keys_env, "GEMINI_API_KEYS");
        assert!(cfg.credentials.keys_file.is_none());
        assert_eq!(cfg.advisor.region.country, "India");
        assert_eq!(cfg.advisor.region.currency_symbol, "₹");
        assert_eq!(cfg.server.port, 8501);
    }

    #[test]
    fn test_partial_sections() {
        let cfg = AppConfig::parse(
            r#"
            [advisor]
            name = "Advisor Test"
            country = "Kenya"
            currency_symbol = "KSh"

            [llm]
            model = "gemini-2.0-flash"
            timeout_secs = 15

            [credentials]
            keys_env = "MY_KEYS"
            keys_file = "keys.txt"

            [server]
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(cfg.advisor.name, "Advisor Test");
        assert_eq!(cfg.advisor.region.country, "Kenya");
        assert_eq!(cfg.llm.model, "gemini-2.0-flash");
        assert_eq!(cfg.llm.timeout_secs, 15);
        assert_eq!(cfg.llm.max_output_tokens, 2048);
        assert_eq!(cfg.credentials.keys_env, "MY_KEYS");
        assert_eq!(cfg.credentials.keys_file.as_deref(), Some("keys.txt"));
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 9000);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(AppConfig::parse("[llm\nmodel = ").is_err());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(AppConfig::load("/nonexistent/advisor/config.toml").is_err());
    }

    #[test]
    fn test_load_repository_config() {
        // Requires config.toml in the working directory; skipped otherwise.
        if let Ok(cfg) = AppConfig::load("config.toml") {
            assert_eq!(cfg.llm.provider, "gemini");
            assert!(cfg.llm.timeout_secs > 0);
        }
    }
}

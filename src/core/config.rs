//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::models::{Credentials, ProviderId};

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    pub provider: ProviderId,
    pub api_key: String,
    /// Overrides the provider's default host
    pub base_url: Option<String>,
    /// Width of the batch worker pool
    pub max_concurrent: usize,
    /// Wait between two job status checks
    pub poll_interval_ms: u64,
    /// Per HTTP request timeout
    pub timeout_ms: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            provider: ProviderId::DEEPL,
            api_key: std::env::var("DEEPL_API_KEY").unwrap_or_default(),
            base_url: None,
            max_concurrent: 4,
            poll_interval_ms: 1000,
            timeout_ms: 30000,
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("DEEPL_API_KEY")
            .map_err(|_| anyhow::anyhow!("DEEPL_API_KEY environment variable is required"))?;

        let provider = std::env::var("SUBLATE_PROVIDER")
            .unwrap_or_else(|_| ProviderId::DEEPL.to_string())
            .parse::<ProviderId>()?;

        let base_url = std::env::var("SUBLATE_BASE_URL").ok().filter(|u| !u.is_empty());

        let max_concurrent = std::env::var("MAX_CONCURRENT")
            .unwrap_or_else(|_| "4".to_string())
            .parse::<usize>()?;

        let poll_interval_ms = std::env::var("POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse::<u64>()?;

        let timeout_ms = std::env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".to_string())
            .parse::<u64>()?;

        let config = Self {
            provider,
            api_key,
            base_url,
            max_concurrent,
            poll_interval_ms,
            timeout_ms,
        };

        info!("Loaded configuration for provider {}", config.provider);
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.is_empty() {
            return Err(anyhow::anyhow!("API key is required"));
        }

        if self.provider.as_str().is_empty() {
            return Err(anyhow::anyhow!("provider is required"));
        }

        if self.max_concurrent == 0 {
            return Err(anyhow::anyhow!("max_concurrent must be greater than 0"));
        }

        if self.poll_interval_ms == 0 {
            warn!("poll_interval_ms is 0, job status will be polled without pause");
        }

        Ok(())
    }

    /// Credentials handed to the provider factory
    pub fn credentials(&self) -> Credentials {
        Credentials {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            timeout: (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = TranslatorConfig {
            api_key: "test_key".to_string(),
            ..Default::default()
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_missing_key() {
        let config = TranslatorConfig {
            api_key: "".to_string(),
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_concurrency() {
        let config = TranslatorConfig {
            api_key: "test_key".to_string(),
            max_concurrent: 0,
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_file_roundtrip_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sublate.json");
        std::fs::write(&path, r#"{"api_key": "abc:fx", "poll_interval_ms": 50}"#).unwrap();

        let config = TranslatorConfig::from_file(&path).unwrap();
        assert_eq!(config.api_key, "abc:fx");
        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.provider, ProviderId::DEEPL);
        assert_eq!(config.max_concurrent, 4);

        let out = dir.path().join("saved.json");
        config.to_file(&out).unwrap();
        let reloaded = TranslatorConfig::from_file(&out).unwrap();
        assert_eq!(reloaded.credentials(), config.credentials());
    }

    #[test]
    fn test_credentials_carry_request_timeout() {
        let config = TranslatorConfig {
            api_key: "abc".to_string(),
            timeout_ms: 1500,
            ..Default::default()
        };
        assert_eq!(config.credentials().timeout, Some(Duration::from_millis(1500)));

        let config = TranslatorConfig {
            timeout_ms: 0,
            ..config
        };
        assert_eq!(config.credentials().timeout, None);
    }
}

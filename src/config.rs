//! Runtime configuration.
//!
//! Configuration is read from an optional YAML file. Every field has a
//! default, so a partial file (or no file at all) is valid. Credentials are
//! never read from the file; they come from the environment via the CLI.
//!
//! ```yaml
//! http:
//!   timeout_secs: 10
//! limits:
//!   per_category_fanout: 3
//! placeholders: false
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};

/// HTTP settings for the [`crate::fetcher::Fetcher`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub referer: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".to_string(),
            accept_language: "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
            referer: "https://www.naver.com".to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Upstream origins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Origin of section listing pages and relative article links.
    pub listing_base: String,
    /// Origin of the HTML search results page.
    pub search_page_base: String,
    /// Origin of the structured search API.
    pub search_api_base: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            listing_base: "https://news.naver.com".to_string(),
            search_page_base: "https://search.naver.com".to_string(),
            search_api_base: "https://openapi.naver.com".to_string(),
        }
    }
}

/// Volume caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Items per category for a single-category listing.
    pub per_category: usize,
    /// Items per category when `ALL` fans out.
    pub per_category_fanout: usize,
    /// Default search result limit.
    pub search_results: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            per_category: 20,
            per_category_fanout: 5,
            search_results: 30,
        }
    }
}

/// Settings of the summarization collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub sources: SourcesConfig,
    pub limits: LimitsConfig,
    pub summarizer: SummarizerConfig,
    /// Substitute clearly-marked placeholder stubs when acquisition yields nothing.
    pub placeholders: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            sources: SourcesConfig::default(),
            limits: LimitsConfig::default(),
            summarizer: SummarizerConfig::default(),
            placeholders: true,
        }
    }
}

impl Config {
    /// Parse configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load configuration from `path`, or defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_string(),
                source,
            })?;
        let config = Self::from_yaml(&text)?;
        info!(path, "Loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.http.timeout(), Duration::from_secs(15));
        assert!(config.http.accept_language.starts_with("ko-KR"));
        assert_eq!(config.limits.per_category_fanout, 5);
        assert!(config.placeholders);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "http:\n  timeout_secs: 3\nplaceholders: false\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.http.timeout_secs, 3);
        assert_eq!(config.http.referer, "https://www.naver.com");
        assert!(!config.placeholders);
        assert_eq!(config.limits.per_category, 20);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        assert!(Config::from_yaml("http: [1, 2").is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_error() {
        let err = Config::load(Some("/definitely/not/here.yaml")).await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[tokio::test]
    async fn test_load_without_path_is_default() {
        assert_eq!(Config::load(None).await.unwrap(), Config::default());
    }
}

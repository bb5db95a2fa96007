//! Run context and aggregator configuration.
//!
//! The run context is read from environment variables once at process start;
//! the aggregator configuration is an optional JSON file merged over defaults.

use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Environment variable names consumed by the aggregator.
pub mod vars {
    pub const ENVIRONMENT: &str = "WESIGN_ENVIRONMENT";
    pub const BUILD_NUMBER: &str = "BUILD_NUMBER";
    pub const GIT_COMMIT: &str = "GIT_COMMIT";
    pub const QA_API_KEY: &str = "QA_INTELLIGENCE_API_KEY";
    pub const QA_URL: &str = "QA_INTELLIGENCE_URL";
}

/// Default values.
pub mod defaults {
    pub const ENVIRONMENT: &str = "dev";
    pub const PASS_THRESHOLD: f64 = 60.0;
    pub const QA_BASE_URL: &str = "http://localhost:8000";
    pub const QA_ENDPOINT: &str = "/api/test-runs";
    pub const QA_TIMEOUT_SECS: u64 = 30;

    /// Artifact globs used when the caller supplies none.
    pub const ARTIFACT_PATTERNS: &[&str] = &[
        "**/*.trx",
        "**/*newman*.html",
        "**/*playwright*.html",
        "**/playwright-report/**/*",
        "**/test-results/**/*",
        "**/screenshots/**/*",
        "**/videos/**/*",
        "**/*.har",
        "**/*.log",
    ];
}

/// External facts about the current run, captured once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Target environment name (e.g. dev, staging)
    pub environment: String,
    /// CI build number, if running under Jenkins
    pub build_number: Option<String>,
    /// Commit hash under test
    pub git_commit: Option<String>,
    /// Bearer token for QA Intelligence
    pub qa_api_key: Option<String>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            environment: defaults::ENVIRONMENT.to_string(),
            build_number: None,
            git_commit: None,
            qa_api_key: None,
        }
    }
}

impl RunContext {
    /// Load the run context from environment variables.
    ///
    /// Environment variables:
    /// - `WESIGN_ENVIRONMENT`: environment name (default: dev)
    /// - `BUILD_NUMBER`: Jenkins build number (optional)
    /// - `GIT_COMMIT`: commit hash (optional)
    /// - `QA_INTELLIGENCE_API_KEY`: bearer token for reporting (optional)
    pub fn from_env() -> Self {
        Self {
            environment: non_empty_var(vars::ENVIRONMENT)
                .unwrap_or_else(|| defaults::ENVIRONMENT.to_string()),
            build_number: non_empty_var(vars::BUILD_NUMBER),
            git_commit: non_empty_var(vars::GIT_COMMIT),
            qa_api_key: non_empty_var(vars::QA_API_KEY),
        }
    }

    /// Replace the environment name.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// QA Intelligence endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QaIntelligenceConfig {
    /// Service base URL
    pub base_url: String,
    /// Path the summary is posted to
    pub endpoint: String,
    /// Explicit token; wins over `QA_INTELLIGENCE_API_KEY`
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for QaIntelligenceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::QA_BASE_URL.to_string(),
            endpoint: defaults::QA_ENDPOINT.to_string(),
            api_key: None,
            timeout_secs: defaults::QA_TIMEOUT_SECS,
        }
    }
}

impl QaIntelligenceConfig {
    /// Full URL the summary is posted to.
    pub fn report_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        )
    }
}

/// Aggregator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Artifact glob patterns relative to the workspace
    pub patterns: Vec<String>,
    /// Minimum overall score for a passing run
    pub pass_threshold: f64,
    /// QA Intelligence reporting settings
    pub qa_intelligence: QaIntelligenceConfig,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            patterns: defaults::ARTIFACT_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            pass_threshold: defaults::PASS_THRESHOLD,
            qa_intelligence: QaIntelligenceConfig::default(),
        }
    }
}

impl AggregatorConfig {
    /// Load configuration, merging an optional JSON file over the defaults.
    ///
    /// `QA_INTELLIGENCE_URL` overrides the base URL when the file does not set one.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if config.qa_intelligence.base_url == defaults::QA_BASE_URL
            && let Some(url) = non_empty_var(vars::QA_URL)
        {
            config.qa_intelligence.base_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Unreadable(path.display().to_string(), e.to_string()))?;
        serde_json::from_str(&content)
            .map_err(|e| ConfigError::Malformed(path.display().to_string(), e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.pass_threshold) {
            return Err(ConfigError::InvalidValue(
                "pass_threshold must be between 0 and 100",
            ));
        }
        if self.qa_intelligence.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "qa_intelligence.timeout_secs must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {0}: {1}")]
    Unreadable(String, String),

    #[error("Malformed config file {0}: {1}")]
    Malformed(String, String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),
}

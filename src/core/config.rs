//! Configuration management

use serde::{Deserialize, Serialize};

/// Default base URL of the translation service
const DEFAULT_API_BASE: &str = "http://localhost:8000/translate";

/// Default per-request timeout in milliseconds
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default bound on nested-table recursion
pub const DEFAULT_MAX_TABLE_DEPTH: usize = 16;

/// Configuration for the translation client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Base URL of the translation service, without the direction segment
    pub api_base: String,
    /// Timeout applied to each translation request, in milliseconds
    pub timeout_ms: u64,
    /// Maximum nested-table depth accepted before a document is rejected
    pub max_table_depth: usize,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_base: std::env::var("TRANSLATE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_table_depth: DEFAULT_MAX_TABLE_DEPTH,
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base = std::env::var("TRANSLATE_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        let timeout_ms = std::env::var("REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_MS.to_string())
            .parse::<u64>()?;

        let max_table_depth = std::env::var("MAX_TABLE_DEPTH")
            .unwrap_or_else(|_| DEFAULT_MAX_TABLE_DEPTH.to_string())
            .parse::<usize>()?;

        Ok(Self {
            api_base,
            timeout_ms,
            max_table_depth,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_base.is_empty() {
            return Err(anyhow::anyhow!("Translation API base URL is required"));
        }

        if self.timeout_ms == 0 {
            return Err(anyhow::anyhow!("timeout_ms must be greater than 0"));
        }

        if self.max_table_depth == 0 {
            return Err(anyhow::anyhow!("max_table_depth must be greater than 0"));
        }

        Ok(())
    }
}

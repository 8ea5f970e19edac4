//! Runtime configuration: command-line flags with environment fallbacks.

use std::path::PathBuf;

use clap::Args;

use crate::llm::HttpTextGeneratorConfig;

pub const DEFAULT_AI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";

/// Where the database lives.
#[derive(Debug, Clone, Args)]
pub struct StorageArgs {
    /// SQLite database file (defaults to the platform data directory)
    #[arg(long = "database", env = "OKR_DATABASE_PATH", global = true)]
    pub database_path: Option<PathBuf>,
}

impl StorageArgs {
    pub fn open(&self) -> okr_core::Result<okr_core::Database> {
        let db = match &self.database_path {
            Some(path) => okr_core::Database::open(path)?,
            None => okr_core::Database::open_default()?,
        };
        db.migrate()?;
        Ok(db)
    }
}

/// Text-generation provider settings.
#[derive(Debug, Clone, Args)]
pub struct AiArgs {
    /// OpenAI-compatible chat completions endpoint
    #[arg(long = "ai-endpoint", env = "OKR_AI_ENDPOINT", default_value = DEFAULT_AI_ENDPOINT, global = true)]
    pub endpoint: String,

    /// API key for the provider (falls back to OPENAI_API_KEY)
    #[arg(long = "ai-api-key", env = "OKR_AI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[arg(long = "ai-model", env = "OKR_AI_MODEL", default_value = DEFAULT_AI_MODEL, global = true)]
    pub model: String,

    /// Request timeout in seconds
    #[arg(long = "ai-timeout", env = "OKR_AI_TIMEOUT_SECS", default_value_t = 60, global = true)]
    pub timeout_secs: u64,
}

impl AiArgs {
    pub fn generator_config(&self) -> HttpTextGeneratorConfig {
        let api_key = self
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty());

        HttpTextGeneratorConfig {
            endpoint: self.endpoint.clone(),
            api_key,
            model: self.model.clone(),
            timeout_secs: self.timeout_secs,
            ..HttpTextGeneratorConfig::default()
        }
    }
}

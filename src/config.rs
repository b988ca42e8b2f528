use serde::Deserialize;
use std::path::PathBuf;

use crate::protocol::Model;

// --- Internal constants ---

/// Default provider endpoint (Groq's OpenAI-compatible API).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";
/// Rotation threshold for the request timing log.
pub const REQUEST_LOG_MAX_SIZE_MB: u64 = 10;

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    /// Environment variable holding the API credential.
    pub api_key_env: String,
    /// Optional secondary credential source: a file whose contents are the key.
    pub api_key_file: Option<PathBuf>,
    /// Optional API base URL override for any OpenAI-compatible server.
    /// Requests go to {base_url}/v1/chat/completions (or
    /// {base_url}/chat/completions if base_url already ends in /v1).
    pub base_url: Option<String>,
    /// Model used for rephrase/grammar transforms.
    pub rephrase_model: Model,
    /// Model used for chat turns.
    pub chat_model: Model,
    pub timeout_ms: u64,
    /// Sampling temperature for transforms.
    pub temperature: f32,
    /// Sampling temperature for chat turns.
    pub chat_temperature: f32,
    /// Default number of variants per rephrase.
    pub variants: usize,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    /// Where to write the JSONL request timing log. Unset disables it.
    pub path: Option<PathBuf>,
}

// --- Defaults ---

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: "GROQ_API_KEY".into(),
            api_key_file: None,
            base_url: None,
            rephrase_model: Model::QwenQwq32b,
            chat_model: Model::DeepseekR1DistillLlama70b,
            timeout_ms: 30_000,
            temperature: 0.7,
            chat_temperature: 0.6,
            variants: 1,
        }
    }
}

// --- Methods ---

impl Config {
    pub fn load() -> Self {
        let config_path = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(|d| PathBuf::from(d).join("redraft").join("config.toml"))
            .or_else(|| dirs::config_dir().map(|d| d.join("redraft").join("config.toml")))
            .unwrap_or_else(|| PathBuf::from("~/.config/redraft/config.toml"));

        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("[redraft] Failed to parse {}: {e}", config_path.display());
                    }
                },
                Err(e) => {
                    eprintln!("[redraft] Failed to read {}: {e}", config_path.display());
                }
            }
        }

        Config::default()
    }
}

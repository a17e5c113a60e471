use clap::Parser;
use std::time::Duration;
use crate::credential::DEFAULT_CREDENTIAL_KEY;
use crate::session::SessionConfig;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Response Generator Args ---
    /// Response generator strategy (local, remote)
    #[arg(long, env = "GENERATOR_TYPE", default_value = "local")]
    pub generator: String,

    /// Artificial delay in milliseconds before the local generator answers.
    #[arg(long, env = "LOCAL_DELAY_MS", default_value = "1500")]
    pub local_delay_ms: u64,

    /// Give up on a remote generation after this many seconds. Unlimited when unset.
    #[arg(long, env = "GENERATION_TIMEOUT_SECS")]
    pub generation_timeout_secs: Option<u64>,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for the remote generator (gemini, openai)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "gemini")]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// Model name for chat completion (e.g., gemini-1.5-flash-latest, gpt-4o)
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    /// API key saved to the credential store at startup if none is stored yet.
    #[arg(long, env = "CHAT_API_KEY")]
    pub chat_api_key: Option<String>,

    // --- Credential Storage Args ---
    /// Where the API key is persisted (file, redis, memory)
    #[arg(long, env = "STORAGE_TYPE", default_value = "file")]
    pub storage_type: String,

    /// JSON file used by the file storage backend.
    #[arg(long, env = "STORAGE_PATH", default_value = ".market-mind/storage.json")]
    pub storage_path: String,

    /// Redis URL used by the redis storage backend.
    #[arg(long, env = "STORAGE_REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub storage_redis_url: String,

    /// Storage key the API key is kept under.
    #[arg(long, env = "CREDENTIAL_KEY", default_value = DEFAULT_CREDENTIAL_KEY)]
    pub credential_key: String,

    // --- General App Args ---
    /// Seconds an error banner stays visible.
    #[arg(long, env = "ERROR_DISPLAY_SECS", default_value = "5")]
    pub error_display_secs: u64,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

impl Args {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            error_display: Duration::from_secs(self.error_display_secs),
            generation_timeout: self.generation_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["market-mind"]);
        assert_eq!(args.generator, "local");
        assert_eq!(args.local_delay_ms, 1500);
        assert_eq!(args.chat_llm_type, "gemini");
        assert_eq!(args.storage_type, "file");
        assert_eq!(args.credential_key, DEFAULT_CREDENTIAL_KEY);

        let config = args.session_config();
        assert_eq!(config.error_display, Duration::from_secs(5));
        assert!(config.generation_timeout.is_none());
    }

    #[test]
    fn test_timeout_flag() {
        let args = Args::parse_from(["market-mind", "--generation-timeout-secs", "45"]);
        assert_eq!(args.session_config().generation_timeout, Some(Duration::from_secs(45)));
    }
}

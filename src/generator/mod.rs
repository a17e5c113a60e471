mod local;
mod remote;

pub use local::{ AnalysisCategory, LocalGenerator };
pub use remote::{ build_prompt, ClientFactory, RemoteGenerator };

use async_trait::async_trait;
use log::info;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use crate::cli::Args;
use crate::credential::Credential;
use crate::llm::{ LlmConfig, LlmType };

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("an API key is required before a response can be generated")]
    MissingCredential,
    #[error("generation failed: {0}")]
    GenerationFailure(String),
    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
}

/// Turns an accepted query into assistant markdown.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, query: &str, credential: &Credential) -> Result<String, GenerationError>;

    /// Whether sends must be gated on a stored credential.
    fn requires_credential(&self) -> bool;

    fn name(&self) -> &'static str;
}

pub fn create_generator(args: &Args) -> Result<Arc<dyn ResponseGenerator>, Box<dyn Error + Send + Sync>> {
    match args.generator.to_lowercase().as_str() {
        "local" => {
            let delay = Duration::from_millis(args.local_delay_ms);
            info!("Using local template generator (delay {:?})", delay);
            Ok(Arc::new(LocalGenerator::new(delay)))
        }
        "remote" => {
            let config = LlmConfig {
                llm_type: args.chat_llm_type
                    .parse::<LlmType>()
                    .map_err(|e| format!("Invalid chat LLM type: {}", e))?,
                api_key: None,
                completion_model: args.chat_model.clone(),
                base_url: args.chat_base_url.clone(),
            };
            info!(
                "Using remote generator: Type={}, Model={:?}, BaseURL={:?}",
                config.llm_type,
                config.completion_model.as_deref().unwrap_or("adapter default"),
                config.base_url.as_deref().unwrap_or("adapter default")
            );
            Ok(Arc::new(RemoteGenerator::new(config)))
        }
        other => Err(format!("Unsupported generator type: {}", other).into()),
    }
}

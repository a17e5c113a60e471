pub mod gemini;
pub mod openai;

use async_trait::async_trait;
use serde::Deserialize;
use std::error::Error as StdError;
use std::sync::Arc;
use super::{ LlmConfig, LlmType };
use self::gemini::GeminiChatClient;
use self::openai::OpenAIChatClient;

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Gemini => {
            let specific_client = GeminiChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::OpenAI => {
            let specific_client = OpenAIChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_requires_api_key() {
        for llm_type in [LlmType::Gemini, LlmType::OpenAI] {
            let config = LlmConfig { llm_type, ..LlmConfig::default() };
            let err = new_client(&config).err().expect("missing key must be rejected");
            assert!(err.to_string().contains("API key is required"));
        }
    }

    #[test]
    fn test_new_openai_client_uses_defaults() {
        let config = LlmConfig {
            llm_type: LlmType::OpenAI,
            api_key: Some("sk-test".to_string()),
            ..LlmConfig::default()
        };
        let client = new_client(&config).unwrap();
        assert_eq!(client.get_model(), "gpt-4o");
        assert_eq!(client.get_base_url().as_deref(), Some("https://api.openai.com"));
    }
}

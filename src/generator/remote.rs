use async_trait::async_trait;
use log::{ error, info };
use std::error::Error as StdError;
use std::sync::Arc;
use super::{ GenerationError, ResponseGenerator };
use crate::credential::Credential;
use crate::llm::LlmConfig;
use crate::llm::chat::{ new_client, ChatClient };

const ANALYST_PREFIX: &str =
    "You are a professional market research analyst. Provide a professional market analysis for the following query. Structure the answer with clear headings and bullet points, formatted in markdown.";

pub type ClientFactory = Arc<
    dyn (Fn(&LlmConfig) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>>) +
        Send +
        Sync
>;

pub fn build_prompt(query: &str) -> String {
    format!("{}\n\nQuery: {}", ANALYST_PREFIX, query)
}

/// Sends each query, wrapped in the analyst prefix, to a hosted model.
/// A fresh client is built per call so a newly submitted key takes effect
/// on the next turn.
pub struct RemoteGenerator {
    config: LlmConfig,
    factory: ClientFactory,
}

impl RemoteGenerator {
    pub fn new(config: LlmConfig) -> Self {
        let factory: ClientFactory = Arc::new(new_client);
        Self::with_factory(config, factory)
    }

    pub fn with_factory(config: LlmConfig, factory: ClientFactory) -> Self {
        Self { config, factory }
    }
}

#[async_trait]
impl ResponseGenerator for RemoteGenerator {
    async fn generate(&self, query: &str, credential: &Credential) -> Result<String, GenerationError> {
        if !credential.is_set() {
            return Err(GenerationError::MissingCredential);
        }

        let config = self.config.with_api_key(credential.value());
        let client = (self.factory)(&config).map_err(|e| {
            error!("Failed to build {} chat client: {}", config.llm_type, e);
            GenerationError::GenerationFailure(e.to_string())
        })?;

        info!("Requesting remote analysis from {} (model {})", config.llm_type, client.get_model());
        let resp = client
            .complete(&build_prompt(query)).await
            .map_err(|e| GenerationError::GenerationFailure(e.to_string()))?;

        let text = resp.response.trim();
        if text.is_empty() {
            return Err(GenerationError::GenerationFailure("provider returned an empty response".to_string()));
        }
        Ok(text.to_string())
    }

    fn requires_credential(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::chat::CompletionResponse;
    use std::sync::Mutex;
    use std::sync::atomic::{ AtomicUsize, Ordering };

    struct StubClient {
        reply: Result<String, String>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ChatClient for StubClient {
        async fn complete(
            &self,
            prompt: &str
        ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(CompletionResponse { response: text.clone() }),
                Err(msg) => Err(msg.clone().into()),
            }
        }

        fn get_model(&self) -> String {
            "stub".to_string()
        }

        fn get_base_url(&self) -> Option<String> {
            None
        }
    }

    struct Harness {
        generator: RemoteGenerator,
        builds: Arc<AtomicUsize>,
        keys: Arc<Mutex<Vec<Option<String>>>>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    fn harness(reply: Result<&str, &str>) -> Harness {
        let builds = Arc::new(AtomicUsize::new(0));
        let keys = Arc::new(Mutex::new(Vec::new()));
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let reply = reply.map(str::to_string).map_err(str::to_string);

        let (b, k, p) = (Arc::clone(&builds), Arc::clone(&keys), Arc::clone(&prompts));
        let factory: ClientFactory = Arc::new(move |
            config: &LlmConfig
        | -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
            b.fetch_add(1, Ordering::SeqCst);
            k.lock().unwrap().push(config.api_key.clone());
            let client: Arc<dyn ChatClient> = Arc::new(StubClient {
                reply: reply.clone(),
                prompts: Arc::clone(&p),
            });
            Ok(client)
        });

        Harness {
            generator: RemoteGenerator::with_factory(LlmConfig::default(), factory),
            builds,
            keys,
            prompts,
        }
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits() {
        let h = harness(Ok("unused"));
        let result = h.generator.generate("market size", &Credential::unset()).await;
        assert_eq!(result, Err(GenerationError::MissingCredential));
        assert_eq!(h.builds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_success_wraps_query_and_uses_key() {
        let h = harness(Ok("  # Report\n\nAll good  "));
        let text = h.generator.generate("EV market share", &Credential::new("abc")).await.unwrap();

        assert_eq!(text, "# Report\n\nAll good");
        assert_eq!(h.keys.lock().unwrap().as_slice(), &[Some("abc".to_string())]);
        let prompts = h.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with(ANALYST_PREFIX));
        assert!(prompts[0].ends_with("Query: EV market share"));
        assert!(prompts[0].contains("markdown"));
    }

    #[tokio::test]
    async fn test_provider_error_maps_to_failure() {
        let h = harness(Err("401 Unauthorized"));
        let result = h.generator.generate("market", &Credential::new("bad")).await;
        assert_eq!(result, Err(GenerationError::GenerationFailure("401 Unauthorized".to_string())));
        assert_eq!(h.builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_reply_is_a_failure() {
        let h = harness(Ok("   "));
        let result = h.generator.generate("market", &Credential::new("k")).await;
        assert!(matches!(result, Err(GenerationError::GenerationFailure(_))));
    }

    #[tokio::test]
    async fn test_factory_error_maps_to_failure() {
        let factory: ClientFactory = Arc::new(
            |_config: &LlmConfig| -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
                Err("no client".into())
            }
        );
        let generator = RemoteGenerator::with_factory(LlmConfig::default(), factory);
        let result = generator.generate("market", &Credential::new("k")).await;
        assert_eq!(result, Err(GenerationError::GenerationFailure("no client".to_string())));
    }
}

pub mod cli;
pub mod conversation;
pub mod credential;
pub mod generator;
pub mod llm;
pub mod models;
pub mod repl;
pub mod session;
pub mod storage;
pub mod validator;

use cli::Args;
use credential::CredentialStore;
use generator::create_generator;
use log::info;
use session::ChatSession;
use std::error::Error;
use storage::initialize_store;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Generator: {}", args.generator);
    if args.generator.eq_ignore_ascii_case("remote") {
        info!("Chat LLM Type: {}", args.chat_llm_type);
        info!("Chat Model: {}", args.chat_model.as_deref().unwrap_or("adapter default"));
        info!("Generation Timeout (s): {:?}", args.generation_timeout_secs);
    } else {
        info!("Local Delay (ms): {}", args.local_delay_ms);
    }
    info!("Storage Type: {}", args.storage_type);
    info!("Credential Key: {}", args.credential_key);
    info!("Error Display (s): {}", args.error_display_secs);
    info!("-------------------------");

    let backend = initialize_store(&args)?;
    let mut credentials = CredentialStore::load(backend, args.credential_key.clone()).await?;
    if let Some(key) = args.chat_api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        if !credentials.is_set() {
            credentials.submit(key).await?;
            info!("Seeded credential store from CHAT_API_KEY");
        }
    }

    let generator = create_generator(&args)?;
    let session = ChatSession::spawn(generator, credentials, args.session_config());
    repl::run_repl(session).await
}

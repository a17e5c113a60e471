use log::{ info, warn };
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use crate::storage::{ KeyValueStore, StorageError };

pub const DEFAULT_CREDENTIAL_KEY: &str = "market-mind:gemini-api-key";

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Please enter a valid API key")]
    Empty,
    #[error("credential storage failed: {0}")]
    Storage(#[from] StorageError),
}

/// Provider API key. `is_set` is flipped by explicit submit/clear, not derived.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    value: String,
    is_set: bool,
}

impl Credential {
    pub fn unset() -> Self {
        Self::default()
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into(), is_set: true }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_set(&self) -> bool {
        self.is_set
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("value", &format_args!("<{} chars redacted>", self.value.len()))
            .field("is_set", &self.is_set)
            .finish()
    }
}

/// Holds the single credential and mirrors it into a [`KeyValueStore`].
pub struct CredentialStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
    current: Credential,
}

impl CredentialStore {
    pub async fn load(
        backend: Arc<dyn KeyValueStore>,
        key: impl Into<String>
    ) -> Result<Self, CredentialError> {
        let key = key.into();
        let current = match backend.get(&key).await? {
            Some(value) if !value.is_empty() => {
                info!("Loaded stored credential ({} chars) from key '{}'", value.len(), key);
                Credential::new(value)
            }
            Some(_) => {
                warn!("Stored credential under '{}' is empty, treating as unset", key);
                Credential::unset()
            }
            None => {
                info!("No stored credential under '{}'", key);
                Credential::unset()
            }
        };
        Ok(Self { backend, key, current })
    }

    pub async fn submit(&mut self, text: &str) -> Result<(), CredentialError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CredentialError::Empty);
        }
        self.backend.set(&self.key, trimmed).await?;
        self.current = Credential::new(trimmed);
        info!("Credential saved ({} chars)", trimmed.len());
        Ok(())
    }

    pub async fn clear(&mut self) -> Result<(), CredentialError> {
        self.backend.remove(&self.key).await?;
        self.current = Credential::unset();
        info!("Credential cleared");
        Ok(())
    }

    pub fn current(&self) -> &Credential {
        &self.current
    }

    pub fn is_set(&self) -> bool {
        self.current.is_set()
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

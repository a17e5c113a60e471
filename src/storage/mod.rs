mod file;
mod memory;
mod redis;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use self::redis::RedisStore;

use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use thiserror::Error;
use crate::cli::Args;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("redis storage error: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("unsupported storage type: {0}")]
    UnsupportedBackend(String),
}

/// Small string key-value store, the stand-in for browser local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

pub fn create_store(args: &Args) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    match args.storage_type.to_lowercase().as_str() {
        "file" => Ok(Arc::new(FileStore::new(&args.storage_path))),
        "redis" => Ok(Arc::new(RedisStore::new(&args.storage_redis_url)?)),
        "memory" => Ok(Arc::new(MemoryStore::new())),
        other => Err(StorageError::UnsupportedBackend(other.to_string())),
    }
}

pub fn initialize_store(args: &Args) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    let location = match args.storage_type.to_lowercase().as_str() {
        "file" => args.storage_path.as_str(),
        "redis" => args.storage_redis_url.as_str(),
        _ => "process memory",
    };
    info!("Credential will be stored in: {} at {}", args.storage_type, location);
    create_store(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn test_create_memory_store() {
        let args = Args::parse_from(["market-mind", "--storage-type", "memory"]);
        let store = create_store(&args).unwrap();
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_unknown_storage_type() {
        let args = Args::parse_from(["market-mind", "--storage-type", "sqlite"]);
        match create_store(&args) {
            Err(StorageError::UnsupportedBackend(name)) => assert_eq!(name, "sqlite"),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected an error"),
        }
    }
}

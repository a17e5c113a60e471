use async_trait::async_trait;
use redis::{ AsyncCommands, Client };
use super::{ KeyValueStore, StorageError };

pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    pub fn new(url: &str) -> Result<Self, StorageError> {
        Ok(Self {
            client: Client::open(url)?,
        })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.get_connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut conn = self.get_connection().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut conn = self.get_connection().await?;
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_url() {
        assert!(matches!(RedisStore::new("not a url"), Err(StorageError::Redis(_))));
    }

    #[test]
    fn test_open_does_not_connect() {
        assert!(RedisStore::new("redis://127.0.0.1:6379").is_ok());
    }
}

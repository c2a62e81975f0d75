use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{error::StoreError, types::TokenRecord};

/// Keyed storage for token records, one record per Spotify user id.
///
/// Implementations must make `compare_and_swap` atomic with respect to
/// `put` and other swaps on the same key.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<TokenRecord>, StoreError>;

    /// Stores `record`, replacing any previous record for `user_id`.
    async fn put(&self, user_id: &str, record: TokenRecord) -> Result<(), StoreError>;

    /// Replaces the record for `user_id` only if it still equals `expected`.
    ///
    /// Returns `false` without writing when the current record differs or
    /// is absent.
    async fn compare_and_swap(
        &self,
        user_id: &str,
        expected: &TokenRecord,
        record: TokenRecord,
    ) -> Result<bool, StoreError>;
}

/// Process-memory token store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    records: RwLock<HashMap<String, TokenRecord>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, user_id: &str) -> Result<Option<TokenRecord>, StoreError> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn put(&self, user_id: &str, record: TokenRecord) -> Result<(), StoreError> {
        self.records.write().await.insert(user_id.to_string(), record);
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        user_id: &str,
        expected: &TokenRecord,
        record: TokenRecord,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(user_id) {
            Some(current) if current == expected => {
                *current = record;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

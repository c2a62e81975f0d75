use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::Utc;
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    management::TokenStore,
    spotify::SpotifyClient,
    types::{TokenRecord, UserProfile},
};

// One entry per user that ever refreshed. Records are never deleted, so the
// map is bounded by the number of connected users.
type RefreshLocks = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// Owns the token lifecycle: login completion, storage and refresh.
#[derive(Clone)]
pub struct TokenManager {
    store: Arc<dyn TokenStore>,
    spotify: SpotifyClient,
    refresh_locks: Arc<RefreshLocks>,
}

impl TokenManager {
    pub fn new(store: Arc<dyn TokenStore>, spotify: SpotifyClient) -> Self {
        TokenManager {
            store,
            spotify,
            refresh_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Completes a login: exchanges `code`, identifies the user and stores
    /// the new record, overwriting any previous one for that user.
    ///
    /// Nothing is written unless both the exchange and the profile fetch
    /// succeed.
    pub async fn authorize(&self, code: &str) -> Result<UserProfile> {
        let token = self.spotify.exchange_code(code).await?;
        let now = Utc::now();
        let profile = self.spotify.current_user(&token.access_token).await?;
        let record = TokenRecord::from_exchange(token, now)?;

        self.store.put(&profile.id, record).await?;
        info!(user_id = %profile.id, "spotify account connected");

        Ok(profile)
    }

    /// Returns a usable access token for `user_id`, refreshing it first if
    /// it has expired.
    ///
    /// Concurrent callers for the same user share one refresh: the first one
    /// contacts Spotify, the others wait and pick up the stored result.
    pub async fn get_valid_token(&self, user_id: &str) -> Result<String> {
        let record = self.load(user_id).await?;
        if record.is_valid_at(Utc::now()) {
            return Ok(record.access_token);
        }

        let lock = self.refresh_lock(user_id);
        let _guard = lock.lock().await;

        // Another caller may have refreshed while we waited.
        let record = self.load(user_id).await?;
        if record.is_valid_at(Utc::now()) {
            return Ok(record.access_token);
        }

        let token = self.spotify.refresh_token(&record.refresh_token).await?;
        let updated = record.refreshed(token, Utc::now())?;

        if self
            .store
            .compare_and_swap(user_id, &record, updated.clone())
            .await?
        {
            debug!(user_id, expires_at = %updated.expires_at, "access token refreshed");
        } else {
            debug!(user_id, "record replaced during refresh; keeping newer record");
        }

        Ok(updated.access_token)
    }

    async fn load(&self, user_id: &str) -> Result<TokenRecord> {
        self.store
            .get(user_id)
            .await?
            .ok_or_else(|| Error::UnknownUser(user_id.to_string()))
    }

    fn refresh_lock(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .refresh_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(locks.entry(user_id.to_string()).or_default())
    }
}

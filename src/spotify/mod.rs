//! # Spotify Integration Module
//!
//! Outbound calls to the Spotify accounts service and Web API. All calls go
//! through [`SpotifyClient`], which owns a pooled `reqwest::Client` and the
//! shared [`Config`] that names the endpoints and client credentials.
//!
//! ## Calls
//!
//! ### Accounts service
//! - [`SpotifyClient::authorize_url`] - authorization redirect target
//! - [`SpotifyClient::exchange_code`] - `POST /api/token` with `grant_type=authorization_code`
//! - [`SpotifyClient::refresh_token`] - `POST /api/token` with `grant_type=refresh_token`
//!
//! ### Web API
//! - [`SpotifyClient::current_user`] - `GET /me`
//! - [`SpotifyClient::top_items`] - `GET /me/top/{type}`
//!
//! ## Errors
//!
//! Transport failures surface as [`SpotifyError::Http`]. Any non-2xx
//! response is turned into [`SpotifyError::Status`] carrying the status and
//! the raw body, so callers can log provider details without exposing them.
//!
//! No retries and no timeouts beyond the `reqwest` defaults.

use std::sync::Arc;

use reqwest::{Client, Response};

use crate::{config::Config, error::SpotifyError};

pub mod auth;
pub mod profile;
pub mod top;

#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    config: Arc<Config>,
}

impl SpotifyClient {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Passes successful responses through and converts the rest into
/// [`SpotifyError::Status`].
async fn ensure_success(res: Response) -> Result<Response, SpotifyError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await.unwrap_or_default();
    Err(SpotifyError::Status { status, body })
}

//! Configuration management for the sporltop service.
//!
//! Configuration is read once at startup into a [`Config`] value that is
//! shared with the request handlers through the application state. Values
//! come from, in order of priority:
//! 1. Process environment variables
//! 2. A `.env` file in the current working directory
//! 3. A `.env` file in the local data directory (`sporltop/.env`)
//! 4. Built-in defaults (where applicable)

use std::{env, path::PathBuf};

use reqwest::Url;

/// Default listen port when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 8080;

/// Scopes requested during authorization: top items and the account email.
pub const DEFAULT_SCOPE: &str = "user-top-read user-read-email";

pub const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("cannot load environment: {0}")]
    Env(String),
}

/// Runtime configuration of the service.
///
/// Built once by [`Config::from_env`] and passed by reference (behind an
/// `Arc`) into the handler layer.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP listener binds to.
    pub port: u16,
    /// Public base URL of this service.
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Redirect URI; must exactly match the one registered with Spotify.
    pub redirect_uri: String,
    /// Space-delimited list of requested scopes.
    pub scope: String,
    pub auth_url: Url,
    pub token_url: String,
    /// Web API base without a trailing slash.
    pub api_url: String,
}

impl Config {
    /// Creates a configuration against the public Spotify endpoints.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            port: DEFAULT_PORT,
            base_url: default_base_url(DEFAULT_PORT),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scope: DEFAULT_SCOPE.to_string(),
            auth_url: Url::parse(SPOTIFY_AUTH_URL).expect("default authorize URL is valid"),
            token_url: SPOTIFY_TOKEN_URL.to_string(),
            api_url: SPOTIFY_API_URL.to_string(),
        }
    }

    /// Points all provider endpoints at `accounts_base` and `api_base`.
    ///
    /// The authorize and token endpoints become `{accounts_base}/authorize`
    /// and `{accounts_base}/api/token`, mirroring the Spotify layout.
    pub fn with_endpoints(
        mut self,
        accounts_base: &str,
        api_base: &str,
    ) -> Result<Self, ConfigError> {
        let accounts_base = accounts_base.trim_end_matches('/');
        self.auth_url = parse_url("SPOTIFY_AUTH_URL", &format!("{accounts_base}/authorize"))?;
        self.token_url = format!("{accounts_base}/api/token");
        self.api_url = api_base.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when a required variable is absent
    /// and [`ConfigError::Invalid`] when a value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let auth_url = parse_url(
            "SPOTIFY_AUTH_URL",
            &get("SPOTIFY_AUTH_URL").unwrap_or_else(|| SPOTIFY_AUTH_URL.to_string()),
        )?;

        Ok(Self {
            port,
            base_url: get("BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| default_base_url(port)),
            client_id: required("SPOTIFY_CLIENT_ID")?,
            client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            redirect_uri: required("SPOTIFY_REDIRECT_URI")?,
            scope: get("SPOTIFY_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            auth_url,
            token_url: get("SPOTIFY_TOKEN_URL").unwrap_or_else(|| SPOTIFY_TOKEN_URL.to_string()),
            api_url: get("SPOTIFY_API_URL")
                .unwrap_or_else(|| SPOTIFY_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// Address the HTTP listener binds to.
    pub fn server_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// URL of the login endpoint on this service.
    pub fn login_url(&self) -> String {
        format!("{}/auth/login", self.base_url)
    }
}

fn default_base_url(port: u16) -> String {
    format!("http://localhost:{port}")
}

fn parse_url(name: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

/// Loads environment variables from `.env` files.
///
/// A `.env` in the working directory is loaded first, then the one in the
/// platform-specific local data directory:
/// - Linux: `~/.local/share/sporltop/.env`
/// - macOS: `~/Library/Application Support/sporltop/.env`
/// - Windows: `%LOCALAPPDATA%/sporltop/.env`
///
/// Missing files are not an error; variables already present in the
/// environment are never overwritten.
///
/// # Errors
///
/// Fails if the data directory cannot be created or a present `.env` file
/// cannot be parsed.
pub async fn load_env() -> Result<(), ConfigError> {
    let local = PathBuf::from(".env");
    if local.is_file() {
        dotenv::from_path(&local).map_err(|e| ConfigError::Env(e.to_string()))?;
    }

    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sporltop/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| ConfigError::Env(e.to_string()))?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| ConfigError::Env(e.to_string()))?;
    }

    Ok(())
}

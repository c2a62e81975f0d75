//! Error types shared across the service.

use reqwest::StatusCode;

/// Failure talking to the Spotify accounts service or Web API.
#[derive(Debug, thiserror::Error)]
pub enum SpotifyError {
    #[error("request to spotify failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("spotify responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("spotify response is missing `{0}`")]
    MissingField(&'static str),
    #[error("spotify response has an out-of-range `{0}`")]
    InvalidField(&'static str),
}

/// Failure of a token storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("token store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The `state` query parameter does not match the `spotify_state` cookie.
    #[error("state mismatch")]
    StateMismatch,
    #[error("authorization code missing from callback")]
    MissingCode,
    /// Spotify redirected back with an `error` parameter.
    #[error("authorization denied by provider: {0}")]
    AuthorizationDenied(String),
    #[error("unknown user: {0}")]
    UnknownUser(String),
    #[error("upstream exchange failed: {0}")]
    UpstreamExchangeFailure(#[from] SpotifyError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    InvalidQuery(String),
}

pub type Result<T> = std::result::Result<T, Error>;

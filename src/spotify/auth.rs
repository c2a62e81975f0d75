use reqwest::Url;

use crate::{error::SpotifyError, types::TokenResponse};

use super::{SpotifyClient, ensure_success};

impl SpotifyClient {
    /// Builds the Spotify authorization URL the login endpoint redirects to.
    ///
    /// # Query Parameters
    ///
    /// - `response_type=code`
    /// - `client_id` - configured client id
    /// - `scope` - space-delimited scope list
    /// - `redirect_uri` - configured redirect URI
    /// - `state` - the anti-forgery value also stored in the state cookie
    pub fn authorize_url(&self, state: &str) -> Url {
        let config = self.config();
        let mut url = config.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &config.client_id)
            .append_pair("scope", &config.scope)
            .append_pair("redirect_uri", &config.redirect_uri)
            .append_pair("state", state);
        url
    }

    /// Exchanges an authorization code for an access/refresh token pair.
    ///
    /// Posts a form to the token endpoint with `grant_type=authorization_code`,
    /// the code, the redirect URI and the client credentials.
    ///
    /// # Errors
    ///
    /// - [`SpotifyError::Http`] on transport or decoding failures
    /// - [`SpotifyError::Status`] when Spotify rejects the exchange, e.g. an
    ///   expired or already used code, or a redirect URI mismatch
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, SpotifyError> {
        let config = self.config();
        self.post_token_form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &config.redirect_uri),
            ("client_id", &config.client_id),
            ("client_secret", &config.client_secret),
        ])
        .await
    }

    /// Mints a new access token from a refresh token.
    ///
    /// The response may or may not carry a rotated refresh token.
    ///
    /// # Errors
    ///
    /// Same as [`SpotifyClient::exchange_code`]; a revoked refresh token
    /// shows up as [`SpotifyError::Status`] with `invalid_grant` in the body.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, SpotifyError> {
        let config = self.config();
        self.post_token_form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", &config.client_id),
            ("client_secret", &config.client_secret),
        ])
        .await
    }

    async fn post_token_form(&self, form: &[(&str, &str)]) -> Result<TokenResponse, SpotifyError> {
        let res = self
            .http
            .post(&self.config().token_url)
            .form(form)
            .send()
            .await?;

        let token = ensure_success(res).await?.json::<TokenResponse>().await?;
        if token.access_token.is_empty() {
            return Err(SpotifyError::MissingField("access_token"));
        }

        Ok(token)
    }
}

use crate::{error::SpotifyError, types::UserProfile};

use super::{SpotifyClient, ensure_success};

impl SpotifyClient {
    /// Fetches the profile of the user owning `token` (`GET /me`).
    ///
    /// The returned `id` is the stable Spotify user id used as the token
    /// store key.
    pub async fn current_user(&self, token: &str) -> Result<UserProfile, SpotifyError> {
        let res = self
            .http
            .get(format!("{}/me", self.config().api_url))
            .bearer_auth(token)
            .send()
            .await?;

        let profile = ensure_success(res).await?.json::<UserProfile>().await?;
        if profile.id.is_empty() {
            return Err(SpotifyError::MissingField("id"));
        }

        Ok(profile)
    }
}

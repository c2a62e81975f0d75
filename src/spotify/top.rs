use serde_json::Value;

use crate::{error::SpotifyError, types::TopItemsQuery};

use super::{SpotifyClient, ensure_success};

impl SpotifyClient {
    /// Retrieves the user's top tracks or artists (`GET /me/top/{type}`).
    ///
    /// `time_range` and `limit` are forwarded as given. The payload is
    /// returned as raw JSON so the proxy can hand it back unmodified.
    pub async fn top_items(&self, token: &str, query: &TopItemsQuery) -> Result<Value, SpotifyError> {
        let url = format!("{}/me/top/{}", self.config().api_url, query.item_type);
        let res = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[
                ("time_range", query.time_range.to_string()),
                ("limit", query.limit.clone()),
            ])
            .send()
            .await?;

        Ok(ensure_success(res).await?.json::<Value>().await?)
    }
}

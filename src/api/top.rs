use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    server::AppState,
    types::TopItemsQuery,
};

#[derive(Debug, Default, Deserialize)]
pub struct TopParams {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub time_range: Option<String>,
    pub limit: Option<String>,
}

/// Proxies `GET /me/top/{type}` for a connected user.
///
/// Returns Spotify's payload unmodified. Any failure is a `400` with an
/// `{"error": ...}` body.
pub async fn top(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<TopParams>,
) -> Response {
    match fetch_top(&state, &user_id, &params).await {
        Ok(payload) => Json(payload).into_response(),
        Err(e) => {
            let message = match &e {
                Error::InvalidQuery(msg) => {
                    debug!(user_id = %user_id, error = %e, "top items query rejected");
                    msg.clone()
                }
                Error::UnknownUser(_) => {
                    info!(user_id = %user_id, "top items requested for unknown user");
                    "Unknown user".to_string()
                }
                _ => {
                    warn!(user_id = %user_id, error = %e, "top items request failed");
                    "Upstream request failed".to_string()
                }
            };
            (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
        }
    }
}

async fn fetch_top(state: &AppState, user_id: &str, params: &TopParams) -> Result<Value> {
    let query = TopItemsQuery::parse(
        params.item_type.as_deref(),
        params.time_range.as_deref(),
        params.limit.as_deref(),
    )?;
    let token = state.tokens.get_valid_token(user_id).await?;

    Ok(state.spotify.top_items(&token, &query).await?)
}

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use tracing::{error, warn};

use crate::{error::Error, server::AppState, utils};

use super::login::STATE_COOKIE;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Completes the authorization flow started by [`super::login`].
///
/// The state check runs before anything else; on mismatch no outbound call
/// is made and the store is untouched. Once the state matched, the state
/// cookie is cleared whatever the outcome.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    let cookie_state = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    if !utils::state_matches(params.state.as_deref(), cookie_state.as_deref()) {
        warn!("oauth callback rejected: state mismatch");
        return error_response(&Error::StateMismatch).into_response();
    }

    let jar = jar.remove(Cookie::build(STATE_COOKIE).path("/"));

    let result = match (params.error, params.code) {
        (Some(reason), _) => Err(Error::AuthorizationDenied(reason)),
        (None, None) => Err(Error::MissingCode),
        (None, Some(code)) => state.tokens.authorize(&code).await,
    };

    match result {
        Ok(profile) => (
            jar,
            format!(
                "Connected Spotify for user: {}. You can close this tab.",
                profile.id
            ),
        )
            .into_response(),
        Err(e) => {
            match &e {
                Error::AuthorizationDenied(_) | Error::MissingCode => {
                    warn!(error = %e, "oauth callback rejected")
                }
                _ => error!(error = %e, "oauth callback failed"),
            }
            (jar, error_response(&e)).into_response()
        }
    }
}

fn error_response(e: &Error) -> (StatusCode, &'static str) {
    match e {
        Error::StateMismatch => (StatusCode::BAD_REQUEST, "State mismatch"),
        Error::AuthorizationDenied(_) => (StatusCode::BAD_REQUEST, "Authorization denied"),
        Error::MissingCode => (StatusCode::BAD_REQUEST, "Missing code"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Error exchanging token"),
    }
}

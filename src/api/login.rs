use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{server::AppState, utils};

/// Name of the cookie carrying the pending login state.
pub const STATE_COOKIE: &str = "spotify_state";

/// Starts the authorization flow.
///
/// Stores a fresh state value in the `spotify_state` cookie and answers
/// with a `302 Found` pointing at the Spotify authorize endpoint.
pub async fn login(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let login_state = utils::generate_state();
    let location = state.spotify.authorize_url(&login_state);

    let cookie = Cookie::build((STATE_COOKIE, login_state))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(true);

    (
        StatusCode::FOUND,
        jar.add(cookie),
        [(header::LOCATION, location.to_string())],
    )
}

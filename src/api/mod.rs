//! # API Module
//!
//! HTTP endpoints of the sporltop service.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`login`] - `GET /auth/login`. Sets the `spotify_state` cookie and
//!   redirects (302) to Spotify's authorization page.
//! - [`callback`] - `GET /auth/callback`. Verifies the state round trip,
//!   exchanges the authorization code, identifies the user through `GET /me`
//!   and stores their tokens.
//!
//! ### Data
//!
//! - [`top`] - `GET /api/{user_id}/top`. Returns the user's top tracks or
//!   artists, refreshing the access token first when it has expired.
//!
//! ### Monitoring
//!
//! - [`root`] - `GET /`. Plain-text liveness message.
//! - [`health`] - `GET /health`. Status and version as JSON.
//!
//! ## Error Responses
//!
//! Provider failures are logged with their details and answered with a
//! generic message:
//!
//! | Endpoint | Failure | Response |
//! |---|---|---|
//! | callback | state mismatch | 400 `State mismatch` |
//! | callback | denied / missing code | 400 |
//! | callback | exchange or profile error | 500 `Error exchanging token` |
//! | top | any | 400 `{"error": "..."}` |

mod callback;
mod health;
mod login;
mod top;

pub use callback::{CallbackParams, callback};
pub use health::{health, root};
pub use login::{STATE_COOKIE, login};
pub use top::{TopParams, top};

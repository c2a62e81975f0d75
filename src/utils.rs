use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};

/// Seconds subtracted from the provider's token lifetime.
pub const EXPIRY_MARGIN_SECS: i64 = 30;

/// Bytes of randomness in a login state value (128 bits).
pub const STATE_BYTES: usize = 16;

/// Generates an opaque, URL-safe anti-forgery state value.
pub fn generate_state() -> String {
    let bytes: [u8; STATE_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Instant at which a token issued at `now` with lifetime `expires_in`
/// seconds is considered stale.
///
/// Returns `None` when the lifetime does not fit in a timestamp.
pub fn expires_at(now: DateTime<Utc>, expires_in: i64) -> Option<DateTime<Utc>> {
    let lifetime = expires_in.checked_sub(EXPIRY_MARGIN_SECS)?;
    now.checked_add_signed(Duration::try_seconds(lifetime)?)
}

/// Compares the callback state against the cookie value.
///
/// Both must be present and non-empty. The comparison does not short-circuit
/// on the first differing byte.
pub fn state_matches(query: Option<&str>, cookie: Option<&str>) -> bool {
    match (query, cookie) {
        (Some(q), Some(c)) if !q.is_empty() && q.len() == c.len() => q
            .bytes()
            .zip(c.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0,
        _ => false,
    }
}

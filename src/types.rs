use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, SpotifyError},
    utils,
};

/// Stored credentials of one connected Spotify user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: String,
    /// The access token is stale at or after this instant.
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Builds a record from an authorization-code exchange response.
    pub fn from_exchange(token: TokenResponse, now: DateTime<Utc>) -> Result<Self, SpotifyError> {
        let refresh_token = token
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(SpotifyError::MissingField("refresh_token"))?;

        Ok(Self {
            access_token: token.access_token,
            refresh_token,
            expires_at: token_expiry(now, token.expires_in)?,
        })
    }

    /// Returns the record after applying a refresh response.
    ///
    /// The stored refresh token is kept unless Spotify rotated it.
    pub fn refreshed(&self, token: TokenResponse, now: DateTime<Utc>) -> Result<Self, SpotifyError> {
        Ok(Self {
            expires_at: token_expiry(now, token.expires_in)?,
            access_token: token.access_token,
            refresh_token: token
                .refresh_token
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| self.refresh_token.clone()),
        })
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

fn token_expiry(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>, SpotifyError> {
    utils::expires_at(now, expires_in).ok_or(SpotifyError::InvalidField("expires_in"))
}

/// Body of a successful `POST /api/token` response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Subset of `GET /me` used to identify the connected user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopItemType {
    #[default]
    Tracks,
    Artists,
}

impl TopItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopItemType::Tracks => "tracks",
            TopItemType::Artists => "artists",
        }
    }
}

impl FromStr for TopItemType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tracks" => Ok(TopItemType::Tracks),
            "artists" => Ok(TopItemType::Artists),
            other => Err(Error::InvalidQuery(format!(
                "invalid type `{other}`, expected tracks or artists"
            ))),
        }
    }
}

impl fmt::Display for TopItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Affinity window for top items: ~4 weeks, ~6 months or ~1 year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    ShortTerm,
    MediumTerm,
    #[default]
    LongTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short_term" => Ok(TimeRange::ShortTerm),
            "medium_term" => Ok(TimeRange::MediumTerm),
            "long_term" => Ok(TimeRange::LongTerm),
            other => Err(Error::InvalidQuery(format!(
                "invalid time_range `{other}`, expected short_term, medium_term or long_term"
            ))),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_TOP_LIMIT: u32 = 10;

/// Validated parameters of a top-items request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopItemsQuery {
    pub item_type: TopItemType,
    pub time_range: TimeRange,
    /// Positive integer, kept exactly as the caller sent it.
    pub limit: String,
}

impl Default for TopItemsQuery {
    fn default() -> Self {
        Self {
            item_type: TopItemType::default(),
            time_range: TimeRange::default(),
            limit: DEFAULT_TOP_LIMIT.to_string(),
        }
    }
}

impl TopItemsQuery {
    /// Validates raw query values, applying defaults for absent ones.
    pub fn parse(
        item_type: Option<&str>,
        time_range: Option<&str>,
        limit: Option<&str>,
    ) -> Result<Self, Error> {
        let defaults = Self::default();
        let limit = match limit {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n >= 1 => raw.to_string(),
                _ => {
                    return Err(Error::InvalidQuery(format!(
                        "invalid limit `{raw}`, expected a positive integer"
                    )));
                }
            },
            None => defaults.limit.clone(),
        };

        Ok(Self {
            item_type: item_type
                .map(str::parse::<TopItemType>)
                .transpose()?
                .unwrap_or(defaults.item_type),
            time_range: time_range
                .map(str::parse::<TimeRange>)
                .transpose()?
                .unwrap_or(defaults.time_range),
            limit,
        })
    }
}

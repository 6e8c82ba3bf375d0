//! Player profile lookup through the Steam Web API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::claimed_id::SteamId;

/// Default Steam Web API base URL.
pub const STEAM_WEB_API_URL: &str = "https://api.steampowered.com";

/// Errors returned by a [`ProfileLookup`].
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The request could not be sent or the body could not be read.
    #[error("Profile request failed: {0}")]
    Request(String),

    /// The API answered with a non-success status.
    #[error("Profile API returned status {0}")]
    Status(u16),

    /// The body was not the expected JSON.
    #[error("Profile decode error: {0}")]
    Decode(String),

    /// The API knows no player with this id.
    #[error("No profile found for {0}")]
    NotFound(String),
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for ProfileError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key.
        let err = err.without_url();
        if let Some(status) = err.status() {
            ProfileError::Status(status.as_u16())
        } else if err.is_decode() {
            ProfileError::Decode(err.to_string())
        } else {
            ProfileError::Request(err.to_string())
        }
    }
}

/// Public profile summary of a Steam player.
///
/// Field names follow the Web API's `GetPlayerSummaries` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub steamid: String,

    #[serde(default)]
    pub personaname: String,

    #[serde(default)]
    pub profileurl: String,

    #[serde(default)]
    pub avatar: String,

    #[serde(default)]
    pub avatarmedium: String,

    #[serde(default)]
    pub avatarfull: String,

    /// 0 offline, 1 online, 2 busy, 3 away, 4 snooze, 5 looking to trade, 6 looking to play.
    #[serde(default)]
    pub personastate: u8,

    /// 1 private, 3 public.
    #[serde(default)]
    pub communityvisibilitystate: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timecreated: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loccountrycode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastlogoff: Option<u64>,
}

impl PlayerSummary {
    /// Whether the profile is publicly visible.
    pub fn is_public(&self) -> bool {
        self.communityvisibilitystate == 3
    }
}

/// Looks up a verified player's profile.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn player_summary(
        &self,
        steam_id: &SteamId,
        api_key: &str,
    ) -> Result<PlayerSummary, ProfileError>;
}

#[derive(Debug, Deserialize)]
struct PlayerSummariesEnvelope {
    response: PlayerSummaries,
}

#[derive(Debug, Deserialize)]
struct PlayerSummaries {
    #[serde(default)]
    players: Vec<PlayerSummary>,
}

/// [`ProfileLookup`] calling `ISteamUser/GetPlayerSummaries/v0002`.
///
/// # Example
///
/// ```rust,ignore
/// use steam_openid::{ProfileLookup, SteamWebApi};
///
/// let api = SteamWebApi::new();
/// let player = api.player_summary(&steam_id, &api_key).await?;
/// println!("{}", player.personaname);
/// ```
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct SteamWebApi {
    client: reqwest::Client,
    base_url: String,
}

#[cfg(feature = "http")]
impl SteamWebApi {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: STEAM_WEB_API_URL.into(),
        }
    }

    /// Point at another base URL, e.g. a local mock.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Reuse an existing client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[cfg(feature = "http")]
impl Default for SteamWebApi {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl ProfileLookup for SteamWebApi {
    async fn player_summary(
        &self,
        steam_id: &SteamId,
        api_key: &str,
    ) -> Result<PlayerSummary, ProfileError> {
        let url = format!(
            "{}/ISteamUser/GetPlayerSummaries/v0002/",
            self.base_url.trim_end_matches('/')
        );
        tracing::debug!(%steam_id, "fetching player summary");

        let envelope: PlayerSummariesEnvelope = self
            .client
            .get(&url)
            .query(&[("key", api_key), ("steamids", steam_id.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        envelope
            .response
            .players
            .into_iter()
            .find(|p| p.steamid == steam_id.as_str())
            .ok_or_else(|| ProfileError::NotFound(steam_id.to_string()))
    }
}

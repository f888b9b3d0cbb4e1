use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{
    errors::ApiError,
    models::{LeagueEntry, Match, Summoner},
};

const RANKED_QUEUE: &str = "RANKED_TFT";

/// Remote game-data API consumed by the leaderboard core
#[async_trait]
pub trait GameApi: Send + Sync {
    async fn get_summoner(&self, name: &str) -> Result<Summoner, ApiError>;

    /// Ranked standing for a summoner, `None` when the player is unranked
    async fn get_league_entry(&self, summoner_id: &str) -> Result<Option<LeagueEntry>, ApiError>;

    /// Recent match IDs for a player, most recent first
    async fn list_matches(&self, puuid: &str) -> Result<Vec<String>, ApiError>;

    async fn get_match(&self, match_id: &str) -> Result<Match, ApiError>;
}

#[derive(Debug, Clone)]
pub struct RiotClientConfig {
    pub api_key: String,
    /// Host serving summoner and league endpoints
    pub platform_url: String,
    /// Host serving match endpoints
    pub regional_url: String,
    pub timeout: Duration,
}

impl RiotClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            platform_url: "https://na1.api.riotgames.com".to_string(),
            regional_url: "https://americas.api.riotgames.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP implementation of GameApi against the Riot TFT endpoints
#[derive(Debug, Clone)]
pub struct RiotClient {
    client: Client,
    config: RiotClientConfig,
}

impl RiotClient {
    pub fn new(config: RiotClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self { client, config })
    }

    /// Joins path segments onto a base URL, percent-encoding each one
    fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(base)
            .map_err(|e| ApiError::InvalidRequest(format!("bad base url {}: {}", base, e)))?;

        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidRequest(format!("base url {} cannot take a path", base)))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        debug!(url = %url, "Requesting game API");

        let response = self
            .client
            .get(url.clone())
            .header("X-Riot-Token", &self.config.api_key)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            warn!(url = %url, status = %status, "Game API returned non-success status");
            return Err(ApiError::Status {
                status,
                url: url.to_string(),
            });
        }

        response.json::<T>().await.map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl GameApi for RiotClient {
    #[instrument(skip(self))]
    async fn get_summoner(&self, name: &str) -> Result<Summoner, ApiError> {
        if name.is_empty() {
            return Err(ApiError::InvalidRequest("empty summoner name".to_string()));
        }

        let url = Self::endpoint(
            &self.config.platform_url,
            &["tft", "summoner", "v1", "summoners", "by-name", name],
        )?;

        match self.get::<Summoner>(url).await {
            Err(ApiError::NotFound(_)) => Err(ApiError::NotFound(format!("summoner {}", name))),
            other => other,
        }
    }

    #[instrument(skip(self))]
    async fn get_league_entry(&self, summoner_id: &str) -> Result<Option<LeagueEntry>, ApiError> {
        let url = Self::endpoint(
            &self.config.platform_url,
            &["tft", "league", "v1", "entries", "by-summoner", summoner_id],
        )?;

        let entries: Vec<LeagueEntry> = self.get(url).await?;
        let ranked = entries.iter().position(|e| e.queue_type == RANKED_QUEUE);

        Ok(match ranked {
            Some(index) => entries.into_iter().nth(index),
            None => entries.into_iter().next(),
        })
    }

    #[instrument(skip(self))]
    async fn list_matches(&self, puuid: &str) -> Result<Vec<String>, ApiError> {
        if puuid.is_empty() {
            return Err(ApiError::InvalidRequest("empty puuid".to_string()));
        }

        let url = Self::endpoint(
            &self.config.regional_url,
            &["tft", "match", "v1", "matches", "by-puuid", puuid, "ids"],
        )?;

        self.get(url).await
    }

    #[instrument(skip(self))]
    async fn get_match(&self, match_id: &str) -> Result<Match, ApiError> {
        if match_id.is_empty() {
            return Err(ApiError::InvalidRequest("empty match id".to_string()));
        }

        let url = Self::endpoint(
            &self.config.regional_url,
            &["tft", "match", "v1", "matches", match_id],
        )?;

        self.get(url).await
    }
}

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use teamfit::tft::{ApiError, GameApi, LeagueEntry, Match, Summoner};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Game API double backed by shared maps, with optional per-call latency
/// and counters for how match fetches were issued.
#[derive(Clone, Default)]
pub struct MockGameApi {
    summoners: Arc<RwLock<HashMap<String, Summoner>>>,
    leagues: Arc<RwLock<HashMap<String, LeagueEntry>>>,
    match_lists: Arc<RwLock<HashMap<String, Vec<String>>>>,
    matches: Arc<RwLock<HashMap<String, Match>>>,
    fetch_counts: Arc<RwLock<HashMap<String, usize>>>,
    latency: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl MockGameApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub async fn add_summoner(&self, name: &str, puuid: &str) {
        self.summoners.write().await.insert(
            name.to_string(),
            Summoner {
                id: format!("sid-{}", puuid),
                account_id: format!("acc-{}", puuid),
                puuid: puuid.to_string(),
                name: name.to_string(),
                summoner_level: 100,
                ..Summoner::default()
            },
        );
    }

    pub async fn add_league(&self, puuid: &str, tier: &str, rank: &str) {
        self.leagues.write().await.insert(
            format!("sid-{}", puuid),
            LeagueEntry {
                queue_type: "RANKED_TFT".to_string(),
                tier: tier.to_string(),
                rank: rank.to_string(),
                ..LeagueEntry::default()
            },
        );
    }

    pub async fn add_match(&self, m: Match) {
        let mut lists = self.match_lists.write().await;
        for participant in &m.info.participants {
            lists
                .entry(participant.puuid.clone())
                .or_default()
                .push(m.metadata.match_id.clone());
        }
        self.matches
            .write()
            .await
            .insert(m.metadata.match_id.clone(), m);
    }

    pub async fn fetches_of(&self, match_id: &str) -> usize {
        self.fetch_counts
            .read()
            .await
            .get(match_id)
            .copied()
            .unwrap_or_default()
    }

    pub async fn total_fetches(&self) -> usize {
        self.fetch_counts.read().await.values().sum()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl GameApi for MockGameApi {
    async fn get_summoner(&self, name: &str) -> Result<Summoner, ApiError> {
        self.simulate_latency().await;
        self.summoners
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("summoner {}", name)))
    }

    async fn get_league_entry(&self, summoner_id: &str) -> Result<Option<LeagueEntry>, ApiError> {
        Ok(self.leagues.read().await.get(summoner_id).cloned())
    }

    async fn list_matches(&self, puuid: &str) -> Result<Vec<String>, ApiError> {
        self.simulate_latency().await;
        Ok(self
            .match_lists
            .read()
            .await
            .get(puuid)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_match(&self, match_id: &str) -> Result<Match, ApiError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        *self
            .fetch_counts
            .write()
            .await
            .entry(match_id.to_string())
            .or_default() += 1;

        self.simulate_latency().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.matches
            .read()
            .await
            .get(match_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("match {}", match_id)))
    }
}

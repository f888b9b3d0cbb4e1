use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::{
    aggregator::aggregate,
    cancellable,
    collator::{Collator, DEFAULT_FETCH_CONCURRENCY},
    identity::IdentityBridge,
    models::{Leaderboard, MatchResult, NameResults, ResultsQuery, Stats, SummonerProfile},
    repository::LeaderboardRepository,
    LeaderboardError,
};
use crate::tft::GameApi;

/// Leaderboards and the match results and stats behind them
pub struct LeaderboardService {
    api: Arc<dyn GameApi>,
    repository: Arc<dyn LeaderboardRepository>,
    identity: IdentityBridge,
    collator: Collator,
}

impl LeaderboardService {
    pub fn builder(
        api: Arc<dyn GameApi>,
        repository: Arc<dyn LeaderboardRepository>,
    ) -> LeaderboardServiceBuilder {
        LeaderboardServiceBuilder::new(api, repository)
    }

    /// Summoner snapshot plus ranked standing
    pub async fn get_summoner(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<SummonerProfile, LeaderboardError> {
        self.identity.get_profile(name, cancel).await
    }

    /// Results keyed by the requested names.
    /// Fails without partial results if any name cannot be resolved.
    #[instrument(skip(self, cancel))]
    pub async fn get_results_from_names(
        &self,
        names: &[String],
        query: &ResultsQuery,
        cancel: &CancellationToken,
    ) -> Result<NameResults, LeaderboardError> {
        let summoners = self.identity.resolve_players(names, cancel).await?;

        let mut puuids: Vec<String> = Vec::with_capacity(summoners.len());
        for summoner in &summoners {
            if !puuids.contains(&summoner.puuid) {
                puuids.push(summoner.puuid.clone());
            }
        }

        let results = self.collator.collate(&puuids, query, cancel).await?;
        Ok(IdentityBridge::remap_to_names(names, &summoners, &results))
    }

    /// Results for every member of a stored leaderboard, addressed by name or ID
    #[instrument(skip(self, cancel))]
    pub async fn get_results_from_leaderboard(
        &self,
        key: &str,
        query: &ResultsQuery,
        cancel: &CancellationToken,
    ) -> Result<NameResults, LeaderboardError> {
        let board = self.find_leaderboard(key).await?;
        self.get_results_from_names(&board.member_names(), query, cancel)
            .await
    }

    /// Stats keyed by the requested names
    #[instrument(skip(self, cancel))]
    pub async fn get_stats(
        &self,
        names: &[String],
        query: &ResultsQuery,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<String, Stats>, LeaderboardError> {
        let results = self.get_results_from_names(names, query, cancel).await?;
        Ok(Self::summarize(&results))
    }

    #[instrument(skip(self, cancel))]
    pub async fn get_stats_from_leaderboard(
        &self,
        key: &str,
        query: &ResultsQuery,
        cancel: &CancellationToken,
    ) -> Result<BTreeMap<String, Stats>, LeaderboardError> {
        let results = self
            .get_results_from_leaderboard(key, query, cancel)
            .await?;
        Ok(Self::summarize(&results))
    }

    pub fn summarize(results: &NameResults) -> BTreeMap<String, Stats> {
        results
            .iter()
            .map(|(name, player_results)| (name.clone(), aggregate(player_results)))
            .collect()
    }

    /// The player's participation in their latest listed match, if any
    #[instrument(skip(self, cancel))]
    pub async fn most_recent_result(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<MatchResult>, LeaderboardError> {
        let summoner = self.identity.resolve_player(name, cancel).await?;

        let match_ids = cancellable(cancel, async {
            self.api
                .list_matches(&summoner.puuid)
                .await
                .map_err(|source| LeaderboardError::ListMatches {
                    puuid: summoner.puuid.clone(),
                    source,
                })
        })
        .await?;

        let Some(match_id) = match_ids.into_iter().next() else {
            debug!(name = %name, "Summoner has no matches");
            return Ok(None);
        };

        let m = cancellable(cancel, async {
            self.api
                .get_match(&match_id)
                .await
                .map_err(|source| LeaderboardError::FetchMatch {
                    match_id: match_id.clone(),
                    source,
                })
        })
        .await?;

        let started_at = m.info.started_at();
        Ok(m.info
            .participants
            .into_iter()
            .find(|p| p.puuid == summoner.puuid)
            .map(|participant| MatchResult {
                match_id,
                started_at,
                participant,
            }))
    }

    /// Resolves every name up front and stores the group.
    /// Any unresolvable name fails the whole create.
    #[instrument(skip(self, cancel))]
    pub async fn create_leaderboard(
        &self,
        name: &str,
        names: &[String],
        cancel: &CancellationToken,
    ) -> Result<Leaderboard, LeaderboardError> {
        if name.trim().is_empty() {
            return Err(LeaderboardError::InvalidArgument(
                "leaderboard name must not be empty".to_string(),
            ));
        }

        let summoners = self.identity.resolve_players(names, cancel).await?;
        let board = Leaderboard::new(name.to_string(), summoners);

        let created = self.repository.create_leaderboard(&board).await.map_err(|e| {
            warn!(error = %e, name = %name, "Failed to store leaderboard");
            LeaderboardError::from(e)
        })?;

        info!(
            id = %created.id,
            name = %created.name,
            members = created.summoners.len(),
            "Leaderboard created"
        );

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_leaderboard(&self, id: &str) -> Result<Leaderboard, LeaderboardError> {
        self.repository
            .get_leaderboard(id)
            .await?
            .ok_or_else(|| LeaderboardError::LeaderboardNotFound { id: id.to_string() })
    }

    #[instrument(skip(self))]
    pub async fn get_leaderboard_by_name(
        &self,
        name: &str,
    ) -> Result<Leaderboard, LeaderboardError> {
        self.repository
            .get_leaderboard_by_name(name)
            .await?
            .ok_or_else(|| LeaderboardError::LeaderboardNotFound {
                id: name.to_string(),
            })
    }

    /// Looks a leaderboard up by name first, then by ID
    pub async fn find_leaderboard(&self, key: &str) -> Result<Leaderboard, LeaderboardError> {
        if let Some(board) = self.repository.get_leaderboard_by_name(key).await? {
            return Ok(board);
        }
        self.get_leaderboard(key).await
    }
}

pub struct LeaderboardServiceBuilder {
    api: Arc<dyn GameApi>,
    repository: Arc<dyn LeaderboardRepository>,
    fetch_concurrency: usize,
}

impl LeaderboardServiceBuilder {
    fn new(api: Arc<dyn GameApi>, repository: Arc<dyn LeaderboardRepository>) -> Self {
        Self {
            api,
            repository,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    pub fn with_fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.fetch_concurrency = fetch_concurrency;
        self
    }

    pub fn build(self) -> LeaderboardService {
        LeaderboardService {
            identity: IdentityBridge::new(self.api.clone()),
            collator: Collator::new(self.api.clone())
                .with_fetch_concurrency(self.fetch_concurrency),
            api: self.api,
            repository: self.repository,
        }
    }
}

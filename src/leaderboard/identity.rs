use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::{
    cancellable,
    models::{NameResults, PuuidResults, SummonerProfile},
    LeaderboardError,
};
use crate::tft::{ApiError, GameApi, Summoner};

/// Translates between summoner names and PUUIDs
///
/// Leaderboards and their callers address players by name while match history
/// is keyed by PUUID. Nothing is cached: every lookup goes back to the API.
#[derive(Clone)]
pub struct IdentityBridge {
    api: Arc<dyn GameApi>,
}

impl IdentityBridge {
    pub fn new(api: Arc<dyn GameApi>) -> Self {
        Self { api }
    }

    /// Resolves a single name to a summoner
    #[instrument(skip(self, cancel))]
    pub async fn resolve_player(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<Summoner, LeaderboardError> {
        cancellable(cancel, async {
            self.api.get_summoner(name).await.map_err(|source| match source {
                ApiError::NotFound(_) => {
                    warn!(name = %name, "Summoner not found");
                    LeaderboardError::PlayerNotFound {
                        name: name.to_string(),
                    }
                }
                source => LeaderboardError::ResolvePlayer {
                    name: name.to_string(),
                    source,
                },
            })
        })
        .await
    }

    /// Resolves names in order, one round trip each.
    /// The first failure aborts the batch and nothing is returned.
    #[instrument(skip(self, cancel), fields(count = names.len()))]
    pub async fn resolve_players(
        &self,
        names: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<Summoner>, LeaderboardError> {
        let mut summoners = Vec::with_capacity(names.len());
        for name in names {
            summoners.push(self.resolve_player(name, cancel).await?);
        }

        debug!(resolved = summoners.len(), "Resolved summoners");
        Ok(summoners)
    }

    /// Summoner snapshot together with their ranked standing
    #[instrument(skip(self, cancel))]
    pub async fn get_profile(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<SummonerProfile, LeaderboardError> {
        let summoner = self.resolve_player(name, cancel).await?;

        let league = cancellable(cancel, async {
            self.api
                .get_league_entry(&summoner.id)
                .await
                .map_err(|source| LeaderboardError::RankedStanding {
                    name: name.to_string(),
                    source,
                })
        })
        .await?;

        Ok(SummonerProfile { summoner, league })
    }

    /// Re-keys PUUID results by the names originally requested.
    /// Every requested name is present, with an empty list when it has no results.
    pub fn remap_to_names(
        names: &[String],
        summoners: &[Summoner],
        results: &PuuidResults,
    ) -> NameResults {
        names
            .iter()
            .zip(summoners)
            .map(|(name, summoner)| {
                let player_results = results.get(&summoner.puuid).cloned().unwrap_or_default();
                (name.clone(), player_results)
            })
            .collect()
    }
}

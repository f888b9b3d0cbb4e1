use futures::{future::try_join_all, stream, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use super::{
    cancellable,
    models::{MatchResult, PuuidResults, ResultsQuery},
    LeaderboardError,
};
use crate::tft::{GameApi, Match};

pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Fans out match listing and fetching across players and merges
/// the participations into bounded per-player result lists.
#[derive(Clone)]
pub struct Collator {
    api: Arc<dyn GameApi>,
    fetch_concurrency: usize,
}

impl Collator {
    pub fn new(api: Arc<dyn GameApi>) -> Self {
        Self {
            api,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    pub fn with_fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.fetch_concurrency = fetch_concurrency.max(1);
        self
    }

    /// Collects up to `query.limit()` results per PUUID.
    ///
    /// Every distinct match across all players is fetched exactly once, in order
    /// of first sighting (players in request order, each player's list in API
    /// order). Matches outside the query window are skipped without counting
    /// against anyone's limit. Results for a player keep that fetch order.
    /// Any listing or fetch failure aborts the whole collation.
    #[instrument(skip(self, puuids, cancel), fields(players = puuids.len(), limit = query.limit()))]
    pub async fn collate(
        &self,
        puuids: &[String],
        query: &ResultsQuery,
        cancel: &CancellationToken,
    ) -> Result<PuuidResults, LeaderboardError> {
        let limit = query.limit();

        let listings =
            try_join_all(puuids.iter().map(|puuid| self.list_matches(puuid, cancel))).await?;
        let fetch_set = Self::fetch_set(listings);
        debug!(matches = fetch_set.len(), "Collated match IDs to fetch");

        let mut results: PuuidResults = puuids
            .iter()
            .map(|puuid| (puuid.clone(), Vec::new()))
            .collect();

        // Fetches run ahead concurrently, but results are consumed in fetch-set
        // order so the per-player cap is applied deterministically.
        let mut fetched = stream::iter(fetch_set)
            .map(|match_id| self.fetch_match(match_id, cancel))
            .buffered(self.fetch_concurrency);

        let mut skipped = 0usize;
        while let Some((match_id, m)) = fetched.try_next().await? {
            let started_at = m.info.started_at();
            if !query.contains(started_at) {
                skipped += 1;
                continue;
            }

            for participant in m.info.participants {
                let Some(player_results) = results.get_mut(&participant.puuid) else {
                    continue;
                };
                if player_results.len() >= limit {
                    continue;
                }

                player_results.push(MatchResult {
                    match_id: match_id.clone(),
                    started_at,
                    participant,
                });
            }
        }

        info!(
            players = results.len(),
            skipped_outside_window = skipped,
            "Collated match results"
        );

        Ok(results)
    }

    /// Deduplicates listed match IDs, keeping first-seen order
    fn fetch_set(listings: Vec<Vec<String>>) -> Vec<String> {
        let mut seen = HashSet::new();
        listings
            .into_iter()
            .flatten()
            .filter(|match_id| seen.insert(match_id.clone()))
            .collect()
    }

    async fn list_matches(
        &self,
        puuid: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, LeaderboardError> {
        cancellable(cancel, async {
            self.api
                .list_matches(puuid)
                .await
                .map_err(|source| LeaderboardError::ListMatches {
                    puuid: puuid.to_string(),
                    source,
                })
        })
        .await
    }

    async fn fetch_match(
        &self,
        match_id: String,
        cancel: &CancellationToken,
    ) -> Result<(String, Match), LeaderboardError> {
        cancellable(cancel, async {
            match self.api.get_match(&match_id).await {
                Ok(m) => Ok((match_id, m)),
                Err(source) => Err(LeaderboardError::FetchMatch { match_id, source }),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::{participant, FakeGameApi};
    use chrono::{TimeZone, Utc};

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn match_ids(results: &[MatchResult]) -> Vec<&str> {
        results.iter().map(|r| r.match_id.as_str()).collect()
    }

    /// Two players sharing M3 and M1, with M2 only for alice and M4 only for bob
    fn shared_pool() -> FakeGameApi {
        FakeGameApi::new()
            .with_match_list("alice", &["M3", "M2", "M1"])
            .with_match_list("bob", &["M4", "M3", "M1"])
            .with_match("M4", 400, vec![participant("bob", 6)])
            .with_match(
                "M3",
                300,
                vec![participant("alice", 1), participant("bob", 2), participant("zed", 3)],
            )
            .with_match("M2", 200, vec![participant("alice", 4)])
            .with_match("M1", 100, vec![participant("bob", 8), participant("alice", 7)])
    }

    #[tokio::test]
    async fn test_shared_matches_fetched_once() {
        let api = Arc::new(shared_pool());
        let collator = Collator::new(api.clone());

        let results = collator
            .collate(
                &ids(&["alice", "bob"]),
                &ResultsQuery::with_limit(10),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(api.match_fetches("M3"), 1);
        assert_eq!(api.match_fetches("M1"), 1);
        assert_eq!(api.total_match_fetches(), 4);

        assert_eq!(match_ids(&results["alice"]), vec!["M3", "M2", "M1"]);
        assert_eq!(match_ids(&results["bob"]), vec!["M3", "M1", "M4"]);
        assert!(!results.contains_key("zed"));
    }

    #[tokio::test]
    async fn test_limit_is_per_player() {
        let collator = Collator::new(Arc::new(shared_pool()));

        let results = collator
            .collate(
                &ids(&["alice", "bob"]),
                &ResultsQuery::with_limit(2),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(match_ids(&results["alice"]), vec!["M3", "M2"]);
        assert_eq!(match_ids(&results["bob"]), vec!["M3", "M1"]);
    }

    #[tokio::test]
    async fn test_full_player_does_not_block_others_in_same_match() {
        let api = FakeGameApi::new()
            .with_match_list("alice", &["M2", "M1"])
            .with_match_list("bob", &["M1"])
            .with_match("M2", 200, vec![participant("alice", 1)])
            .with_match("M1", 100, vec![participant("alice", 2), participant("bob", 3)]);
        let collator = Collator::new(Arc::new(api));

        let results = collator
            .collate(
                &ids(&["alice", "bob"]),
                &ResultsQuery::with_limit(1),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(match_ids(&results["alice"]), vec!["M2"]);
        assert_eq!(match_ids(&results["bob"]), vec!["M1"]);
    }

    #[tokio::test]
    async fn test_zero_limit_clamped_to_one() {
        let collator = Collator::new(Arc::new(shared_pool()));

        let results = collator
            .collate(&ids(&["alice"]), &ResultsQuery::with_limit(0), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(results["alice"].len(), 1);
    }

    #[tokio::test]
    async fn test_window_skips_without_consuming_limit() {
        let collator = Collator::new(Arc::new(shared_pool()));
        let query = ResultsQuery {
            game_limit: 2,
            before: Some(Utc.timestamp_opt(250, 0).unwrap()),
            after: Some(Utc.timestamp_opt(150, 0).unwrap()),
        };

        let results = collator
            .collate(&ids(&["alice", "bob"]), &query, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(match_ids(&results["alice"]), vec!["M2"]);
        assert!(results["bob"].is_empty());
    }

    #[tokio::test]
    async fn test_results_carry_start_time_and_participation() {
        let collator = Collator::new(Arc::new(shared_pool()));

        let results = collator
            .collate(&ids(&["alice"]), &ResultsQuery::with_limit(1), &CancellationToken::new())
            .await
            .unwrap();

        let first = &results["alice"][0];
        assert_eq!(first.started_at.timestamp(), 300);
        assert_eq!(first.participant.placement, 1);
        assert_eq!(first.participant.puuid, "alice");
    }

    #[tokio::test]
    async fn test_player_without_matches_has_empty_list() {
        let collator = Collator::new(Arc::new(shared_pool()));

        let results = collator
            .collate(
                &ids(&["alice", "nobody"]),
                &ResultsQuery::with_limit(5),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results["nobody"].is_empty());
    }

    #[tokio::test]
    async fn test_listing_failure_aborts() {
        let api = shared_pool().with_failing_match_list("bob");
        let collator = Collator::new(Arc::new(api));

        let result = collator
            .collate(
                &ids(&["alice", "bob"]),
                &ResultsQuery::with_limit(5),
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(LeaderboardError::ListMatches { ref puuid, .. }) if puuid == "bob"
        ));
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts() {
        let api = shared_pool().with_failing_match("M2");
        let collator = Collator::new(Arc::new(api)).with_fetch_concurrency(1);

        let result = collator
            .collate(
                &ids(&["alice", "bob"]),
                &ResultsQuery::with_limit(5),
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(LeaderboardError::FetchMatch { ref match_id, .. }) if match_id == "M2"
        ));
    }

    #[tokio::test]
    async fn test_cancelled_collation() {
        let collator = Collator::new(Arc::new(shared_pool()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = collator
            .collate(&ids(&["alice"]), &ResultsQuery::with_limit(5), &cancel)
            .await;

        assert!(matches!(result, Err(LeaderboardError::Cancelled)));
    }

    #[test]
    fn test_fetch_set_keeps_first_seen_order() {
        let set = Collator::fetch_set(vec![ids(&["B", "A"]), ids(&["C", "B", "D"])]);
        assert_eq!(set, vec!["B", "A", "C", "D"]);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::tft::{LeagueEntry, Participant, Summoner};

/// Named group of summoners, keyed by summoner name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub id: String,
    pub name: String,
    pub summoners: BTreeMap<String, Summoner>,
}

impl Leaderboard {
    /// Creates a leaderboard with a generated, human-readable ID
    pub fn new(name: String, summoners: Vec<Summoner>) -> Self {
        let id = petname::Petnames::default().generate_one(3, "-");

        Self {
            id,
            name,
            summoners: summoners
                .into_iter()
                .map(|summoner| (summoner.name.clone(), summoner))
                .collect(),
        }
    }

    pub fn member_names(&self) -> Vec<String> {
        self.summoners.keys().cloned().collect()
    }
}

/// A summoner together with their ranked standing, if any
#[derive(Debug, Clone, PartialEq)]
pub struct SummonerProfile {
    pub summoner: Summoner,
    pub league: Option<LeagueEntry>,
}

/// One player's participation in a match, tagged with the match it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(flatten)]
    pub participant: Participant,
}

/// Aggregation of a player's match results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub games: usize,
    pub damage_dealt: u64,
    pub players_eliminated: u64,
    pub board_value: u64,
    pub wins: u32,
    pub top_finishes: u32,
    pub average_finish: f64,
}

/// Bounds for a results query: a per-player game limit and an optional time window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsQuery {
    pub game_limit: usize,
    pub before: Option<DateTime<Utc>>,
    pub after: Option<DateTime<Utc>>,
}

impl ResultsQuery {
    pub fn with_limit(game_limit: usize) -> Self {
        Self {
            game_limit,
            ..Self::default()
        }
    }

    /// Game limit clamped to at least one
    pub fn limit(&self) -> usize {
        self.game_limit.max(1)
    }

    /// Whether a match started at `started_at` falls inside the window
    pub fn contains(&self, started_at: DateTime<Utc>) -> bool {
        if matches!(self.before, Some(before) if started_at > before) {
            return false;
        }
        if matches!(self.after, Some(after) if started_at < after) {
            return false;
        }
        true
    }
}

/// Results keyed by PUUID
pub type PuuidResults = HashMap<String, Vec<MatchResult>>;

/// Results keyed by summoner name
pub type NameResults = BTreeMap<String, Vec<MatchResult>>;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::models::{Leaderboard, MatchResult, ResultsQuery, SummonerProfile};
use crate::shared::AppError;
use crate::tft::{Companion, LeagueEntry, MiniSeries, Summoner, Trait, Unit};

pub const DEFAULT_GAME_LIMIT: usize = 10;

/// Query parameters shared by the results and stats endpoints.
///
/// `name` may repeat, so this is parsed from the raw query string
/// rather than through a `Query` extractor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultsParams {
    pub names: Vec<String>,
    pub matches: Option<i64>,
    pub before: Option<DateTime<Utc>>,
    pub after: Option<DateTime<Utc>>,
}

impl ResultsParams {
    pub fn from_query(query: Option<&str>) -> Result<Self, AppError> {
        let mut params = Self::default();

        let Some(query) = query else {
            return Ok(params);
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "name" => {
                    let name = value.trim();
                    if !name.is_empty() {
                        params.names.push(name.to_string());
                    }
                }
                // Unparsable limits fall back to the default
                "matches" => params.matches = value.trim().parse().ok(),
                "before" => params.before = Some(parse_time("before", &value)?),
                "after" => params.after = Some(parse_time("after", &value)?),
                _ => {}
            }
        }

        Ok(params)
    }

    /// Requested game limit, or the default when absent or below one
    pub fn game_limit(&self) -> usize {
        match self.matches {
            Some(n) if n >= 1 => usize::try_from(n).unwrap_or(DEFAULT_GAME_LIMIT),
            _ => DEFAULT_GAME_LIMIT,
        }
    }

    pub fn to_query(&self) -> ResultsQuery {
        ResultsQuery {
            game_limit: self.game_limit(),
            before: self.before,
            after: self.after,
        }
    }

    /// Names for a multi-summoner request; at least one is required
    pub fn require_names(&self) -> Result<&[String], AppError> {
        if self.names.is_empty() {
            return Err(AppError::BadRequest(
                "at least one name parameter is required".to_string(),
            ));
        }
        Ok(&self.names)
    }
}

fn parse_time(key: &str, value: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| AppError::BadRequest(format!("{} must be an RFC 3339 timestamp: {}", key, e)))
}

/// Request payload for creating a leaderboard
#[derive(Debug, Deserialize)]
pub struct CreateLeaderboardRequest {
    pub name: String,
    pub summoners: Vec<String>,
}

/// Ranked standing without the summoner's internal IDs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicStanding {
    pub league_id: String,
    pub queue_type: String,
    pub tier: String,
    pub rank: String,
    pub league_points: i32,
    pub wins: i32,
    pub losses: i32,
    pub summoner_name: String,
    pub hot_streak: bool,
    pub veteran: bool,
    pub fresh_blood: bool,
    pub inactive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mini_series: Option<MiniSeries>,
}

impl From<LeagueEntry> for PublicStanding {
    fn from(entry: LeagueEntry) -> Self {
        Self {
            league_id: entry.league_id,
            queue_type: entry.queue_type,
            tier: entry.tier,
            rank: entry.rank,
            league_points: entry.league_points,
            wins: entry.wins,
            losses: entry.losses,
            summoner_name: entry.summoner_name,
            hot_streak: entry.hot_streak,
            veteran: entry.veteran,
            fresh_blood: entry.fresh_blood,
            inactive: entry.inactive,
            mini_series: entry.mini_series,
        }
    }
}

/// Summoner as shown to API clients: no PUUID, account or icon IDs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicSummoner {
    pub name: String,
    pub summoner_level: i64,
    pub revision_date: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranked: Option<PublicStanding>,
}

impl From<Summoner> for PublicSummoner {
    fn from(summoner: Summoner) -> Self {
        Self {
            name: summoner.name,
            summoner_level: summoner.summoner_level,
            revision_date: summoner.revision_date,
            ranked: None,
        }
    }
}

impl From<SummonerProfile> for PublicSummoner {
    fn from(profile: SummonerProfile) -> Self {
        Self {
            ranked: profile.league.map(PublicStanding::from),
            ..Self::from(profile.summoner)
        }
    }
}

/// A player's match participation without their PUUID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicResult {
    pub match_id: String,
    pub started_at: DateTime<Utc>,
    pub placement: u32,
    pub level: u32,
    pub last_round: u32,
    pub time_eliminated: f32,
    pub total_damage_to_players: u32,
    pub players_eliminated: u32,
    pub companion: Companion,
    pub traits: Vec<Trait>,
    pub units: Vec<Unit>,
}

impl From<MatchResult> for PublicResult {
    fn from(result: MatchResult) -> Self {
        let p = result.participant;
        Self {
            match_id: result.match_id,
            started_at: result.started_at,
            placement: p.placement,
            level: p.level,
            last_round: p.last_round,
            time_eliminated: p.time_eliminated,
            total_damage_to_players: p.total_damage_to_players,
            players_eliminated: p.players_eliminated,
            companion: p.companion,
            traits: p.traits,
            units: p.units,
        }
    }
}

pub fn public_results(results: Vec<MatchResult>) -> Vec<PublicResult> {
    results.into_iter().map(PublicResult::from).collect()
}

/// Leaderboard with public member views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicLeaderboard {
    pub id: String,
    pub name: String,
    pub summoners: BTreeMap<String, PublicSummoner>,
}

impl From<Leaderboard> for PublicLeaderboard {
    fn from(board: Leaderboard) -> Self {
        Self {
            id: board.id,
            name: board.name,
            summoners: board
                .summoners
                .into_iter()
                .map(|(name, summoner)| (name, PublicSummoner::from(summoner)))
                .collect(),
        }
    }
}

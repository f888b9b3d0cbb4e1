use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Summoner record as returned by the summoner endpoint.
/// The upstream uses camelCase for these payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Summoner {
    pub id: String,
    pub account_id: String,
    pub puuid: String,
    pub name: String,
    pub profile_icon_id: i64,
    pub revision_date: i64,
    pub summoner_level: i64,
}

/// Ranked queue standing for a summoner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeagueEntry {
    pub league_id: String,
    pub queue_type: String,
    pub tier: String,
    pub rank: String,
    pub summoner_id: String,
    pub summoner_name: String,
    pub league_points: i32,
    pub wins: i32,
    pub losses: i32,
    pub hot_streak: bool,
    pub veteran: bool,
    pub fresh_blood: bool,
    pub inactive: bool,
    pub mini_series: Option<MiniSeries>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiniSeries {
    pub losses: i32,
    pub progress: String,
    pub target: i32,
    pub wins: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Match {
    pub metadata: MatchMetadata,
    pub info: MatchInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchMetadata {
    pub data_version: String,
    pub match_id: String,
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchInfo {
    /// Recorded start time in milliseconds since the epoch
    pub game_datetime: i64,
    pub game_length: f32,
    pub game_version: String,
    pub participants: Vec<Participant>,
    pub queue_id: i32,
    pub tft_set_number: i32,
}

impl MatchInfo {
    /// Start time truncated to whole seconds.
    ///
    /// A timestamp chrono cannot represent falls back to the Unix epoch.
    pub fn started_at(&self) -> DateTime<Utc> {
        let secs = self.game_datetime.div_euclid(1000);
        DateTime::from_timestamp(secs, 0).unwrap_or_else(|| {
            debug!(game_datetime = self.game_datetime, "Match start out of range");
            DateTime::<Utc>::UNIX_EPOCH
        })
    }
}

/// One player's recorded performance within a match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Participant {
    pub placement: u32,
    pub level: u32,
    pub last_round: u32,
    pub time_eliminated: f32,
    pub total_damage_to_players: u32,
    pub players_eliminated: u32,
    pub puuid: String,
    pub companion: Companion,
    pub traits: Vec<Trait>,
    pub units: Vec<Unit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Companion {
    pub content_id: String,
    pub skin_id: i32,
    pub species: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trait {
    pub name: String,
    pub num_units: u32,
    pub tier_current: u32,
    pub tier_total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Unit {
    pub character_id: String,
    pub name: String,
    /// Star level of the unit
    pub tier: u32,
    /// Cost tier of the unit
    pub rarity: u32,
    pub items: Vec<i32>,
}

impl Unit {
    pub fn value(&self) -> u64 {
        u64::from(self.tier) * u64::from(self.rarity)
    }
}

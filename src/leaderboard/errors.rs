use std::path::PathBuf;
use thiserror::Error;

use crate::tft::ApiError;

/// Failure reading or writing persisted leaderboards
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not encode or decode leaderboards: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Coarse classification used by callers to pick a transport status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    UpstreamFailure,
    StorageFailure,
    Cancelled,
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("Summoner not found: {name}")]
    PlayerNotFound { name: String },

    #[error("Leaderboard not found: {id}")]
    LeaderboardNotFound { id: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to resolve summoner {name}: {source}")]
    ResolvePlayer {
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to get ranked standing for {name}: {source}")]
    RankedStanding {
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to list matches for {puuid}: {source}")]
    ListMatches {
        puuid: String,
        #[source]
        source: ApiError,
    },

    #[error("Unable to retrieve match {match_id}: {source}")]
    FetchMatch {
        match_id: String,
        #[source]
        source: ApiError,
    },

    #[error("Leaderboard storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl LeaderboardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LeaderboardError::PlayerNotFound { .. }
            | LeaderboardError::LeaderboardNotFound { .. } => ErrorKind::NotFound,
            LeaderboardError::InvalidArgument(_) => ErrorKind::InvalidInput,
            LeaderboardError::ResolvePlayer { .. }
            | LeaderboardError::RankedStanding { .. }
            | LeaderboardError::ListMatches { .. }
            | LeaderboardError::FetchMatch { .. } => ErrorKind::UpstreamFailure,
            LeaderboardError::Storage(_) => ErrorKind::StorageFailure,
            LeaderboardError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

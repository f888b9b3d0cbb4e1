use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::{errors::StorageError, models::Leaderboard};
use crate::tft::Summoner;

/// Trait for leaderboard storage operations
///
/// Creating a leaderboard whose name already exists replaces it.
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    async fn create_leaderboard(&self, board: &Leaderboard) -> Result<Leaderboard, StorageError>;
    async fn get_leaderboard(&self, id: &str) -> Result<Option<Leaderboard>, StorageError>;
    async fn get_leaderboard_by_name(&self, name: &str)
        -> Result<Option<Leaderboard>, StorageError>;
}

/// In-memory implementation of LeaderboardRepository for development and testing
#[derive(Debug, Default)]
pub struct InMemoryLeaderboardRepository {
    boards: Mutex<HashMap<String, Leaderboard>>,
}

impl InMemoryLeaderboardRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeaderboardRepository for InMemoryLeaderboardRepository {
    #[instrument(skip(self, board), fields(name = %board.name))]
    async fn create_leaderboard(&self, board: &Leaderboard) -> Result<Leaderboard, StorageError> {
        let mut boards = self.boards.lock().await;
        if boards.insert(board.name.clone(), board.clone()).is_some() {
            debug!(name = %board.name, "Replaced existing leaderboard in memory");
        }
        Ok(board.clone())
    }

    async fn get_leaderboard(&self, id: &str) -> Result<Option<Leaderboard>, StorageError> {
        let boards = self.boards.lock().await;
        Ok(boards.values().find(|board| board.id == id).cloned())
    }

    async fn get_leaderboard_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Leaderboard>, StorageError> {
        let boards = self.boards.lock().await;
        Ok(boards.get(name).cloned())
    }
}

/// Leaderboards mirrored to a JSON file
///
/// The file holds one object mapping leaderboard name to leaderboard and is
/// rewritten in full on every create. A single lock owns both the map and the
/// file, so there is at most one writer and reads never observe a half-applied
/// create.
#[derive(Debug)]
pub struct JsonFileLeaderboardRepository {
    path: PathBuf,
    boards: Mutex<BTreeMap<String, Leaderboard>>,
}

impl JsonFileLeaderboardRepository {
    /// Opens the backing file, creating it when missing.
    /// An empty file loads as an empty map.
    #[instrument]
    pub async fn open(path: impl AsRef<Path> + std::fmt::Debug) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let io_error = |source: std::io::Error| StorageError::Io {
            path: path.clone(),
            source,
        };

        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tokio::fs::write(&path, b"").await.map_err(io_error)?;
                Vec::new()
            }
            Err(err) => return Err(io_error(err)),
        };

        let boards: BTreeMap<String, Leaderboard> =
            if contents.iter().all(u8::is_ascii_whitespace) {
                BTreeMap::new()
            } else {
                serde_json::from_slice(&contents)?
            };

        info!(path = %path.display(), count = boards.len(), "Loaded leaderboards from file");

        Ok(Self {
            path,
            boards: Mutex::new(boards),
        })
    }

    /// Writes the whole map to a sibling temp file, then renames it into place
    async fn persist(&self, boards: &BTreeMap<String, Leaderboard>) -> Result<(), StorageError> {
        let encoded = serde_json::to_vec_pretty(boards)?;
        let tmp_path = self.path.with_extension("tmp");

        tokio::fs::write(&tmp_path, encoded)
            .await
            .map_err(|source| StorageError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

#[async_trait]
impl LeaderboardRepository for JsonFileLeaderboardRepository {
    #[instrument(skip(self, board), fields(name = %board.name))]
    async fn create_leaderboard(&self, board: &Leaderboard) -> Result<Leaderboard, StorageError> {
        let mut boards = self.boards.lock().await;

        let mut next = boards.clone();
        next.insert(board.name.clone(), board.clone());

        if let Err(err) = self.persist(&next).await {
            warn!(error = %err, path = %self.path.display(), "Failed to write leaderboards file");
            return Err(err);
        }

        *boards = next;
        debug!(count = boards.len(), "Leaderboards file rewritten");
        Ok(board.clone())
    }

    async fn get_leaderboard(&self, id: &str) -> Result<Option<Leaderboard>, StorageError> {
        let boards = self.boards.lock().await;
        Ok(boards.values().find(|board| board.id == id).cloned())
    }

    async fn get_leaderboard_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Leaderboard>, StorageError> {
        let boards = self.boards.lock().await;
        Ok(boards.get(name).cloned())
    }
}

/// PostgreSQL implementation of leaderboard repository
pub struct PostgresLeaderboardRepository {
    pool: PgPool,
}

impl PostgresLeaderboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the leaderboard tables if they do not exist
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<(), StorageError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS leaderboards (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS leaderboard_members (
                board_id TEXT NOT NULL REFERENCES leaderboards(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                puuid TEXT NOT NULL,
                summoner_id TEXT NOT NULL,
                account_id TEXT NOT NULL,
                profile_icon_id BIGINT NOT NULL,
                summoner_level BIGINT NOT NULL,
                revision_date BIGINT NOT NULL,
                PRIMARY KEY (board_id, name)
            )",
        )
        .execute(&self.pool)
        .await?;

        info!("Leaderboard tables initialized");
        Ok(())
    }

    async fn load_members(
        &self,
        id: String,
        name: String,
    ) -> Result<Leaderboard, StorageError> {
        let rows = sqlx::query(
            "SELECT name, puuid, summoner_id, account_id, profile_icon_id, summoner_level, revision_date
             FROM leaderboard_members WHERE board_id = $1",
        )
        .bind(&id)
        .fetch_all(&self.pool)
        .await?;

        let summoners = rows
            .into_iter()
            .map(|row| {
                let summoner = Summoner {
                    id: row.get("summoner_id"),
                    account_id: row.get("account_id"),
                    puuid: row.get("puuid"),
                    name: row.get("name"),
                    profile_icon_id: row.get("profile_icon_id"),
                    revision_date: row.get("revision_date"),
                    summoner_level: row.get("summoner_level"),
                };
                (summoner.name.clone(), summoner)
            })
            .collect();

        Ok(Leaderboard {
            id,
            name,
            summoners,
        })
    }
}

#[async_trait]
impl LeaderboardRepository for PostgresLeaderboardRepository {
    #[instrument(skip(self, board), fields(name = %board.name))]
    async fn create_leaderboard(&self, board: &Leaderboard) -> Result<Leaderboard, StorageError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM leaderboards WHERE name = $1")
            .bind(&board.name)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO leaderboards (id, name) VALUES ($1, $2)")
            .bind(&board.id)
            .bind(&board.name)
            .execute(&mut *tx)
            .await?;

        for (name, summoner) in &board.summoners {
            sqlx::query(
                "INSERT INTO leaderboard_members
                 (board_id, name, puuid, summoner_id, account_id, profile_icon_id, summoner_level, revision_date)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(&board.id)
            .bind(name)
            .bind(&summoner.puuid)
            .bind(&summoner.id)
            .bind(&summoner.account_id)
            .bind(summoner.profile_icon_id)
            .bind(summoner.summoner_level)
            .bind(summoner.revision_date)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await.map_err(|e| {
            warn!(error = %e, "Failed to commit leaderboard");
            StorageError::Database(e)
        })?;

        debug!(id = %board.id, members = board.summoners.len(), "Leaderboard stored in database");
        Ok(board.clone())
    }

    #[instrument(skip(self))]
    async fn get_leaderboard(&self, id: &str) -> Result<Option<Leaderboard>, StorageError> {
        let row = sqlx::query("SELECT id, name FROM leaderboards WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.load_members(row.get("id"), row.get("name")).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn get_leaderboard_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Leaderboard>, StorageError> {
        let row = sqlx::query("SELECT id, name FROM leaderboards WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.load_members(row.get("id"), row.get("name")).await?)),
            None => Ok(None),
        }
    }
}

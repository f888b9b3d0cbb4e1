// Library crate for the TFT leaderboard server and CLI
// This file exposes the public API for integration tests and binaries

pub mod config;
pub mod leaderboard;
pub mod shared;
pub mod tft;

// Re-export commonly used types for easier access in tests
pub use leaderboard::{
    InMemoryLeaderboardRepository, JsonFileLeaderboardRepository, LeaderboardError,
    LeaderboardRepository, LeaderboardService, PostgresLeaderboardRepository,
};
pub use shared::{AppError, AppState};
pub use tft::{ApiError, GameApi, RiotClient, RiotClientConfig};

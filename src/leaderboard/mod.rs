// Public API - what other modules can use
pub use aggregator::{aggregate, board_value};
pub use collator::{Collator, DEFAULT_FETCH_CONCURRENCY};
pub use errors::{ErrorKind, LeaderboardError, StorageError};
pub use handlers::router;
pub use identity::IdentityBridge;
pub use models::*;
pub use repository::{
    InMemoryLeaderboardRepository, JsonFileLeaderboardRepository, LeaderboardRepository,
    PostgresLeaderboardRepository,
};
pub use service::{LeaderboardService, LeaderboardServiceBuilder};

// Internal modules
mod aggregator;
mod collator;
mod errors;
mod handlers;
mod identity;
pub mod models;
pub mod repository;
mod service;
pub mod types;

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Races a remote call against the caller's cancellation signal
pub(crate) async fn cancellable<T, F>(
    cancel: &CancellationToken,
    call: F,
) -> Result<T, LeaderboardError>
where
    F: Future<Output = Result<T, LeaderboardError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LeaderboardError::Cancelled),
        result = call => result,
    }
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use teamfit::{
    leaderboard, tft::ApiError, AppState, GameApi, InMemoryLeaderboardRepository,
    JsonFileLeaderboardRepository, LeaderboardRepository, LeaderboardService,
};

use super::mocks::MockGameApi;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub api: MockGameApi,
    pub service: Arc<LeaderboardService>,
    pub app: Router,
    /// Keeps the leaderboard file alive for file-backed setups
    pub store_dir: Option<TempDir>,
}

pub struct TestSetupBuilder {
    api: MockGameApi,
    fetch_concurrency: Option<usize>,
    request_timeout: Duration,
    file_store: bool,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            api: MockGameApi::new(),
            fetch_concurrency: None,
            request_timeout: Duration::from_secs(5),
            file_store: false,
        }
    }

    pub fn with_api(mut self, api: MockGameApi) -> Self {
        self.api = api;
        self
    }

    pub fn with_fetch_concurrency(mut self, fetch_concurrency: usize) -> Self {
        self.fetch_concurrency = Some(fetch_concurrency);
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_file_store(mut self) -> Self {
        self.file_store = true;
        self
    }

    pub async fn build(self) -> TestSetup {
        let (repository, store_dir): (Arc<dyn LeaderboardRepository>, _) = if self.file_store {
            let dir = tempfile::tempdir().unwrap();
            let repo = JsonFileLeaderboardRepository::open(dir.path().join("boards.json"))
                .await
                .unwrap();
            (Arc::new(repo), Some(dir))
        } else {
            (Arc::new(InMemoryLeaderboardRepository::new()), None)
        };

        let mut builder = LeaderboardService::builder(Arc::new(self.api.clone()), repository);
        if let Some(n) = self.fetch_concurrency {
            builder = builder.with_fetch_concurrency(n);
        }
        let service = Arc::new(builder.build());

        let app = leaderboard::router()
            .with_state(AppState::new(service.clone(), self.request_timeout));

        TestSetup {
            api: self.api,
            service,
            app,
            store_dir,
        }
    }
}

// ============================================================================
// Fake upstream server
// ============================================================================

fn upstream_response<T: serde::Serialize>(result: Result<T, ApiError>) -> Response {
    match result {
        Ok(body) => Json(body).into_response(),
        Err(ApiError::NotFound(_)) => StatusCode::NOT_FOUND.into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Serves the mock's data over HTTP with the upstream's paths and wire format.
/// Returns the base URL.
pub async fn spawn_upstream(api: MockGameApi) -> String {
    let app = Router::new()
        .route(
            "/tft/summoner/v1/summoners/by-name/:name",
            get(
                |State(api): State<MockGameApi>, Path(name): Path<String>| async move {
                    upstream_response(api.get_summoner(&name).await)
                },
            ),
        )
        .route(
            "/tft/league/v1/entries/by-summoner/:id",
            get(
                |State(api): State<MockGameApi>, Path(id): Path<String>| async move {
                    let entries = api
                        .get_league_entry(&id)
                        .await
                        .map(|entry| entry.into_iter().collect::<Vec<_>>());
                    upstream_response(entries)
                },
            ),
        )
        .route(
            "/tft/match/v1/matches/by-puuid/:puuid/ids",
            get(
                |State(api): State<MockGameApi>, Path(puuid): Path<String>| async move {
                    upstream_response(api.list_matches(&puuid).await)
                },
            ),
        )
        .route(
            "/tft/match/v1/matches/:id",
            get(
                |State(api): State<MockGameApi>, Path(id): Path<String>| async move {
                    upstream_response(api.get_match(&id).await)
                },
            ),
        )
        .with_state(api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

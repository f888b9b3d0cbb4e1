use axum::{routing::get, Router};
use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use teamfit::{
    config::{ServerConfig, StorageBackend},
    leaderboard, AppState, InMemoryLeaderboardRepository, JsonFileLeaderboardRepository,
    LeaderboardRepository, LeaderboardService, PostgresLeaderboardRepository, RiotClient,
};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn open_repository(
    config: &ServerConfig,
) -> Result<Arc<dyn LeaderboardRepository>, Box<dyn Error>> {
    let repository: Arc<dyn LeaderboardRepository> = match config.storage {
        StorageBackend::Memory => Arc::new(InMemoryLeaderboardRepository::new()),
        StorageBackend::File => {
            Arc::new(JsonFileLeaderboardRepository::open(&config.leaderboard_file).await?)
        }
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL must be set for the postgres backend")?;
            let pool = sqlx::PgPool::connect(database_url).await?;
            let repository = PostgresLeaderboardRepository::new(pool);
            repository.initialize().await?;
            Arc::new(repository)
        }
    };

    info!(storage = ?config.storage, "Leaderboard storage ready");
    Ok(repository)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "teamfit=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::parse();
    info!(addr = %config.addr, "Starting TFT leaderboard server");

    let api = Arc::new(RiotClient::new(config.api.riot_client_config())?);
    let repository = open_repository(&config).await?;

    let service = LeaderboardService::builder(api, repository)
        .with_fetch_concurrency(config.fetch_concurrency)
        .build();
    let app_state = AppState::new(Arc::new(service), config.request_timeout());

    let app = Router::new()
        .route("/", get(|| async { "OK" }))
        .merge(leaderboard::router())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("Server running on http://{}", config.addr);
    axum::serve(listener, app).await?;

    Ok(())
}

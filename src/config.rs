use clap::{Args, Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::leaderboard::DEFAULT_FETCH_CONCURRENCY;
use crate::tft::RiotClientConfig;

/// Riot API connection settings shared by the server and the CLI
#[derive(Debug, Clone, Args)]
pub struct ApiArgs {
    /// Riot API key
    #[arg(long = "key", env = "RIOT_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Host serving summoner and league endpoints
    #[arg(long, env = "RIOT_PLATFORM_URL", default_value = "https://na1.api.riotgames.com")]
    pub platform_url: String,

    /// Host serving match endpoints
    #[arg(long, env = "RIOT_REGIONAL_URL", default_value = "https://americas.api.riotgames.com")]
    pub regional_url: String,

    /// Per-call HTTP timeout in seconds
    #[arg(long, env = "TEAMFIT_API_TIMEOUT_SECS", default_value = "10")]
    pub api_timeout_secs: u64,
}

impl ApiArgs {
    pub fn riot_client_config(&self) -> RiotClientConfig {
        RiotClientConfig {
            api_key: self.api_key.clone(),
            platform_url: self.platform_url.clone(),
            regional_url: self.regional_url.clone(),
            timeout: Duration::from_secs(self.api_timeout_secs),
        }
    }
}

/// Where leaderboards are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    Memory,
    File,
    Postgres,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "teamfit")]
#[command(about = "REST server for TFT leaderboards and match stats")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "TEAMFIT_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: SocketAddr,

    #[command(flatten)]
    pub api: ApiArgs,

    #[arg(long, env = "TEAMFIT_STORAGE", value_enum, default_value = "file")]
    pub storage: StorageBackend,

    /// Leaderboard file used by the file backend
    #[arg(long, env = "TEAMFIT_LEADERBOARD_FILE", default_value = "leaderboards.json")]
    pub leaderboard_file: PathBuf,

    /// Required by the postgres backend
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Match details fetched at once per request
    #[arg(long, env = "TEAMFIT_FETCH_CONCURRENCY", default_value_t = DEFAULT_FETCH_CONCURRENCY)]
    pub fetch_concurrency: usize,

    /// Seconds before an in-flight request is cancelled
    #[arg(long, env = "TEAMFIT_REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

//! Command line client for summoner results and stats.

use clap::{Parser, Subcommand};
use std::error::Error;
use std::sync::Arc;
use teamfit::{
    config::ApiArgs,
    leaderboard::{
        types::{public_results, PublicResult, DEFAULT_GAME_LIMIT},
        ResultsQuery,
    },
    InMemoryLeaderboardRepository, LeaderboardService, RiotClient,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tft")]
#[command(about = "Query TFT match results and stats")]
struct Cli {
    #[command(flatten)]
    api: ApiArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a summoner's most recent game
    Recent {
        summoner: String,

        /// Show units and traits
        #[arg(short, long)]
        verbose: bool,
    },

    /// Aggregate stats for one or more summoners
    Stats {
        #[arg(required = true)]
        names: Vec<String>,

        /// Games per summoner
        #[arg(long, default_value_t = DEFAULT_GAME_LIMIT)]
        matches: usize,
    },

    /// Recent match results for one or more summoners
    Results {
        #[arg(required = true)]
        names: Vec<String>,

        /// Games per summoner
        #[arg(long, default_value_t = DEFAULT_GAME_LIMIT)]
        matches: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "teamfit=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let api = Arc::new(RiotClient::new(cli.api.riot_client_config())?);
    let service =
        LeaderboardService::builder(api, Arc::new(InMemoryLeaderboardRepository::new())).build();

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    match cli.command {
        Command::Recent { summoner, verbose } => {
            let Some(result) = service.most_recent_result(&summoner, &cancel).await? else {
                println!("{} has no recorded games", summoner);
                return Ok(());
            };

            let mut result = PublicResult::from(result);
            if !verbose {
                println!("(Use -v to see units and traits)\n");
                result.traits.clear();
                result.units.clear();
            }

            println!(
                "{}'s Most Recent Game\n{}\n{}",
                summoner,
                result.started_at.to_rfc2822(),
                serde_json::to_string_pretty(&result)?
            );
        }
        Command::Stats { names, matches } => {
            let stats = service
                .get_stats(&names, &ResultsQuery::with_limit(matches), &cancel)
                .await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Results { names, matches } => {
            let results = service
                .get_results_from_names(&names, &ResultsQuery::with_limit(matches), &cancel)
                .await?;
            let results: std::collections::BTreeMap<_, _> = results
                .into_iter()
                .map(|(name, player_results)| (name, public_results(player_results)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}

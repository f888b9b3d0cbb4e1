use axum::{
    extract::{Path, RawQuery, State},
    routing::{get, post},
    Json, Router,
};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, instrument};

use super::{
    models::Stats,
    types::{
        public_results, CreateLeaderboardRequest, PublicLeaderboard, PublicResult,
        PublicSummoner, ResultsParams,
    },
};
use crate::shared::{AppError, AppState};

/// Routes for summoner, stats and leaderboard queries
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summoners/:name", get(get_summoner))
        .route("/summoners/:name/stats", get(get_summoner_stats))
        .route("/summoners/:name/results", get(get_summoner_results))
        .route("/stats", get(get_stats))
        .route("/results", get(get_results))
        .route("/leaderboards", post(create_leaderboard))
        .route("/leaderboards/:name", get(get_leaderboard))
        .route("/leaderboards/:name/stats", get(get_leaderboard_stats))
        .route("/leaderboards/:name/results", get(get_leaderboard_results))
}

/// Cancellation token that fires after `timeout`, or when the guard drops
fn request_deadline(timeout: Duration) -> (CancellationToken, DropGuard) {
    let token = CancellationToken::new();
    let timer = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = timer.cancelled() => {}
            _ = tokio::time::sleep(timeout) => {
                debug!(?timeout, "Request deadline reached");
                timer.cancel();
            }
        }
    });

    let guard = token.clone().drop_guard();
    (token, guard)
}

/// GET /summoners/:name
#[instrument(name = "get_summoner", skip(state))]
pub async fn get_summoner(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PublicSummoner>, AppError> {
    let (cancel, _deadline) = request_deadline(state.request_timeout);

    let profile = state
        .leaderboard_service
        .get_summoner(&name, &cancel)
        .await?;

    info!(name = %name, ranked = profile.league.is_some(), "Summoner retrieved");

    Ok(Json(PublicSummoner::from(profile)))
}

/// GET /summoners/:name/stats
#[instrument(name = "get_summoner_stats", skip(state))]
pub async fn get_summoner_stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<Stats>, AppError> {
    let params = ResultsParams::from_query(query.as_deref())?;
    let (cancel, _deadline) = request_deadline(state.request_timeout);

    let names = vec![name.clone()];
    let mut stats = state
        .leaderboard_service
        .get_stats(&names, &params.to_query(), &cancel)
        .await?;

    let stats = stats.remove(&name).unwrap_or_default();
    info!(name = %name, games = stats.games, "Summoner stats computed");

    Ok(Json(stats))
}

/// GET /summoners/:name/results
#[instrument(name = "get_summoner_results", skip(state))]
pub async fn get_summoner_results(
    State(state): State<AppState>,
    Path(name): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<PublicResult>>, AppError> {
    let params = ResultsParams::from_query(query.as_deref())?;
    let (cancel, _deadline) = request_deadline(state.request_timeout);

    let names = vec![name.clone()];
    let mut results = state
        .leaderboard_service
        .get_results_from_names(&names, &params.to_query(), &cancel)
        .await?;

    let results = results.remove(&name).unwrap_or_default();
    info!(name = %name, count = results.len(), "Summoner results collated");

    Ok(Json(public_results(results)))
}

/// GET /stats?name=..&name=..
#[instrument(name = "get_stats", skip(state))]
pub async fn get_stats(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<BTreeMap<String, Stats>>, AppError> {
    let params = ResultsParams::from_query(query.as_deref())?;
    let names = params.require_names()?;
    let (cancel, _deadline) = request_deadline(state.request_timeout);

    let stats = state
        .leaderboard_service
        .get_stats(names, &params.to_query(), &cancel)
        .await?;

    info!(players = stats.len(), "Stats computed");

    Ok(Json(stats))
}

/// GET /results?name=..&name=..
#[instrument(name = "get_results", skip(state))]
pub async fn get_results(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<BTreeMap<String, Vec<PublicResult>>>, AppError> {
    let params = ResultsParams::from_query(query.as_deref())?;
    let names = params.require_names()?;
    let (cancel, _deadline) = request_deadline(state.request_timeout);

    let results = state
        .leaderboard_service
        .get_results_from_names(names, &params.to_query(), &cancel)
        .await?;

    info!(players = results.len(), "Results collated");

    Ok(Json(
        results
            .into_iter()
            .map(|(name, player_results)| (name, public_results(player_results)))
            .collect(),
    ))
}

/// POST /leaderboards
///
/// Every member must resolve or nothing is stored
#[instrument(name = "create_leaderboard", skip(state, request), fields(name = %request.name))]
pub async fn create_leaderboard(
    State(state): State<AppState>,
    Json(request): Json<CreateLeaderboardRequest>,
) -> Result<Json<PublicLeaderboard>, AppError> {
    info!(members = request.summoners.len(), "Creating leaderboard");
    let (cancel, _deadline) = request_deadline(state.request_timeout);

    let board = state
        .leaderboard_service
        .create_leaderboard(&request.name, &request.summoners, &cancel)
        .await?;

    Ok(Json(PublicLeaderboard::from(board)))
}

/// GET /leaderboards/:name
#[instrument(name = "get_leaderboard", skip(state))]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PublicLeaderboard>, AppError> {
    let board = state.leaderboard_service.find_leaderboard(&name).await?;

    Ok(Json(PublicLeaderboard::from(board)))
}

/// GET /leaderboards/:name/stats
#[instrument(name = "get_leaderboard_stats", skip(state))]
pub async fn get_leaderboard_stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<BTreeMap<String, Stats>>, AppError> {
    let params = ResultsParams::from_query(query.as_deref())?;
    let (cancel, _deadline) = request_deadline(state.request_timeout);

    let stats = state
        .leaderboard_service
        .get_stats_from_leaderboard(&name, &params.to_query(), &cancel)
        .await?;

    info!(leaderboard = %name, players = stats.len(), "Leaderboard stats computed");

    Ok(Json(stats))
}

/// GET /leaderboards/:name/results
#[instrument(name = "get_leaderboard_results", skip(state))]
pub async fn get_leaderboard_results(
    State(state): State<AppState>,
    Path(name): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<BTreeMap<String, Vec<PublicResult>>>, AppError> {
    let params = ResultsParams::from_query(query.as_deref())?;
    let (cancel, _deadline) = request_deadline(state.request_timeout);

    let results = state
        .leaderboard_service
        .get_results_from_leaderboard(&name, &params.to_query(), &cancel)
        .await?;

    info!(leaderboard = %name, players = results.len(), "Leaderboard results collated");

    Ok(Json(
        results
            .into_iter()
            .map(|(name, player_results)| (name, public_results(player_results)))
            .collect(),
    ))
}

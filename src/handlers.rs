use crate::error::AppError;
use crate::state::{MinersQuery, ProfileQuery, SharedState};
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use nuance_client::Timeframe;
use nuance_models::{DashboardData, MinerProfile, MinerStats, SubnetStats};
use nuance_query::queries;

const DEFAULT_MINERS_LIMIT: usize = 50;

pub async fn root() -> &'static str {
    "Nuance subnet tracker. Data views: /dashboard /miners /miners/:hotkey /stats. Upstream proxy: /api/nuance?endpoint=..."
}

pub async fn health() -> &'static str {
    "OK"
}

fn parse_timeframe(raw: Option<&str>) -> Result<Option<Timeframe>, AppError> {
    match raw {
        None => Ok(None),
        Some(s) => Timeframe::from_str(s)
            .map(Some)
            .ok_or_else(|| AppError::BadRequest(format!("Invalid timeframe: {}", s))),
    }
}

pub async fn dashboard(State(state): State<SharedState>) -> Result<Json<DashboardData>, AppError> {
    let data = queries::dashboard(&state.api, &state.cache).await?;
    Ok(Json(data))
}

/// Leaderboard, optionally filtered. With `q` the full miner list is
/// pulled and searched; without it only the top `limit` rows are fetched.
pub async fn miners(
    State(state): State<SharedState>,
    Query(params): Query<MinersQuery>,
) -> Result<Json<Vec<MinerStats>>, AppError> {
    let timeframe = parse_timeframe(params.timeframe.as_deref())?;

    if let Some(query) = params.q.as_deref().filter(|q| !q.is_empty()) {
        let all = queries::all_miners(&state.api, &state.cache, timeframe).await?;
        return Ok(Json(queries::search_miners(query, &all)));
    }

    let limit = params.limit.unwrap_or(DEFAULT_MINERS_LIMIT);
    let miners = queries::top_miners(&state.api, &state.cache, timeframe, limit).await?;
    Ok(Json(miners))
}

pub async fn miner_profile(
    State(state): State<SharedState>,
    Path(hotkey): Path<String>,
    Query(params): Query<ProfileQuery>,
) -> Result<Json<MinerProfile>, AppError> {
    let enhanced = params.enhanced.unwrap_or(true);
    let profile = if enhanced {
        queries::enhanced_miner_profile(&state.api, &state.cache, Some(&hotkey)).await?
    } else {
        queries::miner_profile(&state.api, &state.cache, Some(&hotkey)).await?
    };

    profile
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Unknown miner: {}", hotkey)))
}

pub async fn stats(State(state): State<SharedState>) -> Result<Json<SubnetStats>, AppError> {
    let stats = queries::subnet_stats(&state.api, &state.cache).await?;
    Ok(Json(stats))
}

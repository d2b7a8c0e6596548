use crate::api::error::ApiResult;
use crate::api::extract::{AdminUser, ApiJson, AuthUser};
use crate::service::AppState;
use crate::types::{Match, MatchDetails, MatchId, MatchWithPlayers, MatchWithUsers};
use crate::utils::today;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// Upcoming matches, or every match when `upcoming_only` is switched off
pub async fn list_matches(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> ApiResult<Json<Vec<Match>>> {
    let matches = if state.config().booking.upcoming_only {
        state.schedule().upcoming_matches(today()).await?
    } else {
        state.schedule().all_matches().await?
    };
    Ok(Json(matches))
}

pub async fn all_matches(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<Match>>> {
    Ok(Json(state.schedule().all_matches().await?))
}

pub async fn create_match(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiJson(details): ApiJson<MatchDetails>,
) -> ApiResult<(StatusCode, Json<Match>)> {
    let game = state.schedule().create_match(details).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

pub async fn update_match(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(match_id): Path<MatchId>,
    ApiJson(details): ApiJson<MatchDetails>,
) -> ApiResult<Json<Match>> {
    Ok(Json(state.schedule().update_match(match_id, details).await?))
}

pub async fn delete_match(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(match_id): Path<MatchId>,
) -> ApiResult<StatusCode> {
    state.schedule().delete_match(match_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn matches_with_players(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> ApiResult<Json<Vec<MatchWithPlayers>>> {
    let upcoming_from = state.config().booking.upcoming_only.then(today);
    Ok(Json(
        state.queries().matches_with_players(upcoming_from).await?,
    ))
}

pub async fn match_users(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(match_id): Path<MatchId>,
) -> ApiResult<Json<MatchWithUsers>> {
    Ok(Json(state.queries().match_users(match_id).await?))
}

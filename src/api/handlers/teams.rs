use crate::api::error::ApiResult;
use crate::api::extract::{ApiJson, AuthUser};
use crate::service::AppState;
use crate::teams::RosterPayload;
use crate::types::{BalancedTeams, MatchId};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

/// Player display names, as listed by `/matches-with-players`
#[derive(Debug, Deserialize)]
pub struct NamedRoster {
    pub players: Vec<String>,
}

/// Balanced teams for everyone booked on a match
pub async fn match_teams(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(match_id): Path<MatchId>,
) -> ApiResult<Json<BalancedTeams>> {
    Ok(Json(state.queries().get_teams_for_match(match_id).await?))
}

/// Balance an ad-hoc roster
///
/// Malformed payloads are reported as `INVALID_REQUEST`.
pub async fn divide(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    body: String,
) -> ApiResult<Json<BalancedTeams>> {
    let roster = RosterPayload::parse(&body)?;
    Ok(Json(state.queries().divide_roster(&roster)?))
}

/// Balance the registered players behind a list of display names
pub async fn divide_by_names(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    ApiJson(named): ApiJson<NamedRoster>,
) -> ApiResult<Json<BalancedTeams>> {
    let queries = state.queries();
    let roster = queries.roster_from_display_names(&named.players).await?;
    Ok(Json(queries.divide_roster(&roster)?))
}

use crate::api::error::ApiResult;
use crate::api::extract::{AdminUser, ApiJson, AuthUser};
use crate::service::AppState;
use crate::types::{NewUser, User, UserId};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.accounts().signup(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let (token, _) = state
        .accounts()
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(TokenResponse { token }))
}

/// The caller's own account
pub async fn profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<User>> {
    Ok(Json(state.accounts().get_user(user.user_id).await?))
}

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.accounts().list_users().await?))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    ApiJson(payload): ApiJson<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.accounts().create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(user_id): Path<UserId>,
    ApiJson(payload): ApiJson<NewUser>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.accounts().update_user(user_id, payload).await?))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(user_id): Path<UserId>,
) -> ApiResult<StatusCode> {
    state.accounts().delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

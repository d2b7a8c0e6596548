use crate::api::error::ApiResult;
use crate::api::extract::{AdminUser, ApiJson, AuthUser};
use crate::service::AppState;
use crate::types::{Booking, BookingId, BookingUpdate, MatchId};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    pub match_id: MatchId,
    #[serde(default)]
    pub status: Option<String>,
}

pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Booking>>> {
    Ok(Json(state.bookings().bookings_for_user(user.user_id).await?))
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(payload): ApiJson<BookingRequest>,
) -> ApiResult<(StatusCode, Json<Booking>)> {
    let booking = state
        .bookings()
        .book(user.user_id, payload.match_id, payload.status)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Withdraw the caller from a match
pub async fn withdraw(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(match_id): Path<MatchId>,
) -> ApiResult<Json<Booking>> {
    Ok(Json(state.bookings().withdraw(user.user_id, match_id).await?))
}

pub async fn all_bookings(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<Booking>>> {
    Ok(Json(state.bookings().all_bookings().await?))
}

pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(booking_id): Path<BookingId>,
    ApiJson(update): ApiJson<BookingUpdate>,
) -> ApiResult<Json<Booking>> {
    Ok(Json(
        state.bookings().update_booking(booking_id, update).await?,
    ))
}

pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(booking_id): Path<BookingId>,
) -> ApiResult<StatusCode> {
    state.bookings().delete_booking(booking_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

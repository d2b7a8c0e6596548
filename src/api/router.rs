use crate::api::handlers::{accounts, bookings, matches, teams};
use crate::metrics;
use crate::service::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/signup", post(accounts::signup))
        .route("/login", post(accounts::login))
        .route("/profile", get(accounts::profile))
        .route(
            "/users",
            get(accounts::list_users).post(accounts::create_user),
        )
        .route(
            "/users/{id}",
            put(accounts::update_user).delete(accounts::delete_user),
        )
        .route(
            "/matches",
            get(matches::list_matches).post(matches::create_match),
        )
        .route("/matches/all", get(matches::all_matches))
        .route(
            "/matches/{id}",
            put(matches::update_match).delete(matches::delete_match),
        )
        .route("/matches/{id}/users", get(matches::match_users))
        .route("/matches/{id}/teams", get(teams::match_teams))
        .route("/matches/{id}/booking", delete(bookings::withdraw))
        .route("/matches-with-players", get(matches::matches_with_players))
        .route("/teams/divide", post(teams::divide))
        .route("/teams/divide-by-names", post(teams::divide_by_names))
        .route(
            "/bookings",
            get(bookings::my_bookings).post(bookings::create_booking),
        )
        .route("/bookings/all", get(bookings::all_bookings))
        .route(
            "/bookings/{id}",
            put(bookings::update_booking).delete(bookings::delete_booking),
        );

    Router::new()
        .merge(api_routes)
        .merge(metrics::health::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

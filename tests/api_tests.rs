//! HTTP API tests driving the router in-process

mod fixtures;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use soccer_booking::api::create_router;
use soccer_booking::service::AppState;
use std::sync::Arc;
use tower::ServiceExt; // for oneshot

use fixtures::{
    book_all, seed_match, seed_players, test_state, token_for, traced_team_ids, ADMIN_EMAIL,
    PASSWORD, TRACED_SKILLS,
};

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Send a body verbatim, bypassing JSON serialization
async fn send_raw(app: &Router, uri: &str, token: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).expect("error body is JSON");
    (status, json)
}

async fn app() -> (Router, Arc<AppState>) {
    let state = test_state().await;
    (create_router(state.clone()), state)
}

fn team_ids(team: &Value) -> Vec<i64> {
    team.as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_signup_and_login() {
    let (app, _) = app().await;

    let (status, user) = send(
        &app,
        Method::POST,
        "/signup",
        None,
        Some(json!({
            "username": "jane",
            "email": "Jane@Example.com",
            "password": "secret-pass",
            "role": "admin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["role"], "player");
    assert_eq!(user["skill_level"], 0);
    assert!(user.get("password_hash").is_none());

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({"email": "jane@example.com", "password": "secret-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, profile) = send(&app, Method::GET, "/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["username"], "jane");

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({"email": "jane@example.com", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let (app, _) = app().await;
    let payload = json!({
        "username": "dup",
        "email": "dup@example.com",
        "password": "pw"
    });

    let (status, _) = send(&app, Method::POST, "/signup", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, Method::POST, "/signup", None, Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ALREADY_EXISTS");
}

#[tokio::test]
async fn test_requests_without_token_rejected() {
    let (app, _) = app().await;

    for uri in ["/matches", "/bookings", "/matches-with-players", "/matches/1/teams"] {
        let (status, body) = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    let (status, _) = send(&app, Method::GET, "/matches", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_forbidden_for_players() {
    let (app, state) = app().await;
    let users = seed_players(&state, &[4]).await;
    let token = token_for(&state, &users[0].email).await;

    let (status, body) = send(&app, Method::GET, "/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = send(
        &app,
        Method::POST,
        "/matches",
        Some(&token),
        Some(json!({"date": "2030-01-01", "time": "18:00:00", "location": "Park"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = token_for(&state, ADMIN_EMAIL).await;
    let (status, users) = send(&app, Method::GET, "/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_admin_schedules_and_player_books() {
    let (app, state) = app().await;
    let admin = token_for(&state, ADMIN_EMAIL).await;
    let users = seed_players(&state, &[7]).await;
    let player = token_for(&state, &users[0].email).await;

    let (status, game) = send(
        &app,
        Method::POST,
        "/matches",
        Some(&admin),
        Some(json!({"date": "2099-06-01", "time": "19:00:00", "location": "North Field"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let match_id = game["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        Method::POST,
        "/matches",
        Some(&admin),
        Some(json!({"date": "2000-06-01", "time": "19:00:00", "location": "Old Field"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, upcoming) = send(&app, Method::GET, "/matches", Some(&player), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upcoming.as_array().unwrap().len(), 1);
    let (_, all) = send(&app, Method::GET, "/matches/all", Some(&admin), None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let booking_request = json!({ "match_id": match_id });
    let (status, booking) = send(
        &app,
        Method::POST,
        "/bookings",
        Some(&player),
        Some(booking_request.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["status"], "booked");

    let (status, body) = send(
        &app,
        Method::POST,
        "/bookings",
        Some(&player),
        Some(booking_request),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "DUPLICATE_BOOKING");

    let (_, listing) = send(
        &app,
        Method::GET,
        "/matches-with-players",
        Some(&player),
        None,
    )
    .await;
    assert_eq!(listing[0]["players"], json!(["player01"]));

    let (status, with_users) = send(
        &app,
        Method::GET,
        &format!("/matches/{}/users", match_id),
        Some(&player),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(with_users["users"][0]["username"], "player01");

    let uri = format!("/matches/{}/booking", match_id);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&player), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::DELETE, &uri, Some(&player), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let (_, mine) = send(&app, Method::GET, "/bookings", Some(&player), None).await;
    assert!(mine.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_booking_unknown_match_not_found() {
    let (app, state) = app().await;
    let users = seed_players(&state, &[7]).await;
    let token = token_for(&state, &users[0].email).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/bookings",
        Some(&token),
        Some(json!({ "match_id": 999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_match_teams_endpoint() {
    let (app, state) = app().await;
    let users = seed_players(&state, &TRACED_SKILLS).await;
    let game = seed_match(&state, 1).await;
    let token = token_for(&state, &users[0].email).await;
    let uri = format!("/matches/{}/teams", game.id);

    book_all(&state, &users[..12], game.id).await;
    let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "INVALID_ROSTER_SIZE");
    assert!(body["message"].as_str().unwrap().contains("18"));

    book_all(&state, &users[12..], game.id).await;
    let (status, teams) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let [team1, team2, team3] = traced_team_ids(&users);
    assert_eq!(team_ids(&teams["team1"]), team1);
    assert_eq!(team_ids(&teams["team2"]), team2);
    assert_eq!(team_ids(&teams["team3"]), team3);
    assert!(teams["team1"][0]["username"].is_string());
    assert!(teams["team1"][0]["skill_level"].is_u64());

    let (status, _) = send(&app, Method::GET, "/matches/999/teams", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_divide_ad_hoc_roster() {
    let (app, state) = app().await;
    let users = seed_players(&state, &[1]).await;
    let token = token_for(&state, &users[0].email).await;

    let players: Vec<Value> = TRACED_SKILLS
        .iter()
        .enumerate()
        .map(|(i, skill)| json!({ "id": i + 1, "skill_level": skill }))
        .collect();

    let (status, teams) = send(
        &app,
        Method::POST,
        "/teams/divide",
        Some(&token),
        Some(json!({ "players": players })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(team_ids(&teams["team1"]), vec![1, 17, 6, 15, 9, 12]);
    assert_eq!(team_ids(&teams["team2"]), vec![2, 4, 5, 7, 8, 10]);
    assert_eq!(team_ids(&teams["team3"]), vec![3, 18, 16, 14, 13, 11]);

    let (status, body) = send(
        &app,
        Method::POST,
        "/teams/divide",
        Some(&token),
        Some(json!({ "players": players[..5].to_vec() })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "INVALID_ROSTER_SIZE");

    let (status, body) = send(
        &app,
        Method::POST,
        "/teams/divide",
        Some(&token),
        Some(json!({ "players": [{ "id": 1, "skill_level": -3 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_divide_by_display_names() {
    let (app, state) = app().await;
    let users = seed_players(&state, &TRACED_SKILLS).await;
    let game = seed_match(&state, 2).await;
    book_all(&state, &users, game.id).await;
    let token = token_for(&state, &users[0].email).await;

    let (_, listing) = send(&app, Method::GET, "/matches-with-players", Some(&token), None).await;
    let names = listing[0]["players"].clone();
    assert_eq!(names.as_array().unwrap().len(), 18);

    let (status, by_names) = send(
        &app,
        Method::POST,
        "/teams/divide-by-names",
        Some(&token),
        Some(json!({ "players": names })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/matches/{}/teams", game.id);
    let (_, by_match) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(by_names, by_match);

    let (status, body) = send(
        &app,
        Method::POST,
        "/teams/divide-by-names",
        Some(&token),
        Some(json!({ "players": ["player01", "nobody"] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_malformed_bodies_get_json_errors() {
    let (app, state) = app().await;
    let users = seed_players(&state, &[4]).await;
    let token = token_for(&state, &users[0].email).await;
    let admin = token_for(&state, ADMIN_EMAIL).await;

    let (status, body) = send_raw(&app, "/bookings", &token, "{\"match_id\": ").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "INVALID_REQUEST");
    assert!(body["message"].is_string());

    let (status, body) = send_raw(&app, "/bookings", &token, r#"{"match_id": "one"}"#).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "INVALID_REQUEST");

    let (status, body) = send_raw(&app, "/matches", &admin, "not json").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_admin_deletes_user_and_bookings() {
    let (app, state) = app().await;
    let admin = token_for(&state, ADMIN_EMAIL).await;
    let users = seed_players(&state, &[2, 3]).await;
    let game = seed_match(&state, 1).await;
    book_all(&state, &users, game.id).await;
    let stale = token_for(&state, &users[0].email).await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/users/{}", users[0].id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, bookings) = send(&app, Method::GET, "/bookings/all", Some(&admin), None).await;
    let bookings = bookings.as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["user_id"], users[1].id);

    // The token outlives the account but no longer resolves to a profile
    let (status, _) = send(&app, Method::GET, "/profile", Some(&stale), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({"email": users[0].email, "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_monitoring_routes_mounted() {
    let (app, state) = app().await;
    state.start().await.unwrap();

    let (status, health) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");

    let (status, _) = send(&app, Method::GET, "/stats", None, None).await;
    assert_eq!(status, StatusCode::OK);

    state.shutdown().await.unwrap();
}

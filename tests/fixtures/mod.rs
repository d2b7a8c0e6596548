//! Shared fixtures for integration testing

#![allow(dead_code)]

use chrono::{Duration, NaiveTime};
use soccer_booking::config::{AppConfig, BootstrapAdmin};
use soccer_booking::service::AppState;
use soccer_booking::types::{Match, MatchDetails, MatchId, NewUser, Role, SkillLevel, User, UserId};
use soccer_booking::utils::today;
use soccer_booking::MATCH_CAPACITY;
use std::sync::Arc;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "password123";

/// Skill levels whose greedy division is traced by hand in the balancer tests
pub const TRACED_SKILLS: [SkillLevel; MATCH_CAPACITY] =
    [10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 1, 2, 3, 4, 5, 6, 7, 8];

/// Roster positions (1-based) of each team for [`TRACED_SKILLS`]
pub const TRACED_TEAMS: [[usize; 6]; 3] = [
    [1, 17, 6, 15, 9, 12],
    [2, 4, 5, 7, 8, 10],
    [3, 18, 16, 14, 13, 11],
];

/// Configuration suitable for tests: cheap hashing and a bootstrap admin
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.service.log_level = "warn".to_string();
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.auth.password_hash_cost = 4;
    config.auth.bootstrap_admin = Some(BootstrapAdmin {
        username: "admin".to_string(),
        email: ADMIN_EMAIL.to_string(),
        password: PASSWORD.to_string(),
    });
    config
}

/// Application state backed by in-memory stores
pub async fn test_state() -> Arc<AppState> {
    Arc::new(
        AppState::new(test_config())
            .await
            .expect("failed to build test state"),
    )
}

pub fn new_player(username: &str, skill_level: SkillLevel) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{}@example.com", username),
        password: PASSWORD.to_string(),
        role: Role::Player,
        skill_level,
    }
}

/// Sign up one player per skill level, in order
pub async fn seed_players(state: &AppState, skills: &[SkillLevel]) -> Vec<User> {
    let mut users = Vec::with_capacity(skills.len());
    for (i, &skill) in skills.iter().enumerate() {
        let user = state
            .accounts()
            .signup(new_player(&format!("player{:02}", i + 1), skill))
            .await
            .expect("failed to seed player");
        users.push(user);
    }
    users
}

/// Schedule a match `days_ahead` days from today
pub async fn seed_match(state: &AppState, days_ahead: i64) -> Match {
    state
        .schedule()
        .create_match(MatchDetails {
            date: today() + Duration::days(days_ahead),
            time: NaiveTime::from_hms_opt(19, 30, 0).expect("valid time"),
            location: "Riverside Pitch".to_string(),
        })
        .await
        .expect("failed to seed match")
}

/// Book every user onto the match, in order
pub async fn book_all(state: &AppState, users: &[User], match_id: MatchId) {
    for user in users {
        state
            .bookings()
            .book(user.id, match_id, None)
            .await
            .expect("failed to seed booking");
    }
}

/// Access token for an account seeded with [`PASSWORD`]
pub async fn token_for(state: &AppState, email: &str) -> String {
    let (token, _) = state
        .accounts()
        .login(email, PASSWORD)
        .await
        .expect("failed to log in");
    token
}

/// User ids of each team expected for [`TRACED_SKILLS`] seeded in order
pub fn traced_team_ids(users: &[User]) -> [Vec<UserId>; 3] {
    TRACED_TEAMS.map(|positions| positions.iter().map(|&p| users[p - 1].id).collect())
}

//! Common types used throughout the booking service

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for users (players and admins)
pub type UserId = i64;

/// Unique identifier for matches
pub type MatchId = i64;

/// Unique identifier for bookings
pub type BookingId = i64;

/// Skill rating of a player; non-negative by construction
pub type SkillLevel = u64;

/// Total skill of a team; wide enough that no roster can overflow it
pub type SkillSum = u128;

/// Status given to a booking when the caller does not name one
pub const DEFAULT_BOOKING_STATUS: &str = "booked";

/// Access role carried by every account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    #[serde(alias = "user")]
    Player,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Player => write!(f, "player"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "player" | "user" => Ok(Role::Player),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A registered account as held by the player record store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub skill_level: SkillLevel,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The balancer's view of this account
    pub fn as_player(&self) -> Player {
        Player {
            id: self.id,
            username: self.username.clone(),
            skill_level: self.skill_level,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Fields required to create an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub skill_level: SkillLevel,
}

/// Player information consumed by the team balancer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: UserId,
    pub username: String,
    pub skill_level: SkillLevel,
}

/// A scheduled match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
}

impl Match {
    /// Matches on or after `today` are listed as upcoming
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.date >= today
    }
}

/// Fields required to create or replace a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
}

/// A single (user, match) booking held by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub match_id: MatchId,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Replacement fields for an admin booking update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingUpdate {
    pub user_id: UserId,
    pub match_id: MatchId,
    pub status: String,
}

/// Players assigned together by the balancer, in assignment order
pub type Team = Vec<Player>;

/// The three teams produced for one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancedTeams {
    pub team1: Team,
    pub team2: Team,
    pub team3: Team,
}

impl BalancedTeams {
    /// Teams in index order
    pub fn teams(&self) -> [&Team; 3] {
        [&self.team1, &self.team2, &self.team3]
    }

    /// Skill sum per team, in index order
    pub fn skill_sums(&self) -> [SkillSum; 3] {
        self.teams().map(|team| team_skill_sum(team))
    }

    /// Difference between the strongest and weakest team
    pub fn skill_spread(&self) -> SkillSum {
        let sums = self.skill_sums();
        let max = sums.iter().copied().max().unwrap_or(0);
        let min = sums.iter().copied().min().unwrap_or(0);
        max - min
    }

    /// Number of players per team, in index order
    pub fn sizes(&self) -> [usize; 3] {
        self.teams().map(|team| team.len())
    }
}

/// Sum of skill levels for a team
pub fn team_skill_sum(team: &[Player]) -> SkillSum {
    team.iter().map(|p| SkillSum::from(p.skill_level)).sum()
}

/// A match with the display names of its booked players
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchWithPlayers {
    pub id: MatchId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub players: Vec<String>,
}

/// A match with the full records of its booked users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchWithUsers {
    pub id: MatchId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub users: Vec<User>,
}

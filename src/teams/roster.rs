//! Validated rosters for team division

use crate::error::BookingError;
use crate::teams::balancer::REQUIRED_ROSTER_SIZE;
use crate::types::{MatchId, Player, SkillLevel, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An ordered list of distinct players, optionally tied to a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    match_id: Option<MatchId>,
    players: Vec<Player>,
}

impl Roster {
    /// Build an ad-hoc roster, rejecting repeated player ids
    pub fn new(players: Vec<Player>) -> Result<Self, BookingError> {
        let mut seen = HashSet::with_capacity(players.len());
        for player in &players {
            if !seen.insert(player.id) {
                return Err(BookingError::InvalidRequest {
                    reason: format!("player {} appears more than once in the roster", player.id),
                });
            }
        }

        Ok(Self {
            match_id: None,
            players,
        })
    }

    /// Roster assembled from a match's bookings
    pub fn for_match(match_id: MatchId, players: Vec<Player>) -> Result<Self, BookingError> {
        let mut roster = Self::new(players)?;
        roster.match_id = Some(match_id);
        Ok(roster)
    }

    pub fn match_id(&self) -> Option<MatchId> {
        self.match_id
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Whether the roster can be divided into teams
    pub fn is_complete(&self) -> bool {
        self.players.len() == REQUIRED_ROSTER_SIZE
    }

    /// Players still needed before division; zero once complete or over
    pub fn open_slots(&self) -> usize {
        REQUIRED_ROSTER_SIZE.saturating_sub(self.players.len())
    }
}

/// One player as submitted in a roster payload
#[derive(Debug, Clone, Deserialize)]
pub struct RosterEntry {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(alias = "skill")]
    pub skill_level: SkillLevel,
}

impl From<RosterEntry> for Player {
    fn from(entry: RosterEntry) -> Self {
        let username = entry
            .username
            .unwrap_or_else(|| format!("player-{}", entry.id));
        Player {
            id: entry.id,
            username,
            skill_level: entry.skill_level,
        }
    }
}

/// Roster payload accepted over HTTP and from roster files
///
/// Either `{"players": [...]}` or a bare array of players.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RosterPayload {
    Wrapped { players: Vec<RosterEntry> },
    Bare(Vec<RosterEntry>),
}

impl RosterPayload {
    /// Parse and validate a JSON roster
    pub fn parse(json: &str) -> Result<Roster, BookingError> {
        let payload: RosterPayload =
            serde_json::from_str(json).map_err(|e| BookingError::InvalidRequest {
                reason: format!(
                    "roster must be a list of players with id and non-negative integer skill_level: {}",
                    e
                ),
            })?;
        payload.try_into()
    }

    fn into_entries(self) -> Vec<RosterEntry> {
        match self {
            RosterPayload::Wrapped { players } => players,
            RosterPayload::Bare(players) => players,
        }
    }
}

impl TryFrom<RosterPayload> for Roster {
    type Error = BookingError;

    fn try_from(payload: RosterPayload) -> Result<Self, Self::Error> {
        let players = payload.into_entries().into_iter().map(Player::from).collect();
        Roster::new(players)
    }
}

//! Team division for full matches
//!
//! This module provides:
//! - Greedy skill balancing of an 18-player roster into three teams
//! - Validated rosters built from bookings or submitted payloads

pub mod balancer;
pub mod roster;

pub use balancer::{
    balance, GreedyTeamBalancer, TeamBalancer, REQUIRED_ROSTER_SIZE, TEAM_COUNT, TEAM_SIZE,
};
pub use roster::{Roster, RosterEntry, RosterPayload};

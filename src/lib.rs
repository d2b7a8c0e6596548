//! Soccer Booking - match scheduling and booking for recreational soccer
//!
//! This crate provides player accounts, match scheduling, a capacity-checked
//! booking ledger and a greedy balancer that divides a full 18-player roster
//! into three teams of comparable total skill.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod service;
pub mod store;
pub mod teams;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{BookingError, Result};
pub use types::*;

// Re-export key components
pub use service::AppState;
pub use store::{BookingLedger, MatchStore, PlayerRecordStore, MATCH_CAPACITY};
pub use teams::{balance, GreedyTeamBalancer, Roster, TeamBalancer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

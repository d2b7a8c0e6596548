//! Error types for the booking service
//!
//! Domain failures are `BookingError` variants; service layers carry them
//! inside `anyhow::Error` and the HTTP layer downcasts to pick a status code.

use crate::types::{BookingId, MatchId, UserId};

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific booking scenarios
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("There must be exactly {required} players to divide into teams (found {actual})")]
    InvalidRosterSize { actual: usize, required: usize },

    #[error("User {user_id} is already booked for match {match_id}")]
    DuplicateBooking { user_id: UserId, match_id: MatchId },

    #[error("Maximum number of players ({capacity}) for match {match_id} has been reached")]
    CapacityExceeded { match_id: MatchId, capacity: usize },

    #[error("Booking not found: {booking_id}")]
    BookingNotFound { booking_id: BookingId },

    #[error("User {user_id} is not signed up for match {match_id}")]
    NotSignedUp { user_id: UserId, match_id: MatchId },

    #[error("Match not found: {match_id}")]
    MatchNotFound { match_id: MatchId },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: UserId },

    #[error("Username already taken: {username}")]
    UsernameTaken { username: String },

    #[error("Email already registered: {email}")]
    EmailTaken { email: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal service error: {message}")]
    Internal { message: String },
}

impl BookingError {
    /// Zero players is the degenerate case of a wrong-sized roster
    pub fn is_empty_roster(&self) -> bool {
        matches!(self, BookingError::InvalidRosterSize { actual: 0, .. })
    }

    /// Whether the caller can fix this by changing input or waiting
    pub fn is_rejected_action(&self) -> bool {
        matches!(
            self,
            BookingError::DuplicateBooking { .. }
                | BookingError::CapacityExceeded { .. }
                | BookingError::InvalidRosterSize { .. }
        )
    }

    pub(crate) fn lock_poisoned(what: &str) -> Self {
        BookingError::Storage {
            message: format!("Failed to acquire {} lock", what),
        }
    }
}

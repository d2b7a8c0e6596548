//! Utility functions for the booking service

use chrono::{DateTime, NaiveDate, Utc};

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Today's date in UTC, used for upcoming-match filtering
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Normalize an email address for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

//! Storage collaborators
//!
//! Each store is a trait with an in-memory implementation. A database-backed
//! implementation only has to satisfy the same traits.

pub mod bookings;
pub mod matches;
pub mod users;

pub use bookings::{BookingLedger, InMemoryBookingLedger, MATCH_CAPACITY};
pub use matches::{InMemoryMatchStore, MatchStore};
pub use users::{InMemoryPlayerRecordStore, PlayerRecordStore, UserRecord};

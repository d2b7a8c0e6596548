//! Booking ledger
//!
//! Holds (user, match) bookings and enforces the two booking rules:
//! - a user holds at most one booking per match
//! - a match holds at most [`MATCH_CAPACITY`] bookings
//!
//! Both checks and the insert happen under one write lock, so concurrent
//! requests for the same match are serialized and neither rule can be
//! bypassed by a race.
//!
//! A booking is only written while its user and match exist. The reference
//! check and the write share a gate with the cascading removals, so a
//! booking never outlives a deleted account or match.

use crate::error::{BookingError, Result};
use crate::store::matches::MatchStore;
use crate::store::users::PlayerRecordStore;
use crate::teams::REQUIRED_ROSTER_SIZE;
use crate::types::{Booking, BookingId, BookingUpdate, MatchId, Player, UserId};
use crate::utils::current_timestamp;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Maximum bookings per match; equal to the balancer's roster size
pub const MATCH_CAPACITY: usize = REQUIRED_ROSTER_SIZE;

/// Storage interface for bookings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// Book `user_id` into `match_id`
    ///
    /// Fails with `MatchNotFound` or `UserNotFound` if either side is gone,
    /// then with `DuplicateBooking` if the pair exists and with
    /// `CapacityExceeded` if the match is full, in that order.
    async fn create_booking(
        &self,
        user_id: UserId,
        match_id: MatchId,
        status: &str,
    ) -> Result<Booking>;

    /// Remove the caller's own booking for a match
    async fn withdraw(&self, user_id: UserId, match_id: MatchId) -> Result<Booking>;

    async fn get_booking(&self, booking_id: BookingId) -> Result<Option<Booking>>;

    /// Replace a booking; the new pair obeys the same rules as creation,
    /// including the reference check
    async fn update_booking(&self, booking_id: BookingId, update: BookingUpdate)
        -> Result<Booking>;

    /// Remove a booking by id, returning whether it existed
    async fn delete_booking(&self, booking_id: BookingId) -> Result<bool>;

    /// Bookings for a match in the order they were made
    async fn bookings_for_match(&self, match_id: MatchId) -> Result<Vec<Booking>>;

    async fn bookings_for_user(&self, user_id: UserId) -> Result<Vec<Booking>>;

    async fn all_bookings(&self) -> Result<Vec<Booking>>;

    async fn booking_count(&self, match_id: MatchId) -> Result<usize>;

    /// Booked players for a match, joined with their records, in booking order
    async fn roster_for_match(&self, match_id: MatchId) -> Result<Vec<Player>>;

    /// Cascade for a deleted account; call after the record is removed
    async fn remove_user_bookings(&self, user_id: UserId) -> Result<usize>;

    /// Cascade for a deleted match; call after the match is removed
    async fn remove_match_bookings(&self, match_id: MatchId) -> Result<usize>;

    fn capacity(&self) -> usize {
        MATCH_CAPACITY
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    next_id: BookingId,
    bookings: BTreeMap<BookingId, Booking>,
}

impl LedgerState {
    fn count_for_match(&self, match_id: MatchId) -> usize {
        self.bookings
            .values()
            .filter(|b| b.match_id == match_id)
            .count()
    }

    fn find(&self, user_id: UserId, match_id: MatchId) -> Option<BookingId> {
        self.bookings
            .values()
            .find(|b| b.user_id == user_id && b.match_id == match_id)
            .map(|b| b.id)
    }

    fn remove_where(&mut self, keep: impl Fn(&Booking) -> bool) -> usize {
        let before = self.bookings.len();
        self.bookings.retain(|_, booking| keep(booking));
        before - self.bookings.len()
    }
}

/// In-memory booking ledger
pub struct InMemoryBookingLedger {
    state: RwLock<LedgerState>,
    records: Arc<dyn PlayerRecordStore>,
    matches: Arc<dyn MatchStore>,
    /// Held across reference check plus write, and across cascades
    gate: Mutex<()>,
    capacity: usize,
}

impl InMemoryBookingLedger {
    pub fn new(records: Arc<dyn PlayerRecordStore>, matches: Arc<dyn MatchStore>) -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            records,
            matches,
            gate: Mutex::new(()),
            capacity: MATCH_CAPACITY,
        }
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, LedgerState>> {
        self.state
            .write()
            .map_err(|_| BookingError::lock_poisoned("bookings write").into())
    }

    /// Caller must hold `gate`
    async fn check_references(&self, user_id: UserId, match_id: MatchId) -> Result<()> {
        if self.matches.get_match(match_id).await?.is_none() {
            return Err(BookingError::MatchNotFound { match_id }.into());
        }
        if self.records.get_user(user_id).await?.is_none() {
            return Err(BookingError::UserNotFound { user_id }.into());
        }
        Ok(())
    }

    fn insert_booking(
        &self,
        user_id: UserId,
        match_id: MatchId,
        status: &str,
    ) -> Result<Booking> {
        let mut state = self.write_state()?;

        if state.find(user_id, match_id).is_some() {
            return Err(BookingError::DuplicateBooking { user_id, match_id }.into());
        }
        if state.count_for_match(match_id) >= self.capacity {
            return Err(BookingError::CapacityExceeded {
                match_id,
                capacity: self.capacity,
            }
            .into());
        }

        state.next_id += 1;
        let booking = Booking {
            id: state.next_id,
            user_id,
            match_id,
            status: status.to_string(),
            created_at: current_timestamp(),
        };
        state.bookings.insert(booking.id, booking.clone());

        debug!(
            "Booking {} created: user {} in match {} ({}/{})",
            booking.id,
            user_id,
            match_id,
            state.count_for_match(match_id),
            self.capacity
        );
        Ok(booking)
    }

    fn apply_update(&self, booking_id: BookingId, update: BookingUpdate) -> Result<Booking> {
        let mut state = self.write_state()?;

        let current = state
            .bookings
            .get(&booking_id)
            .cloned()
            .ok_or(BookingError::BookingNotFound { booking_id })?;

        if let Some(other) = state.find(update.user_id, update.match_id) {
            if other != booking_id {
                return Err(BookingError::DuplicateBooking {
                    user_id: update.user_id,
                    match_id: update.match_id,
                }
                .into());
            }
        }
        if current.match_id != update.match_id
            && state.count_for_match(update.match_id) >= self.capacity
        {
            return Err(BookingError::CapacityExceeded {
                match_id: update.match_id,
                capacity: self.capacity,
            }
            .into());
        }

        let booking = state
            .bookings
            .get_mut(&booking_id)
            .ok_or(BookingError::BookingNotFound { booking_id })?;
        booking.user_id = update.user_id;
        booking.match_id = update.match_id;
        booking.status = update.status;

        Ok(booking.clone())
    }
}

#[async_trait]
impl BookingLedger for InMemoryBookingLedger {
    async fn create_booking(
        &self,
        user_id: UserId,
        match_id: MatchId,
        status: &str,
    ) -> Result<Booking> {
        let _gate = self.gate.lock().await;
        self.check_references(user_id, match_id).await?;
        self.insert_booking(user_id, match_id, status)
    }

    async fn withdraw(&self, user_id: UserId, match_id: MatchId) -> Result<Booking> {
        let mut state = self
            .state
            .write()
            .map_err(|_| BookingError::lock_poisoned("bookings write"))?;

        let booking = state
            .find(user_id, match_id)
            .and_then(|id| state.bookings.remove(&id))
            .ok_or(BookingError::NotSignedUp { user_id, match_id })?;

        Ok(booking)
    }

    async fn get_booking(&self, booking_id: BookingId) -> Result<Option<Booking>> {
        let state = self
            .state
            .read()
            .map_err(|_| BookingError::lock_poisoned("bookings read"))?;

        Ok(state.bookings.get(&booking_id).cloned())
    }

    async fn update_booking(
        &self,
        booking_id: BookingId,
        update: BookingUpdate,
    ) -> Result<Booking> {
        let _gate = self.gate.lock().await;
        self.check_references(update.user_id, update.match_id)
            .await?;
        self.apply_update(booking_id, update)
    }

    async fn delete_booking(&self, booking_id: BookingId) -> Result<bool> {
        let mut state = self
            .state
            .write()
            .map_err(|_| BookingError::lock_poisoned("bookings write"))?;

        Ok(state.bookings.remove(&booking_id).is_some())
    }

    async fn bookings_for_match(&self, match_id: MatchId) -> Result<Vec<Booking>> {
        let state = self
            .state
            .read()
            .map_err(|_| BookingError::lock_poisoned("bookings read"))?;

        // Ids are assigned in creation order
        Ok(state
            .bookings
            .values()
            .filter(|b| b.match_id == match_id)
            .cloned()
            .collect())
    }

    async fn bookings_for_user(&self, user_id: UserId) -> Result<Vec<Booking>> {
        let state = self
            .state
            .read()
            .map_err(|_| BookingError::lock_poisoned("bookings read"))?;

        Ok(state
            .bookings
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn all_bookings(&self) -> Result<Vec<Booking>> {
        let state = self
            .state
            .read()
            .map_err(|_| BookingError::lock_poisoned("bookings read"))?;

        Ok(state.bookings.values().cloned().collect())
    }

    async fn booking_count(&self, match_id: MatchId) -> Result<usize> {
        let state = self
            .state
            .read()
            .map_err(|_| BookingError::lock_poisoned("bookings read"))?;

        Ok(state.count_for_match(match_id))
    }

    async fn roster_for_match(&self, match_id: MatchId) -> Result<Vec<Player>> {
        let user_ids: Vec<UserId> = self
            .bookings_for_match(match_id)
            .await?
            .into_iter()
            .map(|b| b.user_id)
            .collect();

        let users = self.records.get_users(&user_ids).await?;

        let mut roster = Vec::with_capacity(user_ids.len());
        for user_id in user_ids {
            match users.get(&user_id) {
                Some(user) => roster.push(user.as_player()),
                None => warn!(
                    "Booking for match {} references missing user {}",
                    match_id, user_id
                ),
            }
        }

        Ok(roster)
    }

    async fn remove_user_bookings(&self, user_id: UserId) -> Result<usize> {
        let _gate = self.gate.lock().await;
        let mut state = self.write_state()?;

        Ok(state.remove_where(|b| b.user_id != user_id))
    }

    async fn remove_match_bookings(&self, match_id: MatchId) -> Result<usize> {
        let _gate = self.gate.lock().await;
        let mut state = self.write_state()?;

        Ok(state.remove_where(|b| b.match_id != match_id))
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

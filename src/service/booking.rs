//! Booking orchestration
//!
//! The ledger checks that the user and match exist and applies its
//! uniqueness and capacity rules; this layer logs the outcome and records
//! booking traffic.

use crate::error::{BookingError, Result};
use crate::metrics::MetricsCollector;
use crate::store::BookingLedger;
use crate::types::{Booking, BookingId, BookingUpdate, MatchId, UserId};
use std::sync::Arc;
use tracing::{info, warn};

/// Write-side service for bookings
#[derive(Clone)]
pub struct BookingService {
    ledger: Arc<dyn BookingLedger>,
    metrics: Option<Arc<MetricsCollector>>,
    default_status: String,
}

impl BookingService {
    pub fn new(ledger: Arc<dyn BookingLedger>, default_status: impl Into<String>) -> Self {
        Self {
            ledger,
            metrics: None,
            default_status: default_status.into(),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Book `user_id` into `match_id`
    pub async fn book(
        &self,
        user_id: UserId,
        match_id: MatchId,
        status: Option<String>,
    ) -> Result<Booking> {
        let status = status.unwrap_or_else(|| self.default_status.clone());

        let result = self.ledger.create_booking(user_id, match_id, &status).await;

        match &result {
            Ok(booking) => {
                info!(
                    "User {} booked into match {} (booking {})",
                    user_id, match_id, booking.id
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_booking_created();
                }
            }
            Err(e) => {
                let rejected = e
                    .downcast_ref::<BookingError>()
                    .is_some_and(BookingError::is_rejected_action);
                if rejected {
                    info!(
                        "Booking refused for user {} in match {}: {}",
                        user_id, match_id, e
                    );
                } else {
                    warn!(
                        "Booking failed for user {} in match {}: {}",
                        user_id, match_id, e
                    );
                }
                if let Some(metrics) = &self.metrics {
                    metrics.record_booking_rejected(e);
                }
            }
        }

        result
    }

    /// Withdraw `user_id` from `match_id`
    pub async fn withdraw(&self, user_id: UserId, match_id: MatchId) -> Result<Booking> {
        let booking = self.ledger.withdraw(user_id, match_id).await?;

        info!("User {} withdrew from match {}", user_id, match_id);
        if let Some(metrics) = &self.metrics {
            metrics.record_withdrawal();
        }

        Ok(booking)
    }

    pub async fn bookings_for_user(&self, user_id: UserId) -> Result<Vec<Booking>> {
        self.ledger.bookings_for_user(user_id).await
    }

    pub async fn all_bookings(&self) -> Result<Vec<Booking>> {
        self.ledger.all_bookings().await
    }

    /// Replace a booking; the target user and match must exist
    pub async fn update_booking(
        &self,
        booking_id: BookingId,
        update: BookingUpdate,
    ) -> Result<Booking> {
        let booking = self.ledger.update_booking(booking_id, update).await?;
        info!("Booking {} updated", booking_id);
        Ok(booking)
    }

    pub async fn delete_booking(&self, booking_id: BookingId) -> Result<()> {
        if !self.ledger.delete_booking(booking_id).await? {
            return Err(BookingError::BookingNotFound { booking_id }.into());
        }
        info!("Booking {} deleted", booking_id);
        Ok(())
    }
}

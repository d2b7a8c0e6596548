//! Match scheduling

use crate::error::{BookingError, Result};
use crate::store::{BookingLedger, MatchStore};
use crate::types::{Match, MatchDetails, MatchId};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

/// Service for creating, listing and removing matches
#[derive(Clone)]
pub struct ScheduleService {
    matches: Arc<dyn MatchStore>,
    ledger: Arc<dyn BookingLedger>,
}

impl ScheduleService {
    pub fn new(matches: Arc<dyn MatchStore>, ledger: Arc<dyn BookingLedger>) -> Self {
        Self { matches, ledger }
    }

    pub async fn create_match(&self, details: MatchDetails) -> Result<Match> {
        let details = validate(details)?;
        let game = self.matches.create_match(details).await?;
        info!(
            "Scheduled match {} at {} on {} {}",
            game.id, game.location, game.date, game.time
        );
        Ok(game)
    }

    /// Matches dated on or after `today`
    pub async fn upcoming_matches(&self, today: NaiveDate) -> Result<Vec<Match>> {
        self.matches.upcoming_matches(today).await
    }

    pub async fn all_matches(&self) -> Result<Vec<Match>> {
        self.matches.list_matches().await
    }

    pub async fn update_match(&self, match_id: MatchId, details: MatchDetails) -> Result<Match> {
        let details = validate(details)?;
        let game = self.matches.update_match(match_id, details).await?;
        info!("Rescheduled match {}", game.id);
        Ok(game)
    }

    /// Remove a match together with its bookings
    pub async fn delete_match(&self, match_id: MatchId) -> Result<()> {
        if !self.matches.delete_match(match_id).await? {
            return Err(BookingError::MatchNotFound { match_id }.into());
        }
        let removed = self.ledger.remove_match_bookings(match_id).await?;
        info!("Deleted match {} and {} bookings", match_id, removed);
        Ok(())
    }
}

fn validate(details: MatchDetails) -> Result<MatchDetails> {
    let location = details.location.trim().to_string();
    if location.is_empty() {
        return Err(BookingError::InvalidRequest {
            reason: "location is required".to_string(),
        }
        .into());
    }
    Ok(MatchDetails { location, ..details })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{PlayerRecordStore,
        InMemoryBookingLedger, InMemoryMatchStore, InMemoryPlayerRecordStore, UserRecord,
    };
    use crate::types::Role;
    use chrono::NaiveTime;

    fn details(day: u32, location: &str) -> MatchDetails {
        MatchDetails {
            date: NaiveDate::from_ymd_opt(2024, 8, day).unwrap(),
            time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            location: location.to_string(),
        }
    }

    #[tokio::test]
    async fn test_delete_match_cascades() {
        let records = Arc::new(InMemoryPlayerRecordStore::new());
        let matches = Arc::new(InMemoryMatchStore::new());
        let ledger: Arc<dyn BookingLedger> =
            Arc::new(InMemoryBookingLedger::new(records.clone(), matches.clone()));
        let service = ScheduleService::new(matches, ledger.clone());

        let game = service.create_match(details(1, "Local Stadium")).await.unwrap();
        for name in ["ana", "ben"] {
            let user = records
                .create_user(UserRecord {
                    username: name.to_string(),
                    email: format!("{}@example.com", name),
                    password_hash: "hash".to_string(),
                    role: Role::Player,
                    skill_level: 3,
                })
                .await
                .unwrap();
            ledger.create_booking(user.id, game.id, "booked").await.unwrap();
        }

        service.delete_match(game.id).await.unwrap();
        assert_eq!(ledger.booking_count(game.id).await.unwrap(), 0);
        assert!(service.delete_match(game.id).await.is_err());
    }

    #[tokio::test]
    async fn test_listing_and_validation() {
        let matches = Arc::new(InMemoryMatchStore::new());
        let ledger = Arc::new(InMemoryBookingLedger::new(
            Arc::new(InMemoryPlayerRecordStore::new()),
            matches.clone(),
        ));
        let service = ScheduleService::new(matches, ledger);

        service.create_match(details(1, "Old Field")).await.unwrap();
        service.create_match(details(20, " New Field ")).await.unwrap();
        assert!(service.create_match(details(5, "   ")).await.is_err());

        let upcoming = service
            .upcoming_matches(NaiveDate::from_ymd_opt(2024, 8, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].location, "New Field");
        assert_eq!(service.all_matches().await.unwrap().len(), 2);
    }
}

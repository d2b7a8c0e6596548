//! Match schedule storage

use crate::error::{BookingError, Result};
use crate::types::{Match, MatchDetails, MatchId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Storage interface for scheduled matches
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn create_match(&self, details: MatchDetails) -> Result<Match>;

    async fn get_match(&self, match_id: MatchId) -> Result<Option<Match>>;

    /// Every match ordered by date, time, then id
    async fn list_matches(&self) -> Result<Vec<Match>>;

    /// Matches dated on or after `today`, in schedule order
    async fn upcoming_matches(&self, today: NaiveDate) -> Result<Vec<Match>>;

    async fn update_match(&self, match_id: MatchId, details: MatchDetails) -> Result<Match>;

    /// Remove a match, returning whether it existed
    async fn delete_match(&self, match_id: MatchId) -> Result<bool>;

    async fn match_count(&self) -> Result<usize>;
}

#[derive(Debug, Default)]
struct MatchTable {
    next_id: MatchId,
    matches: BTreeMap<MatchId, Match>,
}

/// In-memory match store
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    table: RwLock<MatchTable>,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn schedule_order(matches: &mut [Match]) {
    matches.sort_by(|a, b| (a.date, a.time, a.id).cmp(&(b.date, b.time, b.id)));
}

#[async_trait]
impl MatchStore for InMemoryMatchStore {
    async fn create_match(&self, details: MatchDetails) -> Result<Match> {
        let mut table = self
            .table
            .write()
            .map_err(|_| BookingError::lock_poisoned("matches write"))?;

        table.next_id += 1;
        let game = Match {
            id: table.next_id,
            date: details.date,
            time: details.time,
            location: details.location,
        };
        table.matches.insert(game.id, game.clone());

        Ok(game)
    }

    async fn get_match(&self, match_id: MatchId) -> Result<Option<Match>> {
        let table = self
            .table
            .read()
            .map_err(|_| BookingError::lock_poisoned("matches read"))?;

        Ok(table.matches.get(&match_id).cloned())
    }

    async fn list_matches(&self) -> Result<Vec<Match>> {
        let table = self
            .table
            .read()
            .map_err(|_| BookingError::lock_poisoned("matches read"))?;

        let mut matches: Vec<Match> = table.matches.values().cloned().collect();
        schedule_order(&mut matches);
        Ok(matches)
    }

    async fn upcoming_matches(&self, today: NaiveDate) -> Result<Vec<Match>> {
        let table = self
            .table
            .read()
            .map_err(|_| BookingError::lock_poisoned("matches read"))?;

        let mut matches: Vec<Match> = table
            .matches
            .values()
            .filter(|game| game.is_upcoming(today))
            .cloned()
            .collect();
        schedule_order(&mut matches);
        Ok(matches)
    }

    async fn update_match(&self, match_id: MatchId, details: MatchDetails) -> Result<Match> {
        let mut table = self
            .table
            .write()
            .map_err(|_| BookingError::lock_poisoned("matches write"))?;

        let game = table
            .matches
            .get_mut(&match_id)
            .ok_or(BookingError::MatchNotFound { match_id })?;
        game.date = details.date;
        game.time = details.time;
        game.location = details.location;

        Ok(game.clone())
    }

    async fn delete_match(&self, match_id: MatchId) -> Result<bool> {
        let mut table = self
            .table
            .write()
            .map_err(|_| BookingError::lock_poisoned("matches write"))?;

        Ok(table.matches.remove(&match_id).is_some())
    }

    async fn match_count(&self) -> Result<usize> {
        let table = self
            .table
            .read()
            .map_err(|_| BookingError::lock_poisoned("matches read"))?;

        Ok(table.matches.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn details(y: i32, m: u32, d: u32, hour: u32, location: &str) -> MatchDetails {
        MatchDetails {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            location: location.to_string(),
        }
    }

    #[tokio::test]
    async fn test_schedule_order_and_upcoming() {
        let store = InMemoryMatchStore::new();
        store
            .create_match(details(2024, 8, 10, 18, "North Field"))
            .await
            .unwrap();
        store
            .create_match(details(2024, 8, 1, 15, "Local Stadium"))
            .await
            .unwrap();
        store
            .create_match(details(2024, 8, 10, 9, "South Field"))
            .await
            .unwrap();

        let all = store.list_matches().await.unwrap();
        let ids: Vec<MatchId> = all.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        let upcoming = store
            .upcoming_matches(NaiveDate::from_ymd_opt(2024, 8, 10).unwrap())
            .await
            .unwrap();
        let ids: Vec<MatchId> = upcoming.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = InMemoryMatchStore::new();
        let game = store
            .create_match(details(2024, 8, 1, 15, "Local Stadium"))
            .await
            .unwrap();

        let updated = store
            .update_match(game.id, details(2024, 9, 1, 16, "Indoor Arena"))
            .await
            .unwrap();
        assert_eq!(updated.location, "Indoor Arena");

        let err = store
            .update_match(99, details(2024, 9, 1, 16, "Nowhere"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BookingError>(),
            Some(BookingError::MatchNotFound { match_id: 99 })
        ));

        assert!(store.delete_match(game.id).await.unwrap());
        assert_eq!(store.match_count().await.unwrap(), 0);
    }
}

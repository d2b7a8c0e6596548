//! Match queries and team division
//!
//! `MatchQueryService` joins the booking ledger with player records and
//! hands full rosters to the team balancer. Every collaborator is injected
//! at construction.

use crate::error::{BookingError, Result};
use crate::metrics::MetricsCollector;
use crate::store::{BookingLedger, MatchStore, PlayerRecordStore};
use crate::teams::{Roster, TeamBalancer};
use crate::types::{BalancedTeams, Match, MatchId, MatchWithPlayers, MatchWithUsers};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Read-side service over matches, bookings and teams
#[derive(Clone)]
pub struct MatchQueryService {
    ledger: Arc<dyn BookingLedger>,
    records: Arc<dyn PlayerRecordStore>,
    matches: Arc<dyn MatchStore>,
    balancer: Arc<dyn TeamBalancer>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl MatchQueryService {
    pub fn new(
        ledger: Arc<dyn BookingLedger>,
        records: Arc<dyn PlayerRecordStore>,
        matches: Arc<dyn MatchStore>,
        balancer: Arc<dyn TeamBalancer>,
    ) -> Self {
        Self {
            ledger,
            records,
            matches,
            balancer,
            metrics: None,
        }
    }

    /// Record balancing outcomes in `metrics`
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Current roster for an existing match
    pub async fn roster_for_match(&self, match_id: MatchId) -> Result<Roster> {
        self.require_match(match_id).await?;
        let players = self.ledger.roster_for_match(match_id).await?;
        Ok(Roster::for_match(match_id, players)?)
    }

    /// Divide a match's booked players into three teams
    ///
    /// A roster that is not exactly full fails with `InvalidRosterSize`,
    /// passed through unchanged.
    pub async fn get_teams_for_match(&self, match_id: MatchId) -> Result<BalancedTeams> {
        let timer = self.metrics.as_ref().map(|m| m.start_timer());

        let outcome = match self.roster_for_match(match_id).await {
            Ok(roster) => {
                if !roster.is_complete() {
                    debug!(
                        "Match {} has {} players, {} slots open",
                        match_id,
                        roster.len(),
                        roster.open_slots()
                    );
                }
                self.balancer
                    .balance(roster.players())
                    .map_err(anyhow::Error::from)
            }
            Err(e) => Err(e),
        };

        if let (Some(metrics), Some(timer)) = (&self.metrics, timer) {
            let spread = outcome.as_ref().ok().map(BalancedTeams::skill_spread);
            metrics.record_balance(spread, timer.stop());
        }

        match &outcome {
            Ok(teams) => info!(
                "Divided match {} into teams with skill sums {:?}",
                match_id,
                teams.skill_sums()
            ),
            Err(e) => debug!("Team division for match {} refused: {}", match_id, e),
        }

        outcome
    }

    /// Divide a submitted roster into three teams
    pub fn divide_roster(&self, roster: &Roster) -> Result<BalancedTeams> {
        let timer = self.metrics.as_ref().map(|m| m.start_timer());
        let outcome = self.balancer.balance(roster.players());

        if let (Some(metrics), Some(timer)) = (&self.metrics, timer) {
            let spread = outcome.as_ref().ok().map(BalancedTeams::skill_spread);
            metrics.record_balance(spread, timer.stop());
        }

        Ok(outcome?)
    }

    /// Matches with the display names of their booked players
    ///
    /// `upcoming_from` restricts the listing to matches dated on or after it.
    pub async fn matches_with_players(
        &self,
        upcoming_from: Option<NaiveDate>,
    ) -> Result<Vec<MatchWithPlayers>> {
        let matches = match upcoming_from {
            Some(today) => self.matches.upcoming_matches(today).await?,
            None => self.matches.list_matches().await?,
        };

        let mut listing = Vec::with_capacity(matches.len());
        for game in matches {
            let players = self
                .ledger
                .roster_for_match(game.id)
                .await?
                .into_iter()
                .map(|p| p.username)
                .collect();
            listing.push(MatchWithPlayers {
                id: game.id,
                date: game.date,
                time: game.time,
                location: game.location,
                players,
            });
        }

        Ok(listing)
    }

    /// A match with the full records of its booked users
    pub async fn match_users(&self, match_id: MatchId) -> Result<MatchWithUsers> {
        let game = self.require_match(match_id).await?;

        let user_ids: Vec<_> = self
            .ledger
            .bookings_for_match(match_id)
            .await?
            .into_iter()
            .map(|b| b.user_id)
            .collect();
        let mut found = self.records.get_users(&user_ids).await?;
        let users = user_ids
            .iter()
            .filter_map(|id| found.remove(id))
            .collect();

        Ok(MatchWithUsers {
            id: game.id,
            date: game.date,
            time: game.time,
            location: game.location,
            users,
        })
    }

    /// Build a roster from the display names of a `matches-with-players` entry
    pub async fn roster_from_display_names(&self, names: &[String]) -> Result<Roster> {
        let mut players = Vec::with_capacity(names.len());
        for name in names {
            match self.records.find_by_username(name).await? {
                Some(user) => players.push(user.as_player()),
                None => {
                    warn!("No player record for display name '{}'", name);
                    return Err(BookingError::InvalidRequest {
                        reason: format!("unknown player '{}'", name),
                    }
                    .into());
                }
            }
        }
        Ok(Roster::new(players)?)
    }

    async fn require_match(&self, match_id: MatchId) -> Result<Match> {
        self.matches
            .get_match(match_id)
            .await?
            .ok_or_else(|| BookingError::MatchNotFound { match_id }.into())
    }
}

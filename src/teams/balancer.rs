//! Skill-balanced team division
//!
//! Splits a full match roster into three teams using greedy
//! longest-processing-time assignment: players are taken strongest first and
//! each one joins the team with the smallest running skill sum.

use crate::error::BookingError;
use crate::types::{BalancedTeams, Player, SkillSum, Team};
use tracing::debug;

/// Number of teams formed per match
pub const TEAM_COUNT: usize = 3;

/// Nominal players per team
pub const TEAM_SIZE: usize = 6;

/// Exact roster size the balancer accepts
pub const REQUIRED_ROSTER_SIZE: usize = TEAM_COUNT * TEAM_SIZE;

/// Trait for team division algorithms
pub trait TeamBalancer: Send + Sync {
    /// Partition `players` into three teams
    ///
    /// Fails with `InvalidRosterSize` without doing any work when the roster
    /// does not hold exactly the required number of players.
    fn balance(&self, players: &[Player]) -> Result<BalancedTeams, BookingError>;

    /// Roster size this balancer requires
    fn required_size(&self) -> usize {
        REQUIRED_ROSTER_SIZE
    }
}

/// Greedy descending-skill balancer
///
/// Deterministic for a given input order:
/// - players of equal skill keep their relative input order (stable sort)
/// - when several teams share the smallest sum, the lowest-indexed team wins
///
/// Team cardinality is not forced; sizes follow from the skill-sum rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyTeamBalancer;

impl GreedyTeamBalancer {
    pub fn new() -> Self {
        Self
    }
}

impl TeamBalancer for GreedyTeamBalancer {
    fn balance(&self, players: &[Player]) -> Result<BalancedTeams, BookingError> {
        validate_roster_size(players.len(), self.required_size())?;

        let [team1, team2, team3] = assign_greedy(players);
        let teams = BalancedTeams {
            team1,
            team2,
            team3,
        };

        let sizes = teams.sizes();
        debug!(
            "Balanced {} players - sums: {:?}, sizes: {:?}, spread: {}",
            players.len(),
            teams.skill_sums(),
            sizes,
            teams.skill_spread()
        );
        if sizes.iter().any(|&size| size != TEAM_SIZE) {
            debug!("Uneven team sizes {:?} after skill balancing", sizes);
        }

        Ok(teams)
    }
}

/// Balance with the default greedy balancer
pub fn balance(players: &[Player]) -> Result<BalancedTeams, BookingError> {
    GreedyTeamBalancer.balance(players)
}

/// Reject any roster whose size is not exactly `required`
pub fn validate_roster_size(actual: usize, required: usize) -> Result<(), BookingError> {
    if actual != required {
        return Err(BookingError::InvalidRosterSize { actual, required });
    }
    Ok(())
}

/// Greedy assignment over any number of players
pub(crate) fn assign_greedy(players: &[Player]) -> [Team; TEAM_COUNT] {
    let mut order: Vec<&Player> = players.iter().collect();
    // sort_by is stable: equal skills keep input order
    order.sort_by(|a, b| b.skill_level.cmp(&a.skill_level));

    let mut teams: [Team; TEAM_COUNT] = Default::default();
    let mut sums: [SkillSum; TEAM_COUNT] = [0; TEAM_COUNT];

    for player in order {
        let target = lightest_team(&sums);
        sums[target] += SkillSum::from(player.skill_level);
        teams[target].push(player.clone());
    }

    teams
}

/// Index of the team with the smallest sum; first index wins ties
fn lightest_team(sums: &[SkillSum; TEAM_COUNT]) -> usize {
    let mut lightest = 0;
    for (index, sum) in sums.iter().enumerate().skip(1) {
        if *sum < sums[lightest] {
            lightest = index;
        }
    }
    lightest
}

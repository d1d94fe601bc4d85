use crate::clock::MatchdayClock;
use crate::error::SeasonResult;
use crate::league::{League, Pairing};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayoffRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl PlayoffRecord {
    pub fn is_empty(&self) -> bool {
        self.wins == 0 && self.losses == 0 && self.ties == 0
    }

    pub fn played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }
}

/// Idempotency key of one scored matchup.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchupId(String);

impl MatchupId {
    pub fn versus(player: &str, opponent: &str, cycle: u32) -> Self {
        let (first, second) = if player <= opponent {
            (player, opponent)
        } else {
            (opponent, player)
        };

        MatchupId(format!("{}_vs_{}_cycle_{}", first, second, cycle))
    }

    pub fn bye(player: &str, cycle: u32) -> Self {
        MatchupId(format!("{}_bye_cycle_{}", player, cycle))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct PlayoffLedger;

impl PlayoffLedger {
    /// Scores the cycle that closed when the clock reached its current value.
    ///
    /// `cycle_points` yields a player's points for a cycle. Failures are
    /// logged and count as zero. Matchups already present in the league's
    /// recorded set are skipped, so repeated calls for the same boundary
    /// leave the ledger unchanged. Returns the number of matchups recorded.
    pub fn record_closed_cycle<F>(league: &mut League, clock: MatchdayClock, mut cycle_points: F) -> usize
    where
        F: FnMut(&str, u32) -> SeasonResult<u32>,
    {
        if league.is_finished() || !league.use_playoffs {
            return 0;
        }

        let Some(cycle) = clock.closed_cycle() else {
            return 0;
        };

        league.ensure_records();

        let mut recorded = 0;
        let players = league.players.clone();

        for player in &players {
            let pairing = match league.schedule.pairing(player, cycle) {
                Some(pairing) => pairing,
                None => {
                    debug!("{}: nothing scheduled for {} in cycle {}", league.code, player, cycle);
                    continue;
                }
            };

            match pairing {
                Pairing::Bye => {
                    let matchup = MatchupId::bye(player, cycle);
                    if league.recorded_matchups.contains(&matchup) {
                        continue;
                    }

                    league.record_mut(player).wins += 1;
                    league.recorded_matchups.insert(matchup);
                    recorded += 1;

                    debug!("{}: {} takes a bye win for cycle {}", league.code, player, cycle);
                }
                Pairing::Versus(opponent) => {
                    let matchup = MatchupId::versus(player, &opponent, cycle);
                    if league.recorded_matchups.contains(&matchup) {
                        continue;
                    }

                    let player_points = Self::points_or_zero(&mut cycle_points, &league.code, player, cycle);
                    let opponent_points = Self::points_or_zero(&mut cycle_points, &league.code, &opponent, cycle);

                    debug!(
                        "{}: cycle {} {} ({}) vs {} ({})",
                        league.code, cycle, player, player_points, opponent, opponent_points
                    );

                    match player_points.cmp(&opponent_points) {
                        Ordering::Greater => {
                            league.record_mut(player).wins += 1;
                            league.record_mut(&opponent).losses += 1;
                        }
                        Ordering::Less => {
                            league.record_mut(&opponent).wins += 1;
                            league.record_mut(player).losses += 1;
                        }
                        Ordering::Equal => {
                            league.record_mut(player).ties += 1;
                            league.record_mut(&opponent).ties += 1;
                        }
                    }

                    league.recorded_matchups.insert(matchup);
                    recorded += 1;
                }
            }
        }

        recorded
    }

    fn points_or_zero<F>(cycle_points: &mut F, league: &str, player: &str, cycle: u32) -> u32
    where
        F: FnMut(&str, u32) -> SeasonResult<u32>,
    {
        match cycle_points(player, cycle) {
            Ok(points) => points,
            Err(e) => {
                warn!("{}: no cycle {} points for {}, counting zero: {}", league, cycle, player, e);
                0
            }
        }
    }
}

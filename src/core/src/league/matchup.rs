use crate::clock::MatchdayClock;
use crate::farm::Roster;
use crate::league::{League, LeagueLifecycle, Pairing, Standing};
use crate::simulation::{PlayerSeasonState, MATCHDAYS_PER_CYCLE};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchupProgress {
    pub games_played: u32,
    pub games_remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrengthComparison {
    pub own: u32,
    pub opponent: u32,
}

impl StrengthComparison {
    pub fn advantage(&self) -> i64 {
        self.own as i64 - self.opponent as i64
    }
}

/// Read-only views derived from the clock on every call.
pub struct MatchupView;

impl MatchupView {
    /// Opponent of `player` in the cycle the clock is currently in.
    pub fn current_matchup(league: &League, player: &str, clock: MatchdayClock) -> Option<Pairing> {
        if !league.use_playoffs || league.players.len() < 2 || !league.contains(player) {
            return None;
        }

        league.schedule.pairing(player, clock.current_cycle())
    }

    pub fn current_opponent(league: &League, player: &str, clock: MatchdayClock) -> Option<String> {
        match Self::current_matchup(league, player, clock)? {
            Pairing::Versus(opponent) => Some(opponent),
            Pairing::Bye => None,
        }
    }

    pub fn matchup_progress(clock: MatchdayClock) -> MatchupProgress {
        let games_played = clock.games_into_cycle();

        MatchupProgress {
            games_played,
            games_remaining: MATCHDAYS_PER_CYCLE - games_played,
        }
    }

    /// League table as it stands today. A finished league shows its
    /// archived final standings since live states were reset.
    pub fn live_standings(league: &League, states: &BTreeMap<String, PlayerSeasonState>) -> Vec<Standing> {
        if league.is_finished() {
            return league.final_standings.clone();
        }

        LeagueLifecycle::final_standings(league, &LeagueLifecycle::season_totals(league, states))
    }

    /// Every player with a live season, by points. Equal totals keep name order.
    pub fn global_leaderboard(states: &BTreeMap<String, PlayerSeasonState>) -> Vec<Standing> {
        let mut standings: Vec<Standing> = states
            .iter()
            .map(|(player, state)| Standing {
                player: player.clone(),
                points: state.total_points(),
                record: None,
            })
            .collect();

        standings.sort_by(|a, b| b.points.cmp(&a.points));
        standings
    }

    pub fn roster_strength(roster: &Roster) -> u32 {
        roster.strength()
    }

    pub fn compare_strength(own: &Roster, opponent: &Roster) -> StrengthComparison {
        StrengthComparison {
            own: Self::roster_strength(own),
            opponent: Self::roster_strength(opponent),
        }
    }
}

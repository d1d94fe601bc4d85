use crate::league::{ArchivedTeam, League, LeagueStatus, Standing};
use crate::simulation::PlayerSeasonState;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct LeagueOutcome {
    pub code: String,
    pub winner: Option<String>,
    pub standings: Vec<Standing>,
}

pub struct LeagueLifecycle;

impl LeagueLifecycle {
    /// Highest matchday counter reached by any player of the league.
    pub fn max_matchday(league: &League, states: &BTreeMap<String, PlayerSeasonState>) -> u32 {
        league
            .players
            .iter()
            .filter_map(|p| states.get(p))
            .map(|s| s.matchday)
            .max()
            .unwrap_or(0)
    }

    pub fn is_complete(league: &League, states: &BTreeMap<String, PlayerSeasonState>) -> bool {
        !league.players.is_empty() && Self::max_matchday(league, states) >= league.matchday_limit
    }

    /// Season point totals of the league's players; missing states count zero.
    pub fn season_totals(league: &League, states: &BTreeMap<String, PlayerSeasonState>) -> BTreeMap<String, u32> {
        league
            .players
            .iter()
            .map(|p| (p.clone(), states.get(p).map(|s| s.total_points()).unwrap_or(0)))
            .collect()
    }

    /// Ranks players by wins then points in playoff leagues with results,
    /// by points otherwise. Equal keys keep the league's player order.
    pub fn final_standings(league: &League, totals: &BTreeMap<String, u32>) -> Vec<Standing> {
        let by_wins = league.use_playoffs && league.has_playoff_results();

        let mut standings: Vec<Standing> = league
            .players
            .iter()
            .map(|player| Standing {
                player: player.clone(),
                points: totals.get(player).copied().unwrap_or(0),
                record: if league.use_playoffs {
                    Some(league.playoff_records.get(player).copied().unwrap_or_default())
                } else {
                    None
                },
            })
            .collect();

        standings.sort_by(|a, b| {
            let wins = |s: &Standing| s.record.map(|r| r.wins).unwrap_or(0);

            let primary = if by_wins {
                wins(b).cmp(&wins(a))
            } else {
                Ordering::Equal
            };

            primary.then_with(|| b.points.cmp(&a.points))
        });

        standings
    }

    /// Finishes the league once any player reached the matchday limit.
    ///
    /// Rosters and totals are archived on the league, then every player's
    /// live state is reset. A league that is already finished is left as is.
    pub fn finish(
        league: &mut League,
        states: &mut BTreeMap<String, PlayerSeasonState>,
        now: DateTime<Utc>,
    ) -> Option<LeagueOutcome> {
        if league.status == LeagueStatus::Finished {
            return None;
        }

        if !Self::is_complete(league, states) {
            return None;
        }

        let standings = Self::final_standings(league, &Self::season_totals(league, states));
        let winner = standings.first().map(|s| s.player.clone());

        for player in &league.players {
            let Some(state) = states.get_mut(player) else {
                debug!("{}: no season state to archive for {}", league.code, player);
                continue;
            };

            league.archived_teams.insert(
                player.clone(),
                ArchivedTeam {
                    team: state.roster.clone(),
                    final_points: state.total_points(),
                    matchdays_played: state.matchday,
                },
            );

            state.reset();
        }

        league.status = LeagueStatus::Finished;
        league.final_standings = standings.clone();
        league.winner = winner.clone();
        league.completed_at = Some(now);

        info!(
            "🏆 league {} finished, winner: {}",
            league.code,
            winner.as_deref().unwrap_or("-")
        );

        Some(LeagueOutcome {
            code: league.code.clone(),
            winner,
            standings,
        })
    }
}

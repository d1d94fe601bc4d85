use crate::farm::Roster;
use crate::simulation::DailyRecord;
use serde::{Deserialize, Serialize};
use std::ops::Range;

pub const MATCHDAYS_PER_CYCLE: u32 = 3;

/// Season line of one drafted character.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterStats {
    pub name: String,
    pub total_points: u32,
    pub matchdays: u32,
    pub best: u32,
}

impl CharacterStats {
    /// Points per matchday worked, `None` before the first one.
    pub fn average(&self) -> Option<f64> {
        if self.matchdays == 0 {
            return None;
        }

        Some(self.total_points as f64 / self.matchdays as f64)
    }
}

/// Everything a player carries through one season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonState {
    #[serde(default)]
    pub matchday: u32,
    #[serde(default, rename = "data")]
    pub history: Vec<DailyRecord>,
    #[serde(default, rename = "drafted_team")]
    pub roster: Roster,
    #[serde(default)]
    pub total_injuries: u32,
    #[serde(default)]
    pub total_injury_points_lost: u32,
}

impl PlayerSeasonState {
    pub fn with_roster(roster: Roster) -> Self {
        PlayerSeasonState {
            roster,
            ..Default::default()
        }
    }

    pub fn total_points(&self) -> u32 {
        self.history.iter().map(|r| r.total_points()).sum()
    }

    fn cycle_range(&self, cycle: u32) -> Range<usize> {
        let start = (cycle * MATCHDAYS_PER_CYCLE) as usize;
        let end = start + MATCHDAYS_PER_CYCLE as usize;

        start.min(self.history.len())..end.min(self.history.len())
    }

    /// Records of the given cycle that exist so far (at most three).
    pub fn cycle_records(&self, cycle: u32) -> &[DailyRecord] {
        &self.history[self.cycle_range(cycle)]
    }

    pub fn cycle_points(&self, cycle: u32) -> u32 {
        self.cycle_records(cycle).iter().map(|r| r.total_points()).sum()
    }

    /// Per-character points over a cycle, in order of first appearance.
    pub fn cycle_breakdown(&self, cycle: u32) -> Vec<(String, u32)> {
        let mut breakdown: Vec<(String, u32)> = Vec::new();

        for outcome in self.cycle_records(cycle).iter().flat_map(|r| r.outcomes.iter()) {
            match breakdown.iter_mut().find(|(name, _)| *name == outcome.name) {
                Some((_, points)) => *points += outcome.points_after_catastrophe,
                None => breakdown.push((outcome.name.clone(), outcome.points_after_catastrophe)),
            }
        }

        breakdown
    }

    /// Totals per character still on the roster, best first. Missed days
    /// count as matchdays scoring zero.
    pub fn character_stats(&self) -> Vec<CharacterStats> {
        let mut stats: Vec<CharacterStats> = Vec::new();

        for outcome in self.history.iter().flat_map(|r| r.outcomes.iter()) {
            if !self.roster.contains(&outcome.name) {
                continue;
            }

            let points = outcome.points_after_catastrophe;

            match stats.iter_mut().find(|s| s.name == outcome.name) {
                Some(line) => {
                    line.total_points += points;
                    line.matchdays += 1;
                    line.best = line.best.max(points);
                }
                None => stats.push(CharacterStats {
                    name: outcome.name.clone(),
                    total_points: points,
                    matchdays: 1,
                    best: points,
                }),
            }
        }

        stats.sort_by(|a, b| b.total_points.cmp(&a.total_points));
        stats
    }

    /// Clears the live season once the league is archived.
    pub fn reset(&mut self) {
        *self = PlayerSeasonState::default();
    }

    pub fn validate(&self) -> Result<(), String> {
        self.roster.validate()?;

        for record in &self.history {
            record.validate()?;
        }

        Ok(())
    }
}

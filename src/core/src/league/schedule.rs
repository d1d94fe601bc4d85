use crate::simulation::MATCHDAYS_PER_CYCLE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pairing {
    Versus(String),
    Bye,
}

/// Opponent per cycle for every player; `None` entries are byes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchupSchedule {
    cycles: BTreeMap<String, Vec<Option<String>>>,
}

impl MatchupSchedule {
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    pub fn cycles_for(&self, player: &str) -> Option<&[Option<String>]> {
        self.cycles.get(player).map(Vec::as_slice)
    }

    /// Pairing of `player` in `cycle`, or `None` when nothing is scheduled.
    pub fn pairing(&self, player: &str, cycle: u32) -> Option<Pairing> {
        let entry = self.cycles.get(player)?.get(cycle as usize)?;

        Some(match entry {
            Some(opponent) => Pairing::Versus(opponent.clone()),
            None => Pairing::Bye,
        })
    }

    fn push(&mut self, player: &str, entry: Option<&str>) {
        self.cycles
            .entry(String::from(player))
            .or_default()
            .push(entry.map(String::from));
    }

    /// Checks the schedule against the league it belongs to.
    pub fn check(&self, players: &[String], matchday_limit: u32) -> Result<(), String> {
        let total_cycles = (matchday_limit / MATCHDAYS_PER_CYCLE) as usize;

        if players.is_empty() {
            return if self.cycles.is_empty() {
                Ok(())
            } else {
                Err(String::from("schedule present for an empty league"))
            };
        }

        if self.cycles.len() != players.len() || players.iter().any(|p| !self.cycles.contains_key(p)) {
            return Err(String::from("schedule players differ from league players"));
        }

        for (player, entries) in &self.cycles {
            if entries.len() != total_cycles {
                return Err(format!(
                    "{} has {} cycles scheduled, expected {}",
                    player,
                    entries.len(),
                    total_cycles
                ));
            }

            for (cycle, entry) in entries.iter().enumerate() {
                if let Some(opponent) = entry {
                    let mirrored = self
                        .cycles
                        .get(opponent)
                        .and_then(|o| o.get(cycle))
                        .and_then(|e| e.as_deref());

                    if mirrored != Some(player.as_str()) {
                        return Err(format!(
                            "cycle {}: {} faces {} but the pairing is not mirrored",
                            cycle, player, opponent
                        ));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Round-robin pairing in blocks of three matchdays.
///
/// The result depends only on the player order and the matchday limit, so
/// regenerating with the same inputs reproduces the same schedule.
pub struct MatchupScheduler;

impl MatchupScheduler {
    /// No league code or random source is taken: pairing follows player
    /// order alone, so leagues with the same roster order share a schedule.
    pub fn generate(players: &[String], matchday_limit: u32) -> MatchupSchedule {
        let total_cycles = (matchday_limit / MATCHDAYS_PER_CYCLE) as usize;
        let mut schedule = MatchupSchedule::default();

        if players.is_empty() {
            return schedule;
        }

        let has_bye = players.len() % 2 == 1;

        for cycle in 0..total_cycles {
            let mut available: Vec<&str> = players.iter().map(String::as_str).collect();

            if has_bye {
                let bye_player = available.remove(cycle % available.len());
                schedule.push(bye_player, None);
            }

            let mut pairs = Vec::with_capacity(available.len() / 2);

            while available.len() >= 2 {
                let first = available.remove(0);
                let opponent_index = if cycle == 0 { 0 } else { cycle % available.len() };
                let second = available.remove(opponent_index);

                pairs.push((first, second));
            }

            for (first, second) in pairs {
                schedule.push(first, Some(second));
                schedule.push(second, Some(first));
            }
        }

        schedule
    }
}

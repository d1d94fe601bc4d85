use crate::error::{SeasonError, SeasonResult};
use crate::farm::Job;
use crate::simulation::{
    Catastrophe, CatastropheKind, CatastropheModel, CharacterOutcome, DailyRecord, Injury, InjuryModel,
    PlayerSeasonState, Season, TaskResolver,
};
use log::debug;
use rand::RngExt;

const STORY_SIGN_OFF: &str =
    "YeeeeeeHawww! That's all the news for this matchday. Stay tuned for more Farmington News!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationPhase {
    Idle,
    Simulating,
    Recorded,
}

struct Worked {
    name: String,
    raw_points: u32,
    lines: Vec<String>,
    injury: Option<Injury>,
}

enum Turn {
    Missed { name: String },
    Worked(Worked),
}

/// One player's matchday: resolves every starter, rolls the day's
/// catastrophe and appends the resulting record to the player's history.
pub struct MatchdaySimulation<'s> {
    player: &'s str,
    state: &'s mut PlayerSeasonState,
    season: Season,
    phase: SimulationPhase,
}

impl<'s> MatchdaySimulation<'s> {
    pub fn new(player: &'s str, state: &'s mut PlayerSeasonState, season: Season) -> Self {
        MatchdaySimulation {
            player,
            state,
            season,
            phase: SimulationPhase::Idle,
        }
    }

    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    pub fn run<R: RngExt + ?Sized>(&mut self, rng: &mut R) -> SeasonResult<DailyRecord> {
        if self.phase != SimulationPhase::Idle {
            return Err(SeasonError::AlreadyRecorded(String::from(self.player)));
        }

        let missing = self.state.roster.missing_jobs();
        if !missing.is_empty() {
            return Err(SeasonError::MissingRoster {
                player: String::from(self.player),
                missing,
            });
        }

        self.phase = SimulationPhase::Simulating;

        let turns = self.resolve_turns(rng);

        let candidates: Vec<&str> = turns
            .iter()
            .filter_map(|turn| match turn {
                Turn::Worked(worked) => Some(worked.name.as_str()),
                Turn::Missed { .. } => None,
            })
            .collect();

        let catastrophe = CatastropheModel::roll(self.season, &candidates, rng);

        let record = self.build_record(&turns, &catastrophe, rng);

        let new_injuries = turns
            .iter()
            .filter(|turn| matches!(turn, Turn::Worked(Worked { injury: Some(_), .. })))
            .count() as u32;

        self.state.total_injuries += new_injuries;
        self.state.total_injury_points_lost += record.outcomes.iter().map(|o| o.injury_loss).sum::<u32>();
        self.state.history.push(record.clone());
        self.state.matchday += 1;

        self.phase = SimulationPhase::Recorded;

        debug!(
            "{} matchday {}: {} points, catastrophe type {}",
            self.player,
            record.matchday,
            record.total_points(),
            u8::from(record.event_type)
        );

        Ok(record)
    }

    fn resolve_turns<R: RngExt + ?Sized>(&mut self, rng: &mut R) -> Vec<Turn> {
        let names: Vec<String> = self.state.roster.starters().map(|c| c.name.clone()).collect();
        let mut turns = Vec::with_capacity(names.len());

        for character in self.state.roster.starters_mut() {
            if character.is_missing_matchday() {
                character.miss_days -= 1;
                turns.push(Turn::Missed {
                    name: character.name.clone(),
                });
                continue;
            }

            let teammates: Vec<&str> = names
                .iter()
                .map(String::as_str)
                .filter(|name| *name != character.name)
                .collect();

            let task = TaskResolver::resolve(character, &teammates, rng);
            let injury = InjuryModel::check(character, rng);

            turns.push(Turn::Worked(Worked {
                name: character.name.clone(),
                raw_points: task.points,
                lines: task.lines,
                injury,
            }));
        }

        turns
    }

    fn build_record<R: RngExt + ?Sized>(
        &self,
        turns: &[Turn],
        catastrophe: &Catastrophe,
        rng: &mut R,
    ) -> DailyRecord {
        let mut outcomes = Vec::with_capacity(turns.len());
        let mut story = Vec::new();

        for (idx, turn) in turns.iter().enumerate() {
            story.push(String::from(match idx {
                0 => "First,",
                1 => "Then,",
                _ => "Finally,",
            }));

            let outcome = match turn {
                Turn::Missed { name } => {
                    story.push(format!(
                        "{} was ready to work, but due to their previous injury they failed and collected no points.",
                        name
                    ));
                    self.outcome_for(name, 0, 0, 0, 0, true)
                }
                Turn::Worked(worked) => {
                    story.extend(worked.lines.iter().cloned());

                    let injury_loss = worked.injury.map(|i| i.point_loss).unwrap_or(0);
                    if let Some(injury) = &worked.injury {
                        story.push(InjuryModel::describe(&worked.name, injury, rng));
                    }

                    let catastrophe_loss = catastrophe.loss_for(&worked.name, worked.raw_points);
                    let final_points = if catastrophe.zeroes_roster() {
                        0
                    } else {
                        worked.raw_points.saturating_sub(catastrophe_loss + injury_loss)
                    };

                    self.outcome_for(
                        &worked.name,
                        worked.raw_points,
                        final_points,
                        catastrophe_loss,
                        injury_loss,
                        false,
                    )
                }
            };

            outcomes.push(outcome);
        }

        story.push(String::new());
        story.push(String::from(STORY_SIGN_OFF));

        let catastrophe_loss = match catastrophe.kind {
            CatastropheKind::Spotlight if catastrophe.affected.is_some() => 1,
            CatastropheKind::Blight => 2,
            _ => 0,
        };

        DailyRecord {
            matchday: self.state.matchday + 1,
            season: self.season,
            event_type: catastrophe.kind,
            catastrophe_loss,
            affected_farmer: catastrophe.affected.clone(),
            catastrophe_message: catastrophe.message.clone(),
            story_message: story.join("\n"),
            outcomes,
        }
    }

    fn outcome_for(
        &self,
        name: &str,
        raw_points: u32,
        points_after_catastrophe: u32,
        catastrophe_loss: u32,
        injury_loss: u32,
        missed: bool,
    ) -> CharacterOutcome {
        let character = self.state.roster.starters().find(|c| c.name == name);

        CharacterOutcome {
            name: String::from(name),
            job: character.map(|c| c.job).unwrap_or(Job::FixMeiser),
            raw_points,
            points_after_catastrophe,
            catastrophe_loss,
            injury_loss,
            injuries_this_season: character.map(|c| c.injuries_this_season).unwrap_or(0),
            injury_points_lost: character.map(|c| c.injury_points_lost).unwrap_or(0),
            miss_days: character.map(|c| c.miss_days).unwrap_or(0),
            missed,
        }
    }
}

use crate::farm::Job;
use crate::simulation::{CatastropheKind, Season};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterOutcome {
    pub name: String,
    pub job: Job,
    #[serde(default)]
    pub raw_points: u32,
    pub points_after_catastrophe: u32,
    pub catastrophe_loss: u32,
    #[serde(rename = "daily_injury_loss")]
    pub injury_loss: u32,
    #[serde(default)]
    pub injuries_this_season: u32,
    #[serde(default)]
    pub injury_points_lost: u32,
    pub miss_days: u8,
    #[serde(default)]
    pub missed: bool,
}

/// One matchday of one player. Written once and appended to the history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub matchday: u32,
    pub season: Season,
    pub event_type: CatastropheKind,
    /// Flat per-character penalty of a spotlight (1) or blight (2) day.
    /// A wipeout has no flat penalty and stores 0 here; what each character
    /// lost to it is on their own outcome.
    pub catastrophe_loss: u32,
    pub affected_farmer: Option<String>,
    #[serde(default)]
    pub catastrophe_message: String,
    #[serde(default)]
    pub story_message: String,
    #[serde(rename = "farmers")]
    pub outcomes: Vec<CharacterOutcome>,
}

impl DailyRecord {
    pub fn total_points(&self) -> u32 {
        self.outcomes.iter().map(|o| o.points_after_catastrophe).sum()
    }

    pub fn outcome(&self, name: &str) -> Option<&CharacterOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    pub fn validate(&self) -> Result<(), String> {
        for outcome in &self.outcomes {
            if outcome.missed && outcome.points_after_catastrophe > 0 {
                return Err(format!(
                    "matchday {}: {} missed the day but scored {}",
                    self.matchday, outcome.name, outcome.points_after_catastrophe
                ));
            }
        }

        Ok(())
    }
}

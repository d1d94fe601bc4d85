use serde::{Deserialize, Serialize};
use std::fmt;

pub const ATTRIBUTE_MIN: u8 = 1;
pub const ATTRIBUTE_MAX: u8 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Job {
    #[serde(rename = "Fix Meiser")]
    FixMeiser,
    #[serde(rename = "Speed Runner")]
    SpeedRunner,
    #[serde(rename = "Lift Tender")]
    LiftTender,
}

impl Job {
    pub const ALL: [Job; 3] = [Job::FixMeiser, Job::SpeedRunner, Job::LiftTender];

    /// Attribute the job leans on when resolving its daily task
    pub fn primary_attribute(&self, attributes: &CharacterAttributes) -> u8 {
        match self {
            Job::FixMeiser => attributes.handy,
            Job::SpeedRunner => attributes.stamina,
            Job::LiftTender => attributes.strength,
        }
    }

    pub fn suggested_for(attributes: &CharacterAttributes) -> Job {
        // ties resolve to the earlier job in ALL
        let mut best = Job::FixMeiser;
        for job in Job::ALL {
            if job.primary_attribute(attributes) > best.primary_attribute(attributes) {
                best = job;
            }
        }
        best
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::FixMeiser => write!(f, "Fix Meiser"),
            Job::SpeedRunner => write!(f, "Speed Runner"),
            Job::LiftTender => write!(f, "Lift Tender"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterAttributes {
    pub strength: u8,
    pub handy: u8,
    pub stamina: u8,
    pub physical: u8,
}

impl CharacterAttributes {
    pub fn new(strength: u8, handy: u8, stamina: u8, physical: u8) -> Self {
        CharacterAttributes {
            strength,
            handy,
            stamina,
            physical,
        }
    }

    pub fn total(&self) -> u32 {
        self.strength as u32 + self.handy as u32 + self.stamina as u32 + self.physical as u32
    }

    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("strength", self.strength),
            ("handy", self.handy),
            ("stamina", self.stamina),
            ("physical", self.physical),
        ];

        for (name, value) in fields {
            if !(ATTRIBUTE_MIN..=ATTRIBUTE_MAX).contains(&value) {
                return Err(format!(
                    "{} = {} outside {}..={}",
                    name, value, ATTRIBUTE_MIN, ATTRIBUTE_MAX
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub job: Job,
    #[serde(flatten)]
    pub attributes: CharacterAttributes,
    #[serde(default)]
    pub injuries_this_season: u32,
    #[serde(default)]
    pub injury_points_lost: u32,
    #[serde(default)]
    pub miss_days: u8,
}

impl Character {
    pub fn new(name: &str, job: Job, attributes: CharacterAttributes) -> Self {
        Character {
            name: String::from(name),
            job,
            attributes,
            injuries_this_season: 0,
            injury_points_lost: 0,
            miss_days: 0,
        }
    }

    pub fn is_missing_matchday(&self) -> bool {
        self.miss_days > 0
    }

    pub fn primary_attribute(&self) -> u8 {
        self.job.primary_attribute(&self.attributes)
    }
}

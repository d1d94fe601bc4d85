use rand::RngExt;
use serde::{Deserialize, Serialize};
use std::fmt;

const SPOTLIGHT_LOSS: u32 = 1;
const BLIGHT_LOSS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    #[default]
    Summer,
    Autumn,
    Winter,
    Spring,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Summer => write!(f, "summer"),
            Season::Autumn => write!(f, "autumn"),
            Season::Winter => write!(f, "winter"),
            Season::Spring => write!(f, "spring"),
        }
    }
}

/// Daily catastrophe outcome, persisted as its numeric event type (0..=3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CatastropheKind {
    Calm,
    /// Type 1: one character loses a point
    Spotlight,
    /// Type 2: every character loses two points
    Blight,
    /// Type 3: every character is zeroed
    Wipeout,
}

impl CatastropheKind {
    /// Maps a 1..=100 roll onto an outcome. Bands: [1,60) spotlight,
    /// [60,80) calm, [80,90) blight, [90,100] wipeout.
    pub fn from_roll(roll: u8) -> Self {
        match roll {
            0..60 => CatastropheKind::Spotlight,
            60..80 => CatastropheKind::Calm,
            80..90 => CatastropheKind::Blight,
            _ => CatastropheKind::Wipeout,
        }
    }
}

impl From<CatastropheKind> for u8 {
    fn from(kind: CatastropheKind) -> u8 {
        match kind {
            CatastropheKind::Calm => 0,
            CatastropheKind::Spotlight => 1,
            CatastropheKind::Blight => 2,
            CatastropheKind::Wipeout => 3,
        }
    }
}

impl TryFrom<u8> for CatastropheKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CatastropheKind::Calm),
            1 => Ok(CatastropheKind::Spotlight),
            2 => Ok(CatastropheKind::Blight),
            3 => Ok(CatastropheKind::Wipeout),
            other => Err(format!("unknown catastrophe type {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catastrophe {
    pub kind: CatastropheKind,
    pub affected: Option<String>,
    pub message: String,
}

impl Catastrophe {
    pub fn calm() -> Self {
        Catastrophe {
            kind: CatastropheKind::Calm,
            affected: None,
            message: String::from("No catastrophe today!"),
        }
    }

    /// Points the catastrophe takes from a character who earned `raw_points` today.
    pub fn loss_for(&self, name: &str, raw_points: u32) -> u32 {
        match self.kind {
            CatastropheKind::Calm => 0,
            CatastropheKind::Spotlight => match &self.affected {
                Some(affected) if affected == name => SPOTLIGHT_LOSS,
                _ => 0,
            },
            CatastropheKind::Blight => BLIGHT_LOSS,
            CatastropheKind::Wipeout => raw_points,
        }
    }

    pub fn zeroes_roster(&self) -> bool {
        self.kind == CatastropheKind::Wipeout
    }
}

pub struct CatastropheModel;

impl CatastropheModel {
    /// Draws the single catastrophe of the day. `candidates` are the
    /// characters that actually worked; a spotlight event picks one of them.
    pub fn roll<R: RngExt + ?Sized>(season: Season, candidates: &[&str], rng: &mut R) -> Catastrophe {
        let roll: u8 = rng.random_range(1..=100);
        let kind = CatastropheKind::from_roll(roll);

        match kind {
            CatastropheKind::Calm => Catastrophe::calm(),
            CatastropheKind::Spotlight => {
                if candidates.is_empty() {
                    return Catastrophe {
                        kind,
                        affected: None,
                        message: String::from("Trouble came calling, but nobody was out in the fields."),
                    };
                }

                let affected = candidates[rng.random_range(0..candidates.len())];

                Catastrophe {
                    kind,
                    affected: Some(String::from(affected)),
                    message: Self::spotlight_message(season, affected),
                }
            }
            CatastropheKind::Blight | CatastropheKind::Wipeout => Catastrophe {
                kind,
                affected: None,
                message: String::from(Self::roster_message(season, kind)),
            },
        }
    }

    fn spotlight_message(season: Season, name: &str) -> String {
        match season {
            Season::Summer => format!("Oh no! {} got heat stroke and struggled to do their task.", name),
            Season::Winter => format!("Brrr! {} got frostbite and struggled to do their task.", name),
            Season::Autumn => format!("Yikes! {} overate at Thanksgiving and got gout!", name),
            Season::Spring => format!("Spooky! {} saw a ghost and let their fear affect their work!", name),
        }
    }

    fn roster_message(season: Season, kind: CatastropheKind) -> &'static str {
        match (kind, season) {
            (CatastropheKind::Blight, Season::Summer) => "A devastating drought hit, ruining all crop-related work!",
            (CatastropheKind::Blight, Season::Winter) => "Frost has set in, making any crop harvesting impossible!",
            (CatastropheKind::Blight, Season::Autumn) => {
                "A major machine breakdown occurred, making all mechanical work impossible!"
            }
            (CatastropheKind::Blight, Season::Spring) => "A storm has damaged all machinery, ruining any related tasks!",
            (CatastropheKind::Wipeout, Season::Summer) => {
                "A raging wildfire has forced all farmers to evacuate, no work today!"
            }
            (CatastropheKind::Wipeout, Season::Winter) => "A blizzard has shut everything down! No work can be done today.",
            (CatastropheKind::Wipeout, Season::Spring) => "Massive flooding has covered the fields! Work is impossible.",
            (CatastropheKind::Wipeout, Season::Autumn) => {
                "A tornado has swept through, leaving no chance for farm work today!"
            }
            _ => "No catastrophe today!",
        }
    }
}

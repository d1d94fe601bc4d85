use crate::simulation::MATCHDAYS_PER_CYCLE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Global matchday counter shared by every league.
///
/// The current cycle is always derived from the value, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchdayClock(u32);

impl MatchdayClock {
    pub fn new(matchday: u32) -> Self {
        MatchdayClock(matchday)
    }

    pub fn matchday(&self) -> u32 {
        self.0
    }

    pub fn current_cycle(&self) -> u32 {
        self.0 / MATCHDAYS_PER_CYCLE
    }

    pub fn games_into_cycle(&self) -> u32 {
        self.0 % MATCHDAYS_PER_CYCLE
    }

    /// The cycle that closed with the last advance, if the clock sits on a boundary.
    pub fn closed_cycle(&self) -> Option<u32> {
        if self.0 > 0 && self.games_into_cycle() == 0 {
            Some(self.current_cycle() - 1)
        } else {
            None
        }
    }

    pub fn advanced(&self) -> Self {
        MatchdayClock(self.0 + 1)
    }
}

impl fmt::Display for MatchdayClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

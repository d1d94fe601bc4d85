use crate::error::{SeasonError, SeasonResult};
use crate::farm::Roster;
use crate::league::{MatchupId, MatchupSchedule, MatchupScheduler, PlayoffRecord};
use crate::simulation::Season;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_MATCHDAY_LIMIT: u32 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeagueStatus {
    #[default]
    Active,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub player: String,
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<PlayoffRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchivedTeam {
    pub team: Roster,
    pub final_points: u32,
    pub matchdays_played: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub code: String,
    pub name: String,
    pub host: String,
    pub players: Vec<String>,
    #[serde(default)]
    pub season: Season,
    #[serde(rename = "matchdays", default = "default_matchday_limit")]
    pub matchday_limit: u32,
    #[serde(default = "default_use_playoffs")]
    pub use_playoffs: bool,
    #[serde(default)]
    pub draft_complete: bool,
    #[serde(rename = "matchup_schedule", default)]
    pub schedule: MatchupSchedule,
    #[serde(default)]
    pub playoff_records: BTreeMap<String, PlayoffRecord>,
    #[serde(default)]
    pub recorded_matchups: BTreeSet<MatchupId>,
    #[serde(default)]
    pub status: LeagueStatus,
    #[serde(default)]
    pub final_standings: Vec<Standing>,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default, rename = "completion_date")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived_teams: BTreeMap<String, ArchivedTeam>,
}

fn default_matchday_limit() -> u32 {
    DEFAULT_MATCHDAY_LIMIT
}

fn default_use_playoffs() -> bool {
    true
}

impl League {
    pub fn new(
        code: &str,
        name: &str,
        host: &str,
        season: Season,
        matchday_limit: u32,
        use_playoffs: bool,
    ) -> Self {
        let mut league = League {
            code: String::from(code),
            name: String::from(name),
            host: String::from(host),
            players: vec![String::from(host)],
            season,
            matchday_limit,
            use_playoffs,
            draft_complete: false,
            schedule: MatchupSchedule::default(),
            playoff_records: BTreeMap::new(),
            recorded_matchups: BTreeSet::new(),
            status: LeagueStatus::Active,
            final_standings: Vec::new(),
            winner: None,
            completed_at: None,
            archived_teams: BTreeMap::new(),
        };

        league.regenerate_schedule();
        league
    }

    pub fn is_finished(&self) -> bool {
        self.status == LeagueStatus::Finished
    }

    /// Drafted and not yet finished, so every day close still applies.
    pub fn is_open(&self) -> bool {
        !self.is_finished() && self.draft_complete
    }

    /// Takes part in matchdays at the given clock value.
    pub fn is_playable_at(&self, matchday: u32) -> bool {
        self.is_open() && matchday < self.matchday_limit
    }

    pub fn contains(&self, player: &str) -> bool {
        self.players.iter().any(|p| p == player)
    }

    fn ensure_active(&self) -> SeasonResult<()> {
        if self.is_finished() {
            return Err(SeasonError::LeagueFinished(self.code.clone()));
        }
        Ok(())
    }

    pub fn add_player(&mut self, player: &str) -> SeasonResult<bool> {
        self.ensure_active()?;

        if self.contains(player) {
            return Ok(false);
        }

        self.players.push(String::from(player));
        self.regenerate_schedule();

        Ok(true)
    }

    /// Hosts stay with their league; everyone else can leave or be removed.
    pub fn remove_player(&mut self, player: &str) -> SeasonResult<bool> {
        self.ensure_active()?;

        if !self.contains(player) {
            return Err(SeasonError::UnknownPlayer {
                league: self.code.clone(),
                player: String::from(player),
            });
        }

        if player == self.host {
            return Ok(false);
        }

        self.players.retain(|p| p != player);
        self.playoff_records.remove(player);
        self.regenerate_schedule();

        Ok(true)
    }

    pub fn set_matchday_limit(&mut self, matchday_limit: u32) -> SeasonResult<()> {
        self.ensure_active()?;

        self.matchday_limit = matchday_limit;
        self.regenerate_schedule();

        Ok(())
    }

    pub fn complete_draft(&mut self) -> SeasonResult<()> {
        self.ensure_active()?;

        self.draft_complete = true;
        self.ensure_records();

        info!("league {} draft complete with {} players", self.code, self.players.len());

        Ok(())
    }

    pub fn regenerate_schedule(&mut self) {
        self.schedule = MatchupScheduler::generate(&self.players, self.matchday_limit);
    }

    pub fn ensure_records(&mut self) {
        for player in &self.players {
            self.playoff_records.entry(player.clone()).or_default();
        }
    }

    pub fn record_mut(&mut self, player: &str) -> &mut PlayoffRecord {
        self.playoff_records.entry(String::from(player)).or_default()
    }

    pub fn has_playoff_results(&self) -> bool {
        self.playoff_records.values().any(|r| !r.is_empty())
    }

    /// Field-level checks applied when a league is read from the store.
    pub fn validate(&self) -> Result<(), String> {
        if self.code.trim().is_empty() {
            return Err(String::from("empty league code"));
        }

        let mut seen = BTreeSet::new();
        for player in &self.players {
            if !seen.insert(player.as_str()) {
                return Err(format!("player {} listed twice", player));
            }
        }

        if self.is_finished() && self.winner.is_none() && !self.players.is_empty() {
            return Err(String::from("finished league without a winner"));
        }

        Ok(())
    }

    pub fn schedule_is_consistent(&self) -> bool {
        self.schedule.check(&self.players, self.matchday_limit).is_ok()
    }
}

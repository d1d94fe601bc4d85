use crate::farm::Job;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeasonError {
    #[error("{player} has no starters for {missing:?}")]
    MissingRoster { player: String, missing: Vec<Job> },
    #[error("corrupt record {key}: {reason}")]
    CorruptRecord { key: String, reason: String },
    #[error("matchday already recorded for {0}")]
    AlreadyRecorded(String),
    #[error("league {0} is finished")]
    LeagueFinished(String),
    #[error("{player} is not in league {league}")]
    UnknownPlayer { league: String, player: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SeasonError {
    pub fn corrupt(key: &str, reason: impl ToString) -> Self {
        SeasonError::CorruptRecord {
            key: String::from(key),
            reason: reason.to_string(),
        }
    }
}

pub type SeasonResult<T> = Result<T, SeasonError>;

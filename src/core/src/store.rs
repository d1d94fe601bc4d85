use crate::clock::MatchdayClock;
use crate::error::{SeasonError, SeasonResult};
use crate::league::League;
use crate::simulation::PlayerSeasonState;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {0} not found")]
    NotFound(String),
    #[error("i/o failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed record {key}: {source}")]
    Serde {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid record {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl StoreError {
    /// The record exists but cannot be used as stored.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Serde { .. } | StoreError::Invalid { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Full-record key/value access to everything a season needs.
///
/// Reads and writes replace whole records. `update_league` is the only
/// read-modify-write primitive: implementations hold the league's write
/// lock from the read until the write, and skip the write when the
/// closure fails.
pub trait SeasonStore: Send + Sync {
    /// A player without a stored record starts from the default state.
    fn load_player_state(&self, player: &str) -> StoreResult<PlayerSeasonState>;

    fn save_player_state(&self, player: &str, state: &PlayerSeasonState) -> StoreResult<()>;

    fn load_league(&self, code: &str) -> StoreResult<League>;

    fn save_league(&self, league: &League) -> StoreResult<()>;

    /// Every readable league; unreadable ones are reported and left out.
    fn list_leagues(&self) -> StoreResult<Vec<League>>;

    fn load_global_clock(&self) -> StoreResult<MatchdayClock>;

    fn save_global_clock(&self, clock: MatchdayClock) -> StoreResult<()>;

    fn update_league(
        &self,
        code: &str,
        update: &mut dyn FnMut(&mut League) -> SeasonResult<()>,
    ) -> SeasonResult<League>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-local store, mostly useful in tests and one-off runs.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    leagues: Mutex<BTreeMap<String, League>>,
    players: Mutex<BTreeMap<String, PlayerSeasonState>>,
    clock: Mutex<MatchdayClock>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }
}

impl SeasonStore for InMemoryStore {
    fn load_player_state(&self, player: &str) -> StoreResult<PlayerSeasonState> {
        Ok(lock(&self.players).get(player).cloned().unwrap_or_default())
    }

    fn save_player_state(&self, player: &str, state: &PlayerSeasonState) -> StoreResult<()> {
        lock(&self.players).insert(String::from(player), state.clone());
        Ok(())
    }

    fn load_league(&self, code: &str) -> StoreResult<League> {
        lock(&self.leagues)
            .get(code)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(String::from(code)))
    }

    fn save_league(&self, league: &League) -> StoreResult<()> {
        lock(&self.leagues).insert(league.code.clone(), league.clone());
        Ok(())
    }

    fn list_leagues(&self) -> StoreResult<Vec<League>> {
        Ok(lock(&self.leagues).values().cloned().collect())
    }

    fn load_global_clock(&self) -> StoreResult<MatchdayClock> {
        Ok(*lock(&self.clock))
    }

    fn save_global_clock(&self, clock: MatchdayClock) -> StoreResult<()> {
        *lock(&self.clock) = clock;
        Ok(())
    }

    fn update_league(
        &self,
        code: &str,
        update: &mut dyn FnMut(&mut League) -> SeasonResult<()>,
    ) -> SeasonResult<League> {
        let mut leagues = lock(&self.leagues);

        let mut league = leagues
            .get(code)
            .cloned()
            .ok_or_else(|| SeasonError::Store(StoreError::NotFound(String::from(code))))?;

        update(&mut league)?;

        leagues.insert(String::from(code), league.clone());

        Ok(league)
    }
}

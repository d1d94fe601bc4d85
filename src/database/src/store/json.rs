use farm_core::{League, MatchdayClock, PlayerSeasonState, SeasonError, SeasonResult, SeasonStore, StoreError, StoreResult};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, rename};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

const PLAYERS_DIR: &str = "players";
const LEAGUES_DIR: &str = "leagues";
const GLOBAL_MATCHDAY_FILE: &str = "global_matchday.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct GlobalMatchdayEntity {
    current_matchday: u32,
}

/// Maps a record key to a file stem. Anything outside `[A-Za-z0-9_-]` is
/// percent-encoded so distinct keys never share a file.
pub fn sanitize_key(key: &str) -> String {
    if key.is_empty() {
        return String::from("%");
    }

    let mut stem = String::with_capacity(key.len());

    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }

    stem
}

/// Record store over a directory of JSON files:
/// `players/<name>.json`, `leagues/<code>.json` and `global_matchday.json`.
pub struct JsonFileStore {
    root: PathBuf,
    league_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();

        for dir in [root.join(PLAYERS_DIR), root.join(LEAGUES_DIR)] {
            fs::create_dir_all(&dir).map_err(|source| StoreError::Io { path: dir.clone(), source })?;
        }

        debug!("json store opened at {}", root.display());

        Ok(JsonFileStore {
            root,
            league_lock: Mutex::new(()),
        })
    }

    fn player_path(&self, player: &str) -> PathBuf {
        self.root.join(PLAYERS_DIR).join(format!("{}.json", sanitize_key(player)))
    }

    fn league_path(&self, code: &str) -> PathBuf {
        self.root.join(LEAGUES_DIR).join(format!("{}.json", sanitize_key(code)))
    }

    fn read<T: DeserializeOwned>(path: &Path, key: &str) -> StoreResult<Option<T>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Serde {
                key: String::from(key),
                source,
            })
    }

    /// Writes next to the target first and renames over it, so readers
    /// never observe a half-written record.
    fn write<T: Serialize>(path: &Path, key: &str, value: &T) -> StoreResult<()> {
        let data = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serde {
            key: String::from(key),
            source,
        })?;

        let temp_path = path.with_extension("json.tmp");
        let io_error = |source| StoreError::Io {
            path: temp_path.clone(),
            source,
        };

        {
            let mut file = File::create(&temp_path).map_err(io_error)?;
            file.write_all(&data).map_err(io_error)?;
            file.sync_all().map_err(io_error)?;
        }

        rename(&temp_path, path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("saved {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    fn checked_league(mut league: League, key: &str) -> StoreResult<League> {
        league.validate().map_err(|reason| StoreError::Invalid {
            key: String::from(key),
            reason,
        })?;

        if !league.is_finished() && !league.schedule_is_consistent() {
            warn!("league {}: stored schedule does not match its players, regenerating", key);
            league.regenerate_schedule();
        }

        Ok(league)
    }

    fn read_league(&self, code: &str) -> StoreResult<League> {
        let league: League =
            Self::read(&self.league_path(code), code)?.ok_or_else(|| StoreError::NotFound(String::from(code)))?;

        Self::checked_league(league, code)
    }

    fn write_league(&self, league: &League) -> StoreResult<()> {
        Self::write(&self.league_path(&league.code), &league.code, league)
    }
}

impl SeasonStore for JsonFileStore {
    fn load_player_state(&self, player: &str) -> StoreResult<PlayerSeasonState> {
        let state: PlayerSeasonState = Self::read(&self.player_path(player), player)?.unwrap_or_default();

        state.validate().map_err(|reason| StoreError::Invalid {
            key: String::from(player),
            reason,
        })?;

        Ok(state)
    }

    fn save_player_state(&self, player: &str, state: &PlayerSeasonState) -> StoreResult<()> {
        Self::write(&self.player_path(player), player, state)
    }

    fn load_league(&self, code: &str) -> StoreResult<League> {
        self.read_league(code)
    }

    fn save_league(&self, league: &League) -> StoreResult<()> {
        let _guard = self.league_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_league(league)
    }

    fn list_leagues(&self) -> StoreResult<Vec<League>> {
        let dir = self.root.join(LEAGUES_DIR);

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: dir, source }),
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();

        paths.sort();

        let mut leagues = Vec::with_capacity(paths.len());

        for path in paths {
            let key = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();

            let league = Self::read::<League>(&path, &key)
                .and_then(|league| league.ok_or_else(|| StoreError::NotFound(key.clone())))
                .and_then(|league| Self::checked_league(league, &key));

            match league {
                Ok(league) => leagues.push(league),
                Err(e) => warn!("skipping league {}: {}", key, e),
            }
        }

        Ok(leagues)
    }

    fn load_global_clock(&self) -> StoreResult<MatchdayClock> {
        let entity: GlobalMatchdayEntity =
            Self::read(&self.root.join(GLOBAL_MATCHDAY_FILE), GLOBAL_MATCHDAY_FILE)?.unwrap_or_default();

        Ok(MatchdayClock::new(entity.current_matchday))
    }

    fn save_global_clock(&self, clock: MatchdayClock) -> StoreResult<()> {
        let entity = GlobalMatchdayEntity {
            current_matchday: clock.matchday(),
        };

        Self::write(&self.root.join(GLOBAL_MATCHDAY_FILE), GLOBAL_MATCHDAY_FILE, &entity)
    }

    fn update_league(
        &self,
        code: &str,
        update: &mut dyn FnMut(&mut League) -> SeasonResult<()>,
    ) -> SeasonResult<League> {
        let _guard = self.league_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut league = self.read_league(code).map_err(SeasonError::from)?;

        update(&mut league)?;

        self.write_league(&league)?;

        Ok(league)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::{Character, CharacterAttributes, Job, Roster, Season};
    use tempfile::TempDir;

    fn store() -> (TempDir, JsonFileStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(temp_dir.path()).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("amy_99-x"), "amy_99-x");
        assert_eq!(sanitize_key("../etc"), "%2E%2E%2Fetc");
        assert_ne!(sanitize_key("a b"), sanitize_key("a_b"));
        assert_eq!(sanitize_key(""), "%");
    }

    #[test]
    fn test_player_state_persists() {
        let (_dir, store) = store();

        let mut roster = Roster::new();
        roster.assign(Job::SpeedRunner, Character::new("Mabel", Job::SpeedRunner, CharacterAttributes::new(4, 6, 10, 7)));
        let state = PlayerSeasonState::with_roster(roster);

        store.save_player_state("amy", &state).unwrap();

        assert_eq!(store.load_player_state("amy").unwrap(), state);
        assert_eq!(store.load_player_state("bob").unwrap(), PlayerSeasonState::default());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let (dir, store) = store();

        store.save_global_clock(MatchdayClock::new(12)).unwrap();

        let path = dir.path().join(GLOBAL_MATCHDAY_FILE);
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        assert_eq!(store.load_global_clock().unwrap().matchday(), 12);
        assert!(fs::read_to_string(&path).unwrap().contains("\"current_matchday\": 12"));
    }

    #[test]
    fn test_missing_clock_is_zero() {
        let (_dir, store) = store();
        assert_eq!(store.load_global_clock().unwrap(), MatchdayClock::default());
    }

    #[test]
    fn test_corrupt_player_is_reported() {
        let (dir, store) = store();
        fs::write(dir.path().join(PLAYERS_DIR).join("amy.json"), "{ not json").unwrap();

        let error = store.load_player_state("amy").unwrap_err();
        assert!(error.is_corrupt());
    }

    #[test]
    fn test_list_skips_unreadable_leagues() {
        let (dir, store) = store();

        store
            .save_league(&League::new("GOOD0001", "Good", "amy", Season::Summer, 30, true))
            .unwrap();
        fs::write(dir.path().join(LEAGUES_DIR).join("BAD00001.json"), "[]").unwrap();

        let leagues = store.list_leagues().unwrap();

        assert_eq!(leagues.len(), 1);
        assert_eq!(leagues[0].code, "GOOD0001");
    }

    #[test]
    fn test_update_league_writes_through() {
        let (_dir, store) = store();
        store
            .save_league(&League::new("UPD00001", "Update", "amy", Season::Winter, 9, true))
            .unwrap();

        store
            .update_league("UPD00001", &mut |league| league.add_player("bob").map(|_| ()))
            .unwrap();

        let league = store.load_league("UPD00001").unwrap();
        assert_eq!(league.players, vec![String::from("amy"), String::from("bob")]);
    }

    #[test]
    fn test_update_unknown_league_fails() {
        let (_dir, store) = store();

        let result = store.update_league("NOPE0000", &mut |_| Ok(()));

        assert!(matches!(result, Err(SeasonError::Store(StoreError::NotFound(_)))));
    }

    #[test]
    fn test_stale_schedule_is_regenerated_on_load() {
        let (dir, store) = store();
        let mut league = League::new("OLD00001", "Old", "amy", Season::Summer, 9, true);
        league.add_player("bob").unwrap();

        let mut json = serde_json::to_value(&league).unwrap();
        json["matchup_schedule"] = serde_json::json!({ "amy": ["bob"], "bob": ["amy"] });
        fs::write(dir.path().join(LEAGUES_DIR).join("OLD00001.json"), json.to_string()).unwrap();

        let loaded = store.load_league("OLD00001").unwrap();

        assert!(loaded.schedule_is_consistent());
        assert_eq!(loaded.schedule.cycles_for("amy").unwrap().len(), 3);
    }
}

use crate::clock::MatchdayClock;
use crate::error::SeasonError;
use crate::league::{League, LeagueLifecycle, LeagueOutcome, PlayoffLedger};
use crate::simulation::{MatchdaySimulation, PlayerSeasonState, Season};
use crate::store::SeasonStore;
use crate::utils::{TimeEstimation, fnv1a};
use chrono::Utc;
use itertools::Itertools;
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayerTick {
    Simulated,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonTickResult {
    /// Clock value the players were simulated at.
    pub matchday: u32,
    pub clock_advanced: bool,
    pub simulated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub recorded_matchups: usize,
    pub finished: Vec<LeagueOutcome>,
}

impl SeasonTickResult {
    pub fn has_finished_leagues(&self) -> bool {
        !self.finished.is_empty()
    }
}

/// Drives one global matchday across every active league.
#[derive(Debug, Clone, Default)]
pub struct SeasonSimulator {
    seed: Option<u64>,
}

impl SeasonSimulator {
    pub fn new() -> Self {
        SeasonSimulator { seed: None }
    }

    /// Every player's randomness derives from the seed, the clock and the name.
    pub fn seeded(seed: u64) -> Self {
        SeasonSimulator { seed: Some(seed) }
    }

    pub fn advance_season(&self, store: &dyn SeasonStore) -> SeasonTickResult {
        let (result, estimated) = TimeEstimation::estimate(|| self.tick(store));

        info!(
            "🌾 matchday {} done in {} ms: {} simulated, {} skipped, {} failed, {} matchups recorded",
            result.matchday, estimated, result.simulated, result.skipped, result.failed, result.recorded_matchups
        );

        result
    }

    fn tick(&self, store: &dyn SeasonStore) -> SeasonTickResult {
        let clock = match store.load_global_clock() {
            Ok(clock) => clock,
            Err(e) if e.is_corrupt() => {
                warn!("global matchday unreadable, starting from 0: {}", e);
                MatchdayClock::default()
            }
            Err(e) => {
                error!("cannot read global matchday: {}", e);
                return SeasonTickResult::default();
            }
        };

        let mut result = SeasonTickResult {
            matchday: clock.matchday(),
            ..Default::default()
        };

        let leagues = match store.list_leagues() {
            Ok(leagues) => leagues,
            Err(e) => {
                error!("cannot list leagues: {}", e);
                return result;
            }
        };

        let active: Vec<&League> = leagues
            .iter()
            .filter(|l| l.is_playable_at(clock.matchday()))
            .collect();

        // Past the limit a league no longer plays but may still owe its close.
        let open: Vec<&str> = leagues
            .iter()
            .filter(|l| l.is_open())
            .map(|l| l.code.as_str())
            .collect();

        let players: Vec<(String, Season)> = active
            .iter()
            .flat_map(|l| l.players.iter().map(move |p| (p.clone(), l.season)))
            .unique_by(|(player, _)| player.clone())
            .collect();

        debug!("matchday {}: {} active leagues, {} players", clock, active.len(), players.len());

        let ticks: Vec<PlayerTick> = players
            .par_iter()
            .map(|(player, season)| self.simulate_player(store, player, *season, clock))
            .collect();

        result.simulated = ticks.iter().filter(|t| **t == PlayerTick::Simulated).count();
        result.skipped = ticks.iter().filter(|t| **t == PlayerTick::Skipped).count();
        result.failed = ticks.iter().filter(|t| **t == PlayerTick::Failed).count();

        let next = clock.advanced();

        if let Err(e) = store.save_global_clock(next) {
            error!("cannot advance global matchday past {}: {}", clock, e);
            return result;
        }

        result.clock_advanced = true;

        for code in open {
            self.close_league_day(store, code, next, &mut result);
        }

        result
    }

    fn rng_for(&self, player: &str, clock: MatchdayClock) -> StdRng {
        match self.seed {
            Some(seed) => {
                let mixed = seed ^ fnv1a(player.as_bytes()) ^ (clock.matchday() as u64).rotate_left(32);
                StdRng::seed_from_u64(mixed)
            }
            None => StdRng::seed_from_u64(rand::random()),
        }
    }

    fn simulate_player(
        &self,
        store: &dyn SeasonStore,
        player: &str,
        season: Season,
        clock: MatchdayClock,
    ) -> PlayerTick {
        let mut state = match store.load_player_state(player) {
            Ok(state) => state,
            Err(e) if e.is_corrupt() => {
                warn!("{}: season state unreadable, starting empty: {}", player, e);
                PlayerSeasonState::default()
            }
            Err(e) => {
                warn!("{}: cannot load season state: {}", player, e);
                return PlayerTick::Failed;
            }
        };

        if state.history.iter().any(|r| r.matchday > clock.matchday()) {
            debug!("{}: matchday {} already recorded", player, clock.advanced());
            return PlayerTick::Skipped;
        }

        state.matchday = clock.matchday();

        let mut rng = self.rng_for(player, clock);

        match MatchdaySimulation::new(player, &mut state, season).run(&mut rng) {
            Ok(_) => {}
            Err(SeasonError::MissingRoster { missing, .. }) => {
                debug!("{}: skipped, no starters for {:?}", player, missing);
                return PlayerTick::Skipped;
            }
            Err(e) => {
                warn!("{}: simulation failed: {}", player, e);
                return PlayerTick::Failed;
            }
        }

        match store.save_player_state(player, &state) {
            Ok(()) => PlayerTick::Simulated,
            Err(e) => {
                warn!("{}: cannot save season state: {}", player, e);
                PlayerTick::Failed
            }
        }
    }

    fn close_league_day(
        &self,
        store: &dyn SeasonStore,
        code: &str,
        clock: MatchdayClock,
        result: &mut SeasonTickResult,
    ) {
        let mut recorded = 0;
        let mut outcome = None;
        let mut archived_states = BTreeMap::new();

        let update = store.update_league(code, &mut |league| {
            recorded = PlayoffLedger::record_closed_cycle(league, clock, |player, cycle| {
                Ok(store.load_player_state(player)?.cycle_points(cycle))
            });

            let mut states: BTreeMap<String, PlayerSeasonState> = BTreeMap::new();
            for player in &league.players {
                let state = match store.load_player_state(player) {
                    Ok(state) => state,
                    Err(e) if e.is_corrupt() => {
                        warn!("{}: season state of {} unreadable: {}", league.code, player, e);
                        PlayerSeasonState::default()
                    }
                    Err(e) => return Err(e.into()),
                };
                states.insert(player.clone(), state);
            }

            outcome = LeagueLifecycle::finish(league, &mut states, Utc::now());
            if outcome.is_some() {
                archived_states = states;
            }

            Ok(())
        });

        if let Err(e) = update {
            error!("league {}: day close failed: {}", code, e);
            return;
        }

        result.recorded_matchups += recorded;

        if let Some(outcome) = outcome {
            for (player, state) in &archived_states {
                if let Err(e) = store.save_player_state(player, state) {
                    warn!("{}: cannot reset {} after finish: {}", code, player, e);
                }
            }

            result.finished.push(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farm::{Character, CharacterAttributes, Job, Roster};
    use crate::league::{LeagueStatus, MatchupId};
    use crate::error::SeasonResult;
    use crate::store::{InMemoryStore, StoreError, StoreResult};
    use std::collections::BTreeSet;
    use std::io;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-memory store that fails on request.
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryStore,
        unreachable: Mutex<BTreeSet<String>>,
        corrupt: Mutex<BTreeSet<String>>,
        update_failures: AtomicUsize,
        clock_save_fails: AtomicBool,
    }

    impl FlakyStore {
        fn wrap(inner: InMemoryStore) -> Self {
            FlakyStore {
                inner,
                ..Default::default()
            }
        }

        fn set_unreachable(&self, player: &str, unreachable: bool) {
            let mut players = self.unreachable.lock().unwrap();
            if unreachable {
                players.insert(String::from(player));
            } else {
                players.remove(player);
            }
        }

        fn mark_corrupt(&self, player: &str) {
            self.corrupt.lock().unwrap().insert(String::from(player));
        }
    }

    fn io_error(key: &str) -> StoreError {
        StoreError::Io {
            path: PathBuf::from(key),
            source: io::Error::other("device not ready"),
        }
    }

    impl SeasonStore for FlakyStore {
        fn load_player_state(&self, player: &str) -> StoreResult<PlayerSeasonState> {
            if self.unreachable.lock().unwrap().contains(player) {
                return Err(io_error(player));
            }

            if self.corrupt.lock().unwrap().contains(player) {
                return Err(StoreError::Invalid {
                    key: String::from(player),
                    reason: String::from("roster lists a job twice"),
                });
            }

            self.inner.load_player_state(player)
        }

        fn save_player_state(&self, player: &str, state: &PlayerSeasonState) -> StoreResult<()> {
            self.inner.save_player_state(player, state)
        }

        fn load_league(&self, code: &str) -> StoreResult<League> {
            self.inner.load_league(code)
        }

        fn save_league(&self, league: &League) -> StoreResult<()> {
            self.inner.save_league(league)
        }

        fn list_leagues(&self) -> StoreResult<Vec<League>> {
            self.inner.list_leagues()
        }

        fn load_global_clock(&self) -> StoreResult<MatchdayClock> {
            self.inner.load_global_clock()
        }

        fn save_global_clock(&self, clock: MatchdayClock) -> StoreResult<()> {
            if self.clock_save_fails.load(Ordering::SeqCst) {
                return Err(io_error("global_matchday"));
            }

            self.inner.save_global_clock(clock)
        }

        fn update_league(
            &self,
            code: &str,
            update: &mut dyn FnMut(&mut League) -> SeasonResult<()>,
        ) -> SeasonResult<League> {
            let failing = self
                .update_failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();

            if failing {
                return Err(io_error(code).into());
            }

            self.inner.update_league(code, update)
        }
    }

    fn roster(prefix: &str) -> Roster {
        let mut roster = Roster::new();
        roster.assign(
            Job::FixMeiser,
            Character::new(&format!("{} Fixer", prefix), Job::FixMeiser, CharacterAttributes::new(5, 9, 6, 11)),
        );
        roster.assign(
            Job::SpeedRunner,
            Character::new(&format!("{} Runner", prefix), Job::SpeedRunner, CharacterAttributes::new(4, 5, 10, 11)),
        );
        roster.assign(
            Job::LiftTender,
            Character::new(&format!("{} Lifter", prefix), Job::LiftTender, CharacterAttributes::new(10, 3, 5, 11)),
        );
        roster
    }

    fn seeded_store(players: &[&str], matchday_limit: u32) -> InMemoryStore {
        let store = InMemoryStore::new();
        let mut league = League::new("SEAS0N01", "Harvest Cup", players[0], Season::Summer, matchday_limit, true);

        for player in players {
            league.add_player(player).unwrap();
            store
                .save_player_state(player, &PlayerSeasonState::with_roster(roster(player)))
                .unwrap();
        }

        league.complete_draft().unwrap();
        store.save_league(&league).unwrap();
        store
    }

    #[test]
    fn test_tick_simulates_and_advances_clock() {
        let store = seeded_store(&["amy", "bob"], 9);

        let result = SeasonSimulator::seeded(7).advance_season(&store);

        assert_eq!(result.matchday, 0);
        assert!(result.clock_advanced);
        assert_eq!(result.simulated, 2);
        assert_eq!(store.load_global_clock().unwrap().matchday(), 1);
        assert_eq!(store.load_player_state("amy").unwrap().history.len(), 1);
        assert_eq!(store.load_player_state("amy").unwrap().matchday, 1);
    }

    #[test]
    fn test_ledger_runs_on_cycle_boundary() {
        let store = seeded_store(&["amy", "bob"], 9);
        let simulator = SeasonSimulator::seeded(11);

        simulator.advance_season(&store);
        simulator.advance_season(&store);
        assert!(store.load_league("SEAS0N01").unwrap().recorded_matchups.is_empty());

        let result = simulator.advance_season(&store);
        let league = store.load_league("SEAS0N01").unwrap();

        assert_eq!(result.recorded_matchups, 1);
        assert!(league.recorded_matchups.contains(&MatchupId::versus("amy", "bob", 0)));
        assert_eq!(league.playoff_records.values().map(|r| r.played()).sum::<u32>(), 2);
    }

    #[test]
    fn test_three_players_finish_after_nine_days() {
        let store = seeded_store(&["amy", "bob", "cat"], 9);
        let simulator = SeasonSimulator::seeded(2024);

        let mut finished = Vec::new();
        for _ in 0..9 {
            finished.extend(simulator.advance_season(&store).finished);
        }

        let league = store.load_league("SEAS0N01").unwrap();

        assert_eq!(finished.len(), 1);
        assert_eq!(league.status, LeagueStatus::Finished);
        assert_eq!(league.archived_teams.len(), 3);
        assert!(league.archived_teams.values().all(|a| a.matchdays_played == 9));
        assert!(league.winner.is_some());
        assert_eq!(league.recorded_matchups.len(), 6);
        assert!(league.recorded_matchups.contains(&MatchupId::bye("amy", 0)));

        for player in ["amy", "bob", "cat"] {
            let state = store.load_player_state(player).unwrap();
            assert!(state.history.is_empty());
            assert!(state.roster.is_empty());
            assert_eq!(state.matchday, 0);
        }

        let after = simulator.advance_season(&store);
        assert_eq!(after.simulated, 0);
        assert!(!after.has_finished_leagues());
    }

    #[test]
    fn test_incomplete_roster_is_skipped() {
        let store = seeded_store(&["amy", "bob"], 9);
        store.save_player_state("bob", &PlayerSeasonState::default()).unwrap();

        let result = SeasonSimulator::seeded(1).advance_season(&store);

        assert_eq!(result.simulated, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(store.load_global_clock().unwrap().matchday(), 1);
    }

    #[test]
    fn test_undrafted_league_does_not_play() {
        let store = InMemoryStore::new();
        let league = League::new("DRAFT001", "Waiting", "amy", Season::Summer, 9, true);
        store.save_league(&league).unwrap();
        store.save_player_state("amy", &PlayerSeasonState::with_roster(roster("amy"))).unwrap();

        let result = SeasonSimulator::new().advance_season(&store);

        assert_eq!(result.simulated, 0);
        assert!(store.load_player_state("amy").unwrap().history.is_empty());
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let first = seeded_store(&["amy", "bob"], 9);
        let second = seeded_store(&["amy", "bob"], 9);

        SeasonSimulator::seeded(99).advance_season(&first);
        SeasonSimulator::seeded(99).advance_season(&second);

        assert_eq!(
            first.load_player_state("amy").unwrap().history,
            second.load_player_state("amy").unwrap().history
        );
    }

    #[test]
    fn test_recorded_day_is_not_replayed() {
        let store = seeded_store(&["amy", "bob"], 9);
        let simulator = SeasonSimulator::seeded(5);

        simulator.advance_season(&store);
        store.save_global_clock(MatchdayClock::new(0)).unwrap();

        let result = simulator.advance_season(&store);

        assert_eq!(result.simulated, 0);
        assert_eq!(result.skipped, 2);
        assert_eq!(store.load_player_state("amy").unwrap().history.len(), 1);
    }

    #[test]
    fn test_unreachable_player_does_not_stop_the_day() {
        let store = FlakyStore::wrap(seeded_store(&["amy", "bob", "cat"], 9));
        store.set_unreachable("bob", true);

        let result = SeasonSimulator::seeded(3).advance_season(&store);

        assert_eq!(result.simulated, 2);
        assert_eq!(result.failed, 1);
        assert!(result.clock_advanced);
        assert_eq!(store.load_global_clock().unwrap().matchday(), 1);

        store.set_unreachable("bob", false);
        assert!(store.load_player_state("bob").unwrap().history.is_empty());
        assert_eq!(store.load_player_state("cat").unwrap().history.len(), 1);
    }

    #[test]
    fn test_corrupt_player_starts_from_empty_season() {
        let store = FlakyStore::wrap(seeded_store(&["amy", "bob"], 9));
        store.mark_corrupt("bob");

        let result = SeasonSimulator::seeded(3).advance_season(&store);

        assert_eq!(result.simulated, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.failed, 0);
        assert!(result.clock_advanced);
    }

    #[test]
    fn test_failed_clock_save_skips_day_close() {
        let store = FlakyStore::wrap(seeded_store(&["amy", "bob"], 9));
        let simulator = SeasonSimulator::seeded(4);

        simulator.advance_season(&store);
        simulator.advance_season(&store);

        store.clock_save_fails.store(true, Ordering::SeqCst);
        let stalled = simulator.advance_season(&store);

        assert_eq!(stalled.simulated, 2);
        assert!(!stalled.clock_advanced);
        assert_eq!(stalled.recorded_matchups, 0);
        assert_eq!(store.load_global_clock().unwrap().matchday(), 2);
        assert!(store.load_league("SEAS0N01").unwrap().recorded_matchups.is_empty());

        store.clock_save_fails.store(false, Ordering::SeqCst);
        let retried = simulator.advance_season(&store);

        assert_eq!(retried.simulated, 0);
        assert_eq!(retried.skipped, 2);
        assert!(retried.clock_advanced);
        assert_eq!(retried.recorded_matchups, 1);
    }

    #[test]
    fn test_failed_close_on_last_day_is_retried() {
        let store = FlakyStore::wrap(seeded_store(&["amy", "bob"], 9));
        let simulator = SeasonSimulator::seeded(8);

        for _ in 0..8 {
            simulator.advance_season(&store);
        }

        store.update_failures.store(1, Ordering::SeqCst);
        let failed = simulator.advance_season(&store);

        assert!(failed.clock_advanced);
        assert!(!failed.has_finished_leagues());
        assert_eq!(store.load_league("SEAS0N01").unwrap().status, LeagueStatus::Active);

        let mut finished = Vec::new();
        for _ in 0..5 {
            finished.extend(simulator.advance_season(&store).finished);
        }

        let league = store.load_league("SEAS0N01").unwrap();

        assert_eq!(finished.len(), 1);
        assert_eq!(league.status, LeagueStatus::Finished);
        assert_eq!(league.archived_teams.len(), 2);
        assert!(league.archived_teams.values().all(|a| a.matchdays_played == 9 && !a.team.is_empty()));
        assert!(store.load_player_state("amy").unwrap().history.is_empty());
    }

    #[test]
    fn test_unreadable_player_is_not_archived_empty() {
        let store = FlakyStore::wrap(seeded_store(&["amy", "bob"], 9));
        let simulator = SeasonSimulator::seeded(21);

        for _ in 0..8 {
            simulator.advance_season(&store);
        }

        store.set_unreachable("bob", true);
        let failed = simulator.advance_season(&store);

        assert_eq!(failed.failed, 1);
        assert!(!failed.has_finished_leagues());

        let league = store.load_league("SEAS0N01").unwrap();
        assert_eq!(league.status, LeagueStatus::Active);
        assert!(league.archived_teams.is_empty());

        store.set_unreachable("bob", false);
        let bob = store.load_player_state("bob").unwrap();
        assert_eq!(bob.history.len(), 8);
        assert!(!bob.roster.is_empty());

        let result = simulator.advance_season(&store);
        let league = store.load_league("SEAS0N01").unwrap();
        let archived = &league.archived_teams["bob"];

        assert_eq!(result.finished.len(), 1);
        assert_eq!(archived.team, bob.roster);
        assert_eq!(archived.matchdays_played, 8);
        assert_eq!(archived.final_points, bob.total_points());

        let standing = league.final_standings.iter().find(|s| s.player == "bob").unwrap();
        assert_eq!(standing.points, bob.total_points());
    }
}

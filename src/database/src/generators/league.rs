use crate::loaders::CharacterEntity;
use farm_core::{BENCH_SIZE, Character, Job, League, PlayerSeasonState, Roster, Season, SeasonResult, SeasonStore};
use log::info;
use rand::RngExt;

const SEASONS: [Season; 4] = [Season::Summer, Season::Autumn, Season::Winter, Season::Spring];

/// Creates a drafted league with generated players so a fresh store has
/// something to simulate.
pub struct DemoLeagueGenerator {
    pool: Vec<CharacterEntity>,
}

impl DemoLeagueGenerator {
    pub fn with_pool(pool: Vec<CharacterEntity>) -> Self {
        DemoLeagueGenerator { pool }
    }

    pub fn generate<R: RngExt + ?Sized>(
        &self,
        store: &dyn SeasonStore,
        player_count: usize,
        matchday_limit: u32,
        rng: &mut R,
    ) -> SeasonResult<League> {
        let code = format!("{:08X}", rng.random::<u32>());
        let season = SEASONS[rng.random_range(0..SEASONS.len())];
        let players: Vec<String> = (1..=player_count.max(1)).map(|i| format!("farmer{}", i)).collect();

        let mut league = League::new(&code, &format!("Demo League {}", code), &players[0], season, matchday_limit, true);
        for player in &players[1..] {
            league.add_player(player)?;
        }

        let rosters = self.draft(players.len(), rng);

        for (player, roster) in players.iter().zip(rosters) {
            store.save_player_state(player, &PlayerSeasonState::with_roster(roster))?;
        }

        league.complete_draft()?;
        store.save_league(&league)?;

        info!(
            "🚜 demo league {} created: {} players, {} matchdays, {} season",
            league.code,
            league.players.len(),
            league.matchday_limit,
            league.season
        );

        Ok(league)
    }

    /// Round-based draft: every round each player takes one character,
    /// starters first by job, then bench picks while the pool lasts.
    fn draft<R: RngExt + ?Sized>(&self, player_count: usize, rng: &mut R) -> Vec<Roster> {
        let mut available: Vec<Character> = self.pool.iter().map(CharacterEntity::to_character).collect();
        let mut rosters = vec![Roster::new(); player_count];

        for job in Job::ALL {
            for roster in rosters.iter_mut() {
                if let Some(character) = Self::pick(&mut available, Some(job), rng) {
                    roster.assign(job, character);
                }
            }
        }

        for _ in 0..BENCH_SIZE {
            for roster in rosters.iter_mut() {
                if let Some(character) = Self::pick(&mut available, None, rng) {
                    let _ = roster.add_to_bench(character);
                }
            }
        }

        rosters
    }

    /// Random pick, preferring characters whose suggested job matches.
    fn pick<R: RngExt + ?Sized>(available: &mut Vec<Character>, job: Option<Job>, rng: &mut R) -> Option<Character> {
        if available.is_empty() {
            return None;
        }

        let suited: Vec<usize> = match job {
            Some(job) => available
                .iter()
                .enumerate()
                .filter(|(_, c)| c.job == job)
                .map(|(idx, _)| idx)
                .collect(),
            None => Vec::new(),
        };

        let idx = if suited.is_empty() {
            rng.random_range(0..available.len())
        } else {
            suited[rng.random_range(0..suited.len())]
        };

        Some(available.swap_remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::CharacterPoolLoader;
    use farm_core::InMemoryStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn generator() -> DemoLeagueGenerator {
        DemoLeagueGenerator::with_pool(CharacterPoolLoader::load().unwrap())
    }

    #[test]
    fn test_demo_league_is_drafted_and_stored() {
        let store = InMemoryStore::new();
        let mut rng = StdRng::seed_from_u64(3);

        let league = generator().generate(&store, 4, 12, &mut rng).unwrap();

        assert_eq!(league.players.len(), 4);
        assert!(league.draft_complete);
        assert_eq!(league.code.len(), 8);
        assert!(league.schedule_is_consistent());
        assert_eq!(store.load_league(&league.code).unwrap(), league);

        for player in &league.players {
            let state = store.load_player_state(player).unwrap();
            assert!(state.roster.is_complete());
            assert_eq!(state.roster.bench.len(), BENCH_SIZE);
        }
    }

    #[test]
    fn test_characters_are_not_shared() {
        let store = InMemoryStore::new();
        let mut rng = StdRng::seed_from_u64(8);

        let league = generator().generate(&store, 3, 9, &mut rng).unwrap();

        let mut names = Vec::new();
        for player in &league.players {
            let state = store.load_player_state(player).unwrap();
            names.extend(state.roster.starters().map(|c| c.name.clone()));
            names.extend(state.roster.bench.iter().map(|c| c.name.clone()));
        }

        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_small_pool_leaves_rosters_incomplete() {
        let pool = CharacterPoolLoader::load().unwrap().into_iter().take(2).collect();
        let generator = DemoLeagueGenerator::with_pool(pool);
        let store = InMemoryStore::new();

        let league = generator.generate(&store, 2, 9, &mut StdRng::seed_from_u64(1)).unwrap();

        let complete = league
            .players
            .iter()
            .filter(|p| store.load_player_state(p).unwrap().roster.is_complete())
            .count();
        assert_eq!(complete, 0);
    }
}
